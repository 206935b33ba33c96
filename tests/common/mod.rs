#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use zura_client::session::{FileBackend, SessionStore};
use zura_client::{ApiClient, ClientConfig, SessionMode};

/// One canned answer from the fake backend.
#[derive(Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
    pub set_cookie: Option<String>,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            set_cookie: None,
            delay: None,
        }
    }

    pub fn cookie(mut self, cookie: &str) -> Self {
        self.set_cookie = Some(cookie.to_string());
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A request as the backend received it, with the `/api` prefix stripped.
#[derive(Debug, Clone)]
pub struct Received {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Received {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Default)]
struct Script {
    routes: HashMap<(Method, String), VecDeque<Reply>>,
    received: Vec<Received>,
}

/// Local HTTP server standing in for the console backend.
///
/// Each scripted route answers its replies in order, repeating the last
/// one; anything unscripted is a 404.
#[derive(Clone)]
pub struct FakeBackend {
    pub origin: String,
    script: Arc<Mutex<Script>>,
}

impl FakeBackend {
    pub async fn start() -> Result<Self> {
        init_tracing();
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind fake backend")?;

        let script = Arc::new(Mutex::new(Script::default()));
        let app = Router::new().fallback(answer).with_state(script.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            origin: format!("http://127.0.0.1:{}", port),
            script,
        })
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.reply(method, path, Reply::new(status, body));
    }

    pub fn reply(&self, method: Method, path: &str, reply: Reply) {
        self.script
            .lock()
            .unwrap()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    pub fn received(&self) -> Vec<Received> {
        self.script.lock().unwrap().received.clone()
    }

    pub fn count(&self) -> usize {
        self.script.lock().unwrap().received.len()
    }

    pub fn config(&self, mode: SessionMode) -> ClientConfig {
        ClientConfig::for_origin(&self.origin, mode)
    }

    pub fn client(&self, mode: SessionMode) -> Result<ApiClient> {
        self.client_with_store(mode, SessionStore::in_memory(mode))
    }

    pub fn client_with_store(&self, mode: SessionMode, store: SessionStore) -> Result<ApiClient> {
        Ok(ApiClient::builder(self.config(mode)).store(store).build()?)
    }
}

async fn answer(
    State(script): State<Arc<Mutex<Script>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix("/api")
        .unwrap_or(uri.path())
        .to_string();

    let reply = {
        let mut script = script.lock().unwrap();
        script.received.push(Received {
            method: method.clone(),
            path: path.clone(),
            query: uri.query().map(str::to_string),
            headers,
            body,
        });
        script.routes.get_mut(&(method, path)).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        })
    };

    let Some(reply) = reply else {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"}))).into_response();
    };
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, Json(reply.body)).into_response();
    if let Some(cookie) = reply.set_cookie {
        if let Ok(value) = cookie.parse() {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

/// Honour `RUST_LOG` in tests; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fresh config directory under the system temp dir.
pub fn temp_config_dir() -> PathBuf {
    std::env::temp_dir().join(format!("zura-test-{}", uuid::Uuid::new_v4()))
}

pub fn file_store(mode: SessionMode, dir: &std::path::Path) -> Result<SessionStore> {
    let backend = FileBackend::in_config_dir(Some(dir))?;
    Ok(SessionStore::open(mode, backend))
}
