use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::client::{ApiClient, Method, RawResponse, RequestBody, RequestDescriptor, Transport};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::{SessionMode, SessionStore};

/// A dispatched request as the transport saw it (after interceptors ran).
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(body) => Some(body),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Script {
    once: HashMap<(Method, String), VecDeque<RawResponse>>,
    always: HashMap<(Method, String), RawResponse>,
    requests: Vec<RecordedRequest>,
}

/// In-memory transport answering from a script and recording every call.
///
/// Unscripted routes fail like a timed-out request.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every `method path` call with this response.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.lock()
            .always
            .insert((method, path.to_string()), RawResponse::json(status, body));
    }

    /// Answer the next `method path` call with this response, before any
    /// standing response.
    pub fn respond_once(&self, method: Method, path: &str, status: u16, body: Value) {
        self.lock()
            .once
            .entry((method, path.to_string()))
            .or_default()
            .push_back(RawResponse::json(status, body));
    }

    pub fn respond_bytes(&self, method: Method, path: &str, bytes: Vec<u8>) {
        self.lock()
            .always
            .insert((method, path.to_string()), RawResponse::bytes(200, bytes));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse, ApiError> {
        let mut script = self.lock();
        script.requests.push(RecordedRequest {
            method: request.method,
            path: request.path.clone(),
            query: request
                .query
                .pairs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers: request.headers.clone(),
            body: request.body.clone(),
        });

        let key = (request.method, request.path.clone());
        if let Some(response) = script.once.get_mut(&key).and_then(VecDeque::pop_front) {
            return Ok(response);
        }
        match script.always.get(&key) {
            Some(response) => Ok(response.clone()),
            None => Err(ApiError::timeout(format!(
                "No scripted response for {} {}",
                request.method, request.path
            ))),
        }
    }
}

/// Client over a scripted transport and an in-memory session.
pub fn test_client(mode: SessionMode, transport: &ScriptedTransport) -> ApiClient {
    ApiClient::builder(ClientConfig::for_origin("http://backend.test", mode))
        .store(SessionStore::in_memory(mode))
        .transport(Arc::new(transport.clone()))
        .build()
        .expect("test client builds")
}
