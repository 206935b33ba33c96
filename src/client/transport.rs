//! Wire transport behind the client.
//!
//! The reqwest implementation owns the connection pool, the cookie jar (in
//! cookie mode) and the fixed client-side timeout.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::client::request::{RequestBody, RequestDescriptor, ResponseKind};
use crate::client::response::{Payload, RawResponse};
use crate::config::ClientConfig;
use crate::error::ApiError;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute the call. Any received response is `Ok`, whatever its
    /// status; `Err` means no response arrived.
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse, ApiError>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(config.api.timeout())
            .connect_timeout(config.api.connect_timeout())
            .cookie_store(config.session.mode.uses_cookies())
            .gzip(true)
            .build()
            .map_err(|e| ApiError::transport(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = config.api.base_url();
        Url::parse(&base_url)
            .map_err(|e| ApiError::transport(format!("Invalid API root '{}': {}", base_url, e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, request: &RequestDescriptor) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base_url, request.path);
        let mut url = Url::parse(&raw)
            .map_err(|e| ApiError::transport(format!("Invalid request URL '{}': {}", raw, e)))?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in request.query.pairs() {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse, ApiError> {
        let url = self.url_for(request)?;

        let mut builder = self
            .client
            .request(request.method.to_reqwest(), url)
            .headers(request.headers.clone());

        builder = match &request.body {
            RequestBody::None => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart {
                field,
                file_name,
                bytes,
            } => {
                let part = Part::bytes(bytes.clone()).file_name(file_name.clone());
                builder.multipart(Form::new().part(field.clone(), part))
            }
        };

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_send_error)?;

        let payload = if request.expect == ResponseKind::Bytes && (200..300).contains(&status) {
            Payload::Bytes(body.to_vec())
        } else {
            Payload::Json(decode_json(&body))
        };

        Ok(RawResponse { status, payload })
    }
}

fn map_send_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::timeout(format!("Request timed out: {}", err))
    } else {
        ApiError::transport(format!("Request failed: {}", err))
    }
}

/// Empty bodies read as `null`; non-JSON text is kept as a string.
fn decode_json(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
