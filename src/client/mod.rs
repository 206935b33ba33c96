//! Authenticated HTTP client for the console backend.
//!
//! Every call goes through the same fixed chain: request interceptors stamp
//! headers, the transport dispatches, then response interceptors normalize
//! list payloads or react to authentication failures before the caller's
//! future resolves.

pub mod headers;
pub mod interceptor;
pub mod normalize;
pub mod request;
pub mod response;
pub mod transport;
pub mod unauthorized;

use std::sync::Arc;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::{FileBackend, SessionEvents, SessionMode, SessionStore};

pub use headers::AuthHeaders;
pub use interceptor::{InterceptorChain, RequestInterceptor, ResponseInterceptor};
pub use normalize::ListNormalizer;
pub use request::{
    path_segment, Method, QueryParams, RequestBody, RequestDescriptor, ResponseKind,
};
pub use response::{Payload, RawResponse};
pub use transport::{HttpTransport, Transport};
pub use unauthorized::UnauthorizedHandler;

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    chain: InterceptorChain,
    store: SessionStore,
    events: SessionEvents,
    log_requests: bool,
}

pub struct ApiClientBuilder {
    config: ClientConfig,
    store: Option<SessionStore>,
    transport: Option<Arc<dyn Transport>>,
    events: Option<SessionEvents>,
    request_interceptors: Vec<Box<dyn RequestInterceptor>>,
    response_interceptors: Vec<Box<dyn ResponseInterceptor>>,
}

impl ApiClientBuilder {
    pub fn store(mut self, store: SessionStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn events(mut self, events: SessionEvents) -> Self {
        self.events = Some(events);
        self
    }

    /// Extra pre-dispatch hook, run after the auth headers are stamped.
    pub fn request_interceptor(mut self, interceptor: Box<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    /// Extra post-dispatch hook, run after the built-in ones.
    pub fn response_interceptor(mut self, interceptor: Box<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    pub fn build(self) -> ApiResult<ApiClient> {
        let mode = self.config.session.mode;
        let store = match self.store {
            Some(store) => store,
            None => open_default_store(&self.config, mode),
        };
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.config)?),
        };
        let events = self.events.unwrap_or_default();

        let mut chain = InterceptorChain::new();
        chain.register_request(Box::new(AuthHeaders::new(
            store.clone(),
            &self.config.api.tenant_header,
        )));
        for interceptor in self.request_interceptors {
            chain.register_request(interceptor);
        }
        chain.register_response(Box::new(ListNormalizer::new()));
        chain.register_response(Box::new(UnauthorizedHandler::new(
            store.clone(),
            events.clone(),
        )));
        for interceptor in self.response_interceptors {
            chain.register_response(interceptor);
        }

        tracing::debug!(
            "API client ready (base {}, mode {:?}, session {})",
            self.config.api.base_url(),
            mode,
            store.location()
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                transport,
                chain,
                store,
                events,
                log_requests: self.config.api.log_requests,
            }),
        })
    }
}

fn open_default_store(config: &ClientConfig, mode: SessionMode) -> SessionStore {
    match FileBackend::in_config_dir(config.storage.config_dir.as_deref()) {
        Ok(backend) => SessionStore::open(mode, backend),
        Err(e) => {
            tracing::warn!("Session will not persist: {}", e);
            SessionStore::in_memory(mode)
        }
    }
}

impl ApiClient {
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            store: None,
            transport: None,
            events: None,
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
        }
    }

    pub fn from_config(config: ClientConfig) -> ApiResult<Self> {
        Self::builder(config).build()
    }

    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    pub fn events(&self) -> &SessionEvents {
        &self.inner.events
    }

    pub fn mode(&self) -> SessionMode {
        self.inner.store.mode()
    }

    pub fn interceptors(&self) -> &InterceptorChain {
        &self.inner.chain
    }

    /// Dispatch one call through the interceptor chain.
    ///
    /// Runs on its own task: if the caller stops waiting, the call still
    /// completes and its post-dispatch side effects (session teardown on
    /// 401) still apply.
    pub async fn send(&self, request: RequestDescriptor) -> ApiResult<RawResponse> {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.dispatch(request).await });
        match task.await {
            Ok(result) => result,
            Err(e) => Err(ApiError::transport(format!("Request task failed: {}", e))),
        }
    }

    pub async fn send_json(&self, request: RequestDescriptor) -> ApiResult<Value> {
        Ok(self.send(request).await?.into_json())
    }

    pub async fn get_json(&self, path: &str, query: QueryParams) -> ApiResult<Value> {
        self.send_json(RequestDescriptor::get(path).query(query)).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.send_json(RequestDescriptor::post(path).json(body)).await
    }

    pub async fn put_json(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.send_json(RequestDescriptor::put(path).json(body)).await
    }

    pub async fn patch_json(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.send_json(RequestDescriptor::patch(path).json(body)).await
    }

    pub async fn delete_json(&self, path: &str) -> ApiResult<Value> {
        self.send_json(RequestDescriptor::delete(path)).await
    }

    pub async fn get_bytes(&self, path: &str) -> ApiResult<Vec<u8>> {
        Ok(self
            .send(RequestDescriptor::get(path).expect_bytes())
            .await?
            .into_bytes())
    }
}

impl ClientInner {
    async fn dispatch(&self, mut request: RequestDescriptor) -> ApiResult<RawResponse> {
        self.chain.apply_request(&mut request);

        if self.log_requests {
            tracing::debug!("{} {}", request.method, request.display_path());
        }

        let result = match self.transport.execute(&request).await {
            Ok(mut response) if response.is_success() => {
                self.chain.apply_success(&request, &mut response);
                Ok(response)
            }
            Ok(response) => {
                let status = response.status;
                Err(ApiError::from_status(status, response.error_payload()))
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            if self.log_requests {
                tracing::debug!(
                    "{} {} failed: {} ({:?})",
                    request.method,
                    request.path,
                    e,
                    e.status()
                );
            }
            self.chain.apply_failure(&request, e);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Credential, SessionEvent};
    use crate::testing::{test_client, ScriptedTransport};
    use serde_json::json;

    #[tokio::test]
    async fn stamps_headers_and_unwraps_leads_envelope() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/leads", 200, json!({"items": [{"_id": "1"}]}));
        let client = test_client(SessionMode::Token, &transport);
        client
            .store()
            .set(Some(Credential::Bearer("abc123".into())), Some("org-7".into()))
            .unwrap();

        let leads = client.get_json("/leads", QueryParams::new()).await.unwrap();
        assert_eq!(leads, json!([{"_id": "1"}]));

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].header("authorization").as_deref(), Some("Bearer abc123"));
        assert_eq!(sent[0].header("x-org-id").as_deref(), Some("org-7"));
    }

    #[tokio::test]
    async fn any_401_clears_session_and_signals() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Post, "/invoices", 401, json!({"message": "expired"}));
        let client = test_client(SessionMode::Token, &transport);
        client
            .store()
            .set(Some(Credential::Bearer("abc123".into())), Some("org-7".into()))
            .unwrap();
        let mut events = client.events().subscribe();

        let err = client
            .post_json("/invoices", json!({"total": 10}))
            .await
            .unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(err.message(), "expired");
        assert!(client.store().get().is_empty());
        assert_eq!(events.try_recv().unwrap(), SessionEvent::Invalidated);
    }

    #[tokio::test]
    async fn other_failures_keep_session() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/deals/9", 500, json!({"error": "boom"}));
        let client = test_client(SessionMode::Token, &transport);
        client
            .store()
            .set(Some(Credential::Bearer("t".into())), None)
            .unwrap();

        let err = client
            .get_json("/deals/9", QueryParams::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.payload(), Some(&json!({"error": "boom"})));
        assert!(client.store().get().is_authenticated());
    }

    #[tokio::test]
    async fn transport_failure_is_not_an_auth_failure() {
        let transport = ScriptedTransport::new();
        let client = test_client(SessionMode::Token, &transport);
        client
            .store()
            .set(Some(Credential::Bearer("t".into())), None)
            .unwrap();

        // unscripted routes fail as a timeout
        let err = client
            .get_json("/calls", QueryParams::new())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "TIMEOUT");
        assert!(client.store().get().is_authenticated());
    }

    #[tokio::test]
    async fn default_chain_order() {
        let transport = ScriptedTransport::new();
        let client = test_client(SessionMode::Cookie, &transport);
        assert_eq!(client.interceptors().request_names(), vec!["auth_headers"]);
        assert_eq!(
            client.interceptors().response_names(),
            vec!["list_normalizer", "unauthorized_handler"]
        );
    }
}
