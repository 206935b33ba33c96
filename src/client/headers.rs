use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};

use crate::client::interceptor::RequestInterceptor;
use crate::client::request::RequestDescriptor;
use crate::session::SessionStore;

pub const DEFAULT_TENANT_HEADER: &str = "x-org-id";

/// Stamps `Authorization` and the tenant header from the session store.
///
/// Caller-supplied headers always win. A missing credential leaves the
/// request unauthenticated and the backend decides.
pub struct AuthHeaders {
    store: SessionStore,
    tenant_header: HeaderName,
}

impl AuthHeaders {
    pub fn new(store: SessionStore, tenant_header: &str) -> Self {
        let tenant_header = HeaderName::from_bytes(tenant_header.as_bytes()).unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid tenant header name '{}', using {}",
                tenant_header,
                DEFAULT_TENANT_HEADER
            );
            HeaderName::from_static(DEFAULT_TENANT_HEADER)
        });
        Self {
            store,
            tenant_header,
        }
    }

    pub fn tenant_header(&self) -> &HeaderName {
        &self.tenant_header
    }
}

impl RequestInterceptor for AuthHeaders {
    fn name(&self) -> &'static str {
        "auth_headers"
    }

    fn on_request(&self, request: &mut RequestDescriptor) {
        let session = self.store.get();

        if !request.headers.contains_key(AUTHORIZATION) {
            if let Some(token) = session.credential.as_ref().and_then(|c| c.bearer()) {
                match HeaderValue::from_str(&format!("Bearer {}", token)) {
                    Ok(value) => {
                        request.headers.insert(AUTHORIZATION, value);
                    }
                    Err(_) => tracing::warn!("Stored credential is not a valid header value"),
                }
            }
        }

        if !request.headers.contains_key(&self.tenant_header) {
            if let Some(tenant_id) = session.tenant_id.as_deref() {
                match HeaderValue::from_str(tenant_id) {
                    Ok(value) => {
                        request.headers.insert(self.tenant_header.clone(), value);
                    }
                    Err(_) => tracing::warn!("Stored tenant id is not a valid header value"),
                }
            }
        }
    }
}
