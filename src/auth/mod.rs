//! Named auth operations over uncertain backend route naming.
//!
//! Each operation probes an ordered candidate list (see [`probe`]) and
//! keeps the session store in step with the outcome.

pub mod identity;
pub mod probe;

use serde_json::{json, Value};

use crate::client::{ApiClient, QueryParams, RequestDescriptor};
use crate::error::ApiResult;
use crate::session::{SessionEvent, SessionMode};

pub use identity::{AuthOutcome, Identity};
pub use probe::{first_that_works, is_routing_failure};

pub const IDENTITY_PATHS: &[&str] = &["/auth/me", "/auth/whoami"];
pub const SIGNIN_PATHS: &[&str] = &["/auth/signin", "/auth/login"];
pub const SIGNUP_PATHS: &[&str] = &["/auth/signup", "/auth/register"];
pub const SIGNOUT_PATHS: &[&str] = &["/auth/signout", "/auth/logout"];

#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Who is signed in, if anyone.
    ///
    /// Token mode without a stored credential answers `None` without a
    /// network call. A 401 also reads as `None` (the unauthorized handler
    /// has already cleared the session by then).
    pub async fn me(&self) -> ApiResult<Option<Identity>> {
        let session = self.client.store().get();
        if session.mode == SessionMode::Token && !session.is_authenticated() {
            tracing::trace!("No credential in token mode, skipping identity probe");
            return Ok(None);
        }

        let probed = first_that_works(
            "identity",
            IDENTITY_PATHS,
            |path| async move { self.client.get_json(&path, QueryParams::new()).await },
            is_routing_failure,
        )
        .await;

        match probed {
            Ok(payload) => Ok(Identity::from_payload(&payload)),
            Err(e) if e.is_authentication() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn signin(&self, credentials: Value) -> ApiResult<AuthOutcome> {
        let payload = self.post_first("signin", SIGNIN_PATHS, credentials).await?;
        Ok(self.establish(payload))
    }

    pub async fn signup(&self, registration: Value) -> ApiResult<AuthOutcome> {
        let payload = self.post_first("signup", SIGNUP_PATHS, registration).await?;
        Ok(self.establish(payload))
    }

    /// Notify the backend if it is reachable, then always clear locally.
    pub async fn signout(&self) {
        if let Err(e) = self.post_first("signout", SIGNOUT_PATHS, json!({})).await {
            tracing::warn!("Backend sign-out failed, clearing local session anyway: {}", e);
        }
        if let Err(e) = self.client.store().clear() {
            tracing::warn!("Failed to persist cleared session: {}", e);
        }
        tracing::info!("Signed out");
        self.client.events().emit(SessionEvent::SignedOut);
    }

    async fn post_first(
        &self,
        operation: &str,
        candidates: &[&str],
        body: Value,
    ) -> ApiResult<Value> {
        first_that_works(
            operation,
            candidates,
            |path| {
                self.client
                    .send_json(RequestDescriptor::post(path).json(body.clone()))
            },
            is_routing_failure,
        )
        .await
    }

    fn establish(&self, payload: Value) -> AuthOutcome {
        let outcome = AuthOutcome::from_payload(payload);
        let credential = outcome.credential();
        let tenant_id = outcome.tenant_id();
        if outcome.token.is_none() {
            tracing::debug!("No token in auth response, relying on cookie session");
        }
        if let Err(e) = self.client.store().set(Some(credential), tenant_id.clone()) {
            tracing::warn!("Failed to persist session: {}", e);
        }
        tracing::info!("Session established (tenant: {:?})", tenant_id);
        self.client
            .events()
            .emit(SessionEvent::Established { tenant_id });
        outcome
    }
}
