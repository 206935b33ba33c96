use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use crate::auth::{first_that_works, is_routing_failure};
use crate::client::normalize::{as_items, to_items};
use crate::client::{path_segment, ApiClient, QueryParams, RequestDescriptor};
use crate::error::{ApiError, ApiResult};

/// Mount points the users router is commonly found at, most specific first.
pub const USERS_BASE_CANDIDATES: &[&str] = &["/users/users", "/users"];

/// Team members, under whichever base path the backend mounts them.
///
/// `/users` is not on the list-normalization allow-list, so envelope
/// handling happens here.
#[derive(Clone)]
pub struct UsersApi {
    client: ApiClient,
    base: Arc<Mutex<Option<String>>>,
}

impl UsersApi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            base: Arc::new(Mutex::new(None)),
        }
    }

    /// Skip detection and use a known base path.
    pub fn with_base(client: ApiClient, base: impl Into<String>) -> Self {
        Self {
            client,
            base: Arc::new(Mutex::new(Some(base.into()))),
        }
    }

    pub fn known_base(&self) -> Option<String> {
        self.base.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Find the working base and return its first page of users.
    ///
    /// A candidate wins only with a 2xx list-shaped payload. A 404/405 or a
    /// non-list success moves on to the next one; any other failure is
    /// returned as is.
    pub async fn detect_base(&self) -> ApiResult<(String, Vec<Value>)> {
        let found = first_that_works(
            "users",
            USERS_BASE_CANDIDATES,
            |path| async move {
                let payload = self.client.get_json(&path, QueryParams::new()).await?;
                if let Some(users) = as_items(&payload).cloned() {
                    return Ok((path, users));
                }
                Err(ApiError::Application {
                    message: format!("{} did not return a user list", path),
                    status: 200,
                    payload: Some(payload),
                })
            },
            is_wrong_mount,
        )
        .await?;

        tracing::debug!("Users API detected at {}", found.0);
        *self.base.lock().unwrap_or_else(|p| p.into_inner()) = Some(found.0.clone());
        Ok(found)
    }

    async fn base(&self) -> ApiResult<String> {
        match self.known_base() {
            Some(base) => Ok(base),
            None => Ok(self.detect_base().await?.0),
        }
    }

    /// Detection already fetches the first page, so the first call after it
    /// makes no extra request.
    pub async fn list(&self) -> ApiResult<Vec<Value>> {
        let Some(base) = self.known_base() else {
            return Ok(self.detect_base().await?.1);
        };
        let payload = self.client.get_json(&base, QueryParams::new()).await?;
        Ok(to_items(payload))
    }

    pub async fn invite(&self, email: &str, role: &str) -> ApiResult<Value> {
        let email = email.trim();
        if !looks_like_email(email) {
            return Err(ApiError::validation(
                "Enter a valid email address.",
                Some("email"),
            ));
        }
        let base = self.base().await?;
        self.client
            .post_json(
                &format!("{}/invite", base),
                json!({ "email": email, "role": role }),
            )
            .await
    }

    pub async fn set_active(&self, id: &str, active: bool) -> ApiResult<Value> {
        self.patch(id, json!({ "active": active })).await
    }

    pub async fn set_role(&self, id: &str, role: &str) -> ApiResult<Value> {
        self.patch(id, json!({ "role": role })).await
    }

    pub async fn remove(&self, id: &str) -> ApiResult<Value> {
        let base = self.base().await?;
        self.client
            .send_json(RequestDescriptor::delete(format!("{}/{}", base, path_segment(id))))
            .await
    }

    async fn patch(&self, id: &str, body: Value) -> ApiResult<Value> {
        let base = self.base().await?;
        self.client
            .patch_json(&format!("{}/{}", base, path_segment(id)), body)
            .await
    }
}

/// Not mounted here (404/405), or answered 2xx with something other than a
/// user list.
fn is_wrong_mount(error: &ApiError) -> bool {
    is_routing_failure(error)
        || matches!(error, ApiError::Application { status, .. } if (200..300).contains(status))
}

/// `something@host.tld`, nothing stricter.
fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Method;
    use crate::session::{Credential, SessionMode};
    use crate::testing::{test_client, ScriptedTransport};

    #[tokio::test]
    async fn detects_plain_users_base_after_nested_404() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/users/users", 404, json!({"error": "Not found"}));
        transport.respond(Method::Get, "/users", 200, json!({"items": [{"_id": "u1"}]}));
        let users = UsersApi::new(test_client(SessionMode::Token, &transport));

        let (base, first_page) = users.detect_base().await.unwrap();
        assert_eq!(base, "/users");
        assert_eq!(first_page, vec![json!({"_id": "u1"})]);
        assert_eq!(users.known_base().as_deref(), Some("/users"));
    }

    #[tokio::test]
    async fn non_list_success_is_skipped() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/users/users", 200, json!({"_id": "users"}));
        transport.respond(Method::Get, "/users", 200, json!([{"_id": "u2"}]));
        let users = UsersApi::new(test_client(SessionMode::Token, &transport));

        assert_eq!(users.list().await.unwrap(), vec![json!({"_id": "u2"})]);
    }

    #[tokio::test]
    async fn no_working_base_is_route_mismatch() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/users/users", 200, json!({"ok": true}));
        transport.respond(Method::Get, "/users", 405, json!({}));
        let users = UsersApi::new(test_client(SessionMode::Token, &transport));

        let err = users.detect_base().await.unwrap_err();
        assert_eq!(err.error_code(), "ROUTE_MISMATCH");
        assert_eq!(users.known_base(), None);
    }

    #[tokio::test]
    async fn expired_session_surfaces_without_trying_next_base() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/users/users", 401, json!({"message": "expired"}));
        transport.respond(Method::Get, "/users", 200, json!([{"_id": "u1"}]));
        let client = test_client(SessionMode::Token, &transport);
        client
            .store()
            .set(Some(Credential::Bearer("abc123".into())), None)
            .unwrap();
        let users = UsersApi::new(client.clone());

        let err = users.list().await.unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(err.message(), "expired");
        assert_eq!(transport.count(), 1);
        assert!(client.store().get().is_empty());
        assert_eq!(users.known_base(), None);
    }

    #[tokio::test]
    async fn server_and_transport_failures_are_not_route_mismatch() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/users/users", 500, json!({"error": "boom"}));
        let users = UsersApi::new(test_client(SessionMode::Cookie, &transport));
        let err = users.detect_base().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.message(), "boom");

        // unscripted routes fail like an unreachable backend
        let transport = ScriptedTransport::new();
        let users = UsersApi::new(test_client(SessionMode::Cookie, &transport));
        let err = users.detect_base().await.unwrap_err();
        assert_eq!(err.error_code(), "TIMEOUT");
        assert_eq!(transport.count(), 1);
    }

    #[tokio::test]
    async fn first_list_reuses_the_detection_page() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/users/users", 404, json!({}));
        transport.respond(Method::Get, "/users", 200, json!({"items": [{"_id": "u1"}]}));
        let users = UsersApi::new(test_client(SessionMode::Cookie, &transport));

        assert_eq!(users.list().await.unwrap(), vec![json!({"_id": "u1"})]);
        assert_eq!(transport.count(), 2);

        users.list().await.unwrap();
        let paths: Vec<_> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/users/users", "/users", "/users"]);
    }

    #[tokio::test]
    async fn invite_validates_email_before_dispatch() {
        let transport = ScriptedTransport::new();
        let users = UsersApi::with_base(test_client(SessionMode::Token, &transport), "/users");

        let err = users.invite("not-an-email", "user").await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn role_and_activation_patch_the_member() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Patch, "/users/u1", 200, json!({"_id": "u1"}));
        let users = UsersApi::with_base(test_client(SessionMode::Token, &transport), "/users");

        users.set_role("u1", "admin").await.unwrap();
        users.set_active("u1", false).await.unwrap();
        let sent = transport.requests();
        assert_eq!(sent[0].json_body(), Some(&json!({"role": "admin"})));
        assert_eq!(sent[1].json_body(), Some(&json!({"active": false})));
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("ada@zura.io"));
        assert!(!looks_like_email("ada@zura"));
        assert!(!looks_like_email("@zura.io"));
        assert!(!looks_like_email("a da@zura.io"));
    }
}
