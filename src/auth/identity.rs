use serde::Serialize;
use serde_json::Value;

use crate::session::Credential;

/// Result of a successful identity probe: `{ user, org }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub user: Value,
    pub org: Option<Value>,
}

impl Identity {
    /// `None` unless the payload carries a non-null `user`.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let user = present(payload.get("user"))?.clone();
        let org = present(payload.get("org")).cloned();
        Some(Self { user, org })
    }

    pub fn tenant_id(&self) -> Option<String> {
        tenant_id_of(self.org.as_ref(), Some(&self.user))
    }

    pub fn role(&self) -> Option<&str> {
        self.user.get("role").and_then(Value::as_str)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some("admin")
    }

    /// An empty role list admits any user that has a role.
    pub fn has_role(&self, roles: &[&str]) -> bool {
        match self.role() {
            None => false,
            Some(_) if roles.is_empty() => true,
            Some(role) => roles.contains(&role),
        }
    }
}

/// Sign-in / sign-up response: `{ token?, user?, org? }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthOutcome {
    pub token: Option<String>,
    pub user: Option<Value>,
    pub org: Option<Value>,
    pub raw: Value,
}

impl AuthOutcome {
    pub fn from_payload(raw: Value) -> Self {
        let token = raw
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string);
        let user = present(raw.get("user")).cloned();
        let org = present(raw.get("org")).cloned();
        Self {
            token,
            user,
            org,
            raw,
        }
    }

    /// Explicit token, else the cookie-session placeholder.
    pub fn credential(&self) -> Credential {
        match &self.token {
            Some(token) => Credential::Bearer(token.clone()),
            None => Credential::CookieSession,
        }
    }

    pub fn tenant_id(&self) -> Option<String> {
        tenant_id_of(self.org.as_ref(), self.user.as_ref())
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// `org.id`, else `user.orgId`.
fn tenant_id_of(org: Option<&Value>, user: Option<&Value>) -> Option<String> {
    org.and_then(|o| o.get("id"))
        .and_then(id_string)
        .or_else(|| user.and_then(|u| u.get("orgId")).and_then(id_string))
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
