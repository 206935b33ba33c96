// Client-side API error types
use serde_json::{json, Value};
use thiserror::Error;

/// Normalized failure surfaced by every client operation.
///
/// Carries a human-readable message, the HTTP status when a response was
/// received, and the raw backend payload when one was returned, so callers
/// can render any failure the same way.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No response was received (unreachable host, timeout, aborted task)
    #[error("{message}")]
    Transport { message: String, timeout: bool },

    /// 401 on any call
    #[error("{message}")]
    Authentication {
        message: String,
        payload: Option<Value>,
    },

    /// Every candidate route failed with a routing status
    #[error("{message}")]
    RouteMismatch {
        message: String,
        operation: String,
        tried: Vec<String>,
    },

    /// Any other non-2xx response
    #[error("{message}")]
    Application {
        message: String,
        status: u16,
        payload: Option<Value>,
    },

    /// Rejected before dispatch
    #[error("{message}")]
    Validation { message: String, field: Option<String> },
}

impl ApiError {
    /// Build the error for a non-2xx response.
    pub fn from_status(status: u16, payload: Option<Value>) -> Self {
        let message = extract_message(status, payload.as_ref());
        if status == 401 {
            ApiError::Authentication { message, payload }
        } else {
            ApiError::Application {
                message,
                status,
                payload,
            }
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::Transport {
            message: message.into(),
            timeout: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        ApiError::Transport {
            message: message.into(),
            timeout: true,
        }
    }

    pub fn route_mismatch(operation: impl Into<String>, tried: Vec<String>) -> Self {
        let operation = operation.into();
        ApiError::RouteMismatch {
            message: format!(
                "No matching backend route for {} (tried {})",
                operation,
                tried.join(", ")
            ),
            operation,
            tried,
        }
    }

    pub fn validation(message: impl Into<String>, field: Option<&str>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field: field.map(str::to_string),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Transport { message, .. } => message,
            ApiError::Authentication { message, .. } => message,
            ApiError::RouteMismatch { message, .. } => message,
            ApiError::Application { message, .. } => message,
            ApiError::Validation { message, .. } => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication { .. } => Some(401),
            ApiError::Application { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            ApiError::Authentication { payload, .. } => payload.as_ref(),
            ApiError::Application { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::Authentication { .. })
    }

    /// 404/405: the verb or path is not mounted for this operation.
    pub fn is_route_mismatch(&self) -> bool {
        matches!(self.status(), Some(404) | Some(405))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Transport { timeout: true, .. } => "TIMEOUT",
            ApiError::Transport { .. } => "TRANSPORT_ERROR",
            ApiError::Authentication { .. } => "UNAUTHORIZED",
            ApiError::RouteMismatch { .. } => "ROUTE_MISMATCH",
            ApiError::Application { .. } => "APPLICATION_ERROR",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code(),
            "status": self.status(),
        });
        if let Some(payload) = self.payload() {
            body["server"] = payload.clone();
        }
        match self {
            ApiError::RouteMismatch { tried, .. } => body["tried"] = json!(tried),
            ApiError::Validation {
                field: Some(field), ..
            } => body["field"] = json!(field),
            _ => {}
        }
        body
    }
}

fn extract_message(status: u16, payload: Option<&Value>) -> String {
    let from_server = payload.and_then(|p| {
        ["message", "error"]
            .iter()
            .find_map(|key| p.get(*key).and_then(Value::as_str))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    });
    match from_server {
        Some(message) => message,
        None => match reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
        {
            Some(reason) => format!("Request failed ({} {})", status, reason),
            None => format!("Request failed ({})", status),
        },
    }
}

/// Failures of the durable session medium.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("No configuration directory available: {0}")]
    NoConfigDir(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
