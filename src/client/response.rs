use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Bytes(Vec<u8>),
}

/// What the transport received, before it is turned into a value or an error.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub payload: Payload,
}

impl RawResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            payload: Payload::Json(body),
        }
    }

    pub fn bytes(status: u16, bytes: Vec<u8>) -> Self {
        Self {
            status,
            payload: Payload::Bytes(bytes),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// JSON body; binary payloads read as `null`.
    pub fn into_json(self) -> Value {
        match self.payload {
            Payload::Json(value) => value,
            Payload::Bytes(_) => Value::Null,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self.payload {
            Payload::Bytes(bytes) => bytes,
            Payload::Json(Value::Null) => Vec::new(),
            Payload::Json(value) => value.to_string().into_bytes(),
        }
    }

    /// Backend payload worth attaching to an error.
    pub(crate) fn error_payload(self) -> Option<Value> {
        match self.payload {
            Payload::Json(Value::Null) | Payload::Bytes(_) => None,
            Payload::Json(value) => Some(value),
        }
    }
}
