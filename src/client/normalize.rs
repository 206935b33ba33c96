use serde_json::Value;

use crate::client::interceptor::ResponseInterceptor;
use crate::client::request::RequestDescriptor;
use crate::client::response::{Payload, RawResponse};

/// Collections whose list endpoints may answer with `{ "items": [...] }`.
pub const LIST_RESOURCES: &[&str] = &[
    "leads",
    "contacts",
    "products",
    "deals",
    "quotes",
    "invoices",
    "salesorders",
    "tasks",
    "meetings",
    "calls",
    "documents",
    "campaigns",
    "activities",
    "forecasts",
];

/// Envelope field carrying the sequence.
pub const ITEMS_FIELD: &str = "items";

/// Unwraps list envelopes on successful collection reads.
///
/// Only `GET /{resource}` for an allow-listed resource is touched; record
/// reads (`/leads/42`), nested routes (`/deals/stages`) and every other
/// payload pass through unchanged.
pub struct ListNormalizer {
    resources: Vec<String>,
}

impl ListNormalizer {
    pub fn new() -> Self {
        Self::with_resources(LIST_RESOURCES.iter().copied())
    }

    pub fn with_resources<'a>(resources: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            resources: resources
                .into_iter()
                .map(|r| r.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn is_collection_path(&self, path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_start_matches('/');
        let path = path.strip_prefix("api/").unwrap_or(path);
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        match (segments.next(), segments.next()) {
            (Some(resource), None) => {
                let resource = resource.to_ascii_lowercase();
                self.resources.iter().any(|r| *r == resource)
            }
            _ => false,
        }
    }
}

impl Default for ListNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseInterceptor for ListNormalizer {
    fn name(&self) -> &'static str {
        "list_normalizer"
    }

    fn on_success(&self, request: &RequestDescriptor, response: &mut RawResponse) {
        if !request.method.is_read() || !self.is_collection_path(&request.path) {
            return;
        }
        let Payload::Json(Value::Object(map)) = &mut response.payload else {
            return;
        };
        if !matches!(map.get(ITEMS_FIELD), Some(Value::Array(_))) {
            return;
        }
        if let Some(items) = map.remove(ITEMS_FIELD) {
            tracing::trace!("Unwrapped list envelope for {}", request.path);
            response.payload = Payload::Json(items);
        }
    }
}

/// Sequence view of a list payload: bare array, `items` envelope, else empty.
pub fn to_items(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(ITEMS_FIELD) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Like [`to_items`] but `None` when the payload is not list-shaped.
pub fn as_items(payload: &Value) -> Option<&Vec<Value>> {
    match payload {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get(ITEMS_FIELD).and_then(Value::as_array),
        _ => None,
    }
}
