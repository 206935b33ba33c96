use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// HTTP verbs the console issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self, Method::Get)
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered query parameters; repeated keys are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object. `null` and empty strings are skipped,
    /// arrays expand into repeated keys, other scalars are stringified.
    pub fn from_json(params: &Value) -> Self {
        let mut query = Self::new();
        let Some(map) = params.as_object() else {
            return query;
        };
        for (key, value) in map {
            match value {
                Value::Array(values) => {
                    for v in values {
                        query.push_value(key, v);
                    }
                }
                v => query.push_value(key, v),
            }
        }
        query
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Append `other` after the current pairs.
    pub fn extend(&mut self, other: QueryParams) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.pairs() {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }

    fn push_value(&mut self, key: &str, value: &Value) {
        match value {
            Value::Null => {}
            Value::String(s) if s.is_empty() => {}
            Value::String(s) => self.push(key, s.clone()),
            other => self.push(key, other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    None,
    Json(Value),
    Multipart {
        field: String,
        file_name: String,
        bytes: Vec<u8>,
    },
}

/// How the transport should decode a successful body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Json,
    Bytes,
}

/// One logical call, relative to the API root.
///
/// Request interceptors mutate the header map in place before dispatch.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: QueryParams,
    pub body: RequestBody,
    pub headers: HeaderMap,
    pub expect: ResponseKind,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        Self {
            method,
            path,
            query: QueryParams::new(),
            body: RequestBody::None,
            headers: HeaderMap::new(),
            expect: ResponseKind::Json,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.body = RequestBody::Multipart {
            field: field.into(),
            file_name: file_name.into(),
            bytes,
        };
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn expect_bytes(mut self) -> Self {
        self.expect = ResponseKind::Bytes;
        self
    }

    /// Path plus encoded query, for logs and error messages.
    pub fn display_path(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query.to_query_string())
        }
    }
}

/// Percent-encode one path segment (`/`, `?`, `#`, `%`, spaces) so a record
/// id can never address a different route.
pub fn path_segment(segment: &str) -> String {
    let Ok(mut url) = Url::parse("http://segment.invalid/") else {
        return segment.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    url.path().strip_prefix('/').unwrap_or(url.path()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_skips_blank_values_and_repeats_arrays() {
        let query = QueryParams::from_json(&json!({
            "q": "acme",
            "empty": "",
            "missing": null,
            "status": ["open", "won"],
            "limit": 25,
        }));
        let pairs: Vec<_> = query.pairs().collect();
        assert!(pairs.contains(&("q", "acme")));
        assert!(pairs.contains(&("status", "open")));
        assert!(pairs.contains(&("status", "won")));
        assert!(pairs.contains(&("limit", "25")));
        assert!(!pairs.iter().any(|(k, _)| *k == "empty" || *k == "missing"));
    }

    #[test]
    fn non_object_params_build_empty_query() {
        assert!(QueryParams::from_json(&json!(["a"])).is_empty());
        assert!(QueryParams::from_json(&Value::Null).is_empty());
    }

    #[test]
    fn paths_are_rooted() {
        let req = RequestDescriptor::get("leads");
        assert_eq!(req.path, "/leads");
        let req = req.query(QueryParams::new().with("view", "kanban"));
        assert_eq!(req.display_path(), "/leads?view=kanban");
    }

    #[test]
    fn path_segment_keeps_ids_inside_one_segment() {
        assert_eq!(path_segment("64f1c2"), "64f1c2");
        assert_eq!(path_segment("a/b?c#d"), "a%2Fb%3Fc%23d");
        assert_eq!(path_segment("Q 1 100%"), "Q%201%20100%25");
    }
}
