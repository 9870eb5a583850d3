use reqwest::Method;
use serde_json::Value as JsonValue;
use url::form_urlencoded;

/// Query string parameters in insertion order.
///
/// Entries whose value is JSON `null` are kept here but never serialized.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryParams(Vec<(String, JsonValue)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn push(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// Appends a parameter only when `value` is present.
    pub fn push_opt<V: Into<JsonValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Serializes the non-null entries as `application/x-www-form-urlencoded`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.iter() {
            if let Some(value) = stringify(value) {
                serializer.append_pair(key, &value);
            }
        }
        serializer.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<JsonValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<Pagination> for QueryParams {
    fn from(pagination: Pagination) -> Self {
        QueryParams::new()
            .push_opt("page", pagination.page)
            .push_opt("limit", pagination.limit)
    }
}

fn stringify(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Page selection for list endpoints.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Pagination {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Items per page, 1 to 100.
    pub limit: Option<u32>,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            limit: None,
        }
    }

    pub fn limit(limit: u32) -> Self {
        Self {
            page: None,
            limit: Some(limit),
        }
    }
}

/// A logical request: what the caller wants, before any transmission.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL. Ids must already be
    /// percent-encoded.
    pub path: String,
    pub query: QueryParams,
    /// Serialized as JSON when present.
    pub body: Option<JsonValue>,
    /// Per-request header overrides; these win over every other tier.
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryParams::default(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, query: impl Into<QueryParams>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Strips a single trailing slash from a base URL.
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_owned()
}

/// Joins `base_url` and `endpoint` and appends the serialized query.
///
/// `base_url` is expected to carry no trailing slash. The endpoint gets
/// exactly one leading slash.
pub fn build_url(base_url: &str, endpoint: &str, params: Option<&QueryParams>) -> String {
    let endpoint = endpoint.trim_start_matches('/');
    let mut url = format!("{base_url}/{endpoint}");

    if let Some(params) = params {
        let query = params.to_query_string();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
    }

    url
}
