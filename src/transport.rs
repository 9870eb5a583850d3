use std::future::Future;
use std::time::Duration;

use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Method, StatusCode,
};

use crate::{MelonlyError, Result};

/// Product identifier sent as `User-Agent`.
pub const USER_AGENT: &str = concat!("melonly-http/", env!("CARGO_PKG_VERSION"));

/// One network exchange, fully prepared.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// UTF-8 JSON body.
    pub body: Option<Vec<u8>>,
}

/// A response with its body fully read but not yet parsed.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Builds a response with `content-type: application/json`.
    pub fn json(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self::new(status, headers, body)
    }
}

/// Performs a single HTTP exchange.
///
/// Implementations must turn every connection-level failure into
/// [`MelonlyError::Network`]. Timeouts are enforced by the caller, which drops
/// the returned future when the deadline passes.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<RawResponse>> + Send;
}

/// Production transport backed by `reqwest`.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses an existing `reqwest` client (and its connection pool).
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<RawResponse>> + Send {
        async move {
            let mut builder = self
                .http
                .request(request.method, &request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(classify_reqwest_error)?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(|err| {
                MelonlyError::network_with_source("failed to read response body", err)
            })?;

            Ok(RawResponse {
                status,
                headers,
                body: body.to_vec(),
            })
        }
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> MelonlyError {
    let message = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_body() {
        "failed to send request body"
    } else {
        "request failed"
    };
    MelonlyError::network_with_source(message, err)
}

/// Runs one exchange under a hard deadline.
///
/// When the deadline passes the in-flight future is dropped, so a late
/// response can never be observed.
pub async fn send_with_timeout<T: Transport>(
    transport: &T,
    request: HttpRequest,
    timeout: Duration,
) -> Result<RawResponse> {
    match tokio::time::timeout(timeout, transport.send(request)).await {
        Ok(result) => result,
        Err(_) => Err(MelonlyError::network(format!(
            "request timeout after {}ms",
            timeout.as_millis()
        ))),
    }
}

/// Headers every request starts from.
pub(crate) fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers
}

/// Converts caller-supplied header pairs, rejecting illegal names or values.
pub(crate) fn parse_headers(pairs: &[(String, String)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            MelonlyError::validation("headers", name.as_str(), "invalid header name")
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            MelonlyError::validation(
                "headers",
                name.as_str(),
                format!("invalid value for header {name}"),
            )
        })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// Merges the header tiers of one request.
///
/// Precedence, lowest to highest: built-in defaults, client configuration,
/// the client's bearer `Authorization`, per-request overrides. Configured
/// headers can therefore never replace the token; only a per-request header
/// can. Names compare case-insensitively; a higher tier replaces every value
/// of a name set by a lower tier.
pub fn merge_headers(
    defaults: &HeaderMap,
    configured: &HeaderMap,
    authorization: &HeaderValue,
    per_request: &HeaderMap,
) -> HeaderMap {
    let mut merged = defaults.clone();
    merged.extend(configured.clone());
    merged.insert(header::AUTHORIZATION, authorization.clone());
    merged.extend(per_request.clone());
    merged
}

/// Builds the `Authorization` value from a token.
///
/// A token that already carries a `Bearer ` prefix is used as-is. The value
/// is marked sensitive so it never shows up in `Debug` output.
pub(crate) fn bearer_authorization(token: &str) -> Result<HeaderValue> {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    let value = if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    };
    let mut value = HeaderValue::from_str(&value).map_err(|_| {
        MelonlyError::validation("token", "<redacted>", "API token contains invalid characters")
    })?;
    value.set_sensitive(true);
    Ok(value)
}
