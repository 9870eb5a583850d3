use reqwest::{
    header::{self, HeaderMap},
    StatusCode,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::{transport::RawResponse, ErrorBody, MelonlyError, Result};

const RETRY_AFTER: &str = "retry-after";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Classifies a raw response into a payload or a [`MelonlyError`].
///
/// The body is parsed before the status is looked at, so error answers keep
/// their structured detail. Bodies without a JSON content type come back as a
/// JSON string.
pub fn interpret(response: RawResponse) -> Result<JsonValue> {
    let status = response.status;
    let body = parse_body(status, &response.headers, &response.body)?;

    if status.is_success() {
        return Ok(body);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(MelonlyError::rate_limit(
            header_number(&response.headers, RETRY_AFTER),
            header_number(&response.headers, RATE_LIMIT_RESET),
        ));
    }

    let message = error_message(status, &body);
    Err(MelonlyError::api(status.as_u16(), message, Some(body)))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            let value = value.to_ascii_lowercase();
            value.contains("application/json") || value.contains("+json")
        })
        .unwrap_or(false)
}

fn parse_body(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Result<JsonValue> {
    if !is_json(headers) {
        return Ok(JsonValue::String(String::from_utf8_lossy(body).into_owned()));
    }

    serde_json::from_slice(body).map_err(|err| {
        MelonlyError::api(
            status.as_u16(),
            format!("failed to parse response body: {err}"),
            Some(JsonValue::String(String::from_utf8_lossy(body).into_owned())),
        )
    })
}

/// Prefers the server's `error` string, else `HTTP <status>: <reason>`.
fn error_message(status: StatusCode, body: &JsonValue) -> String {
    if let Ok(ErrorBody { error }) = ErrorBody::deserialize(body) {
        return error;
    }
    format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown Status")
    )
}

/// Reads a leading integer from a header, like `parseInt` would.
fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    let raw = headers.get(name)?.to_str().ok()?.trim();
    let end = raw
        .char_indices()
        .find(|(index, ch)| !(ch.is_ascii_digit() || (*index == 0 && *ch == '-')))
        .map(|(index, _)| index)
        .unwrap_or(raw.len());
    raw.get(..end)?.parse().ok()
}
