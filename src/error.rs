use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value as JsonValue};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Machine-readable tag for a [`MelonlyError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Validation,
    Network,
    RateLimit,
    Api,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Network => "network",
            Self::RateLimit => "rate_limit",
            Self::Api => "api",
        }
    }

    /// Error class name as reported in diagnostics.
    pub fn error_name(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::Network => "NetworkError",
            Self::RateLimit => "RateLimitError",
            Self::Api => "MelonlyError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type returned by this crate.
///
/// Every failed call produces exactly one of these four variants. Each one
/// records the moment it was created for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum MelonlyError {
    /// Caller input was malformed; nothing was sent over the wire.
    #[error("invalid {field}: {message}")]
    Validation {
        field: String,
        /// Offending value as supplied by the caller.
        value: JsonValue,
        message: String,
        timestamp: DateTime<Utc>,
    },
    /// The exchange never completed (timeout, DNS, refused or reset
    /// connection, unreadable body).
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxError>,
        timestamp: DateTime<Utc>,
    },
    /// Server answered 429.
    #[error("rate limit exceeded")]
    RateLimit {
        /// Parsed `retry-after` header, in seconds.
        retry_after_seconds: Option<u64>,
        /// Parsed `x-ratelimit-reset` header, in Unix seconds.
        reset_timestamp: Option<i64>,
        timestamp: DateTime<Utc>,
    },
    /// Server answered with any other non-success status, or sent a body
    /// that could not be decoded.
    #[error("api error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        /// Parsed response body (JSON, or a JSON string for text bodies).
        body: Option<JsonValue>,
        timestamp: DateTime<Utc>,
    },
}

impl MelonlyError {
    pub fn validation(
        field: impl Into<String>,
        value: impl Into<JsonValue>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            value: value.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
            timestamp: Utc::now(),
        }
    }

    /// Wraps a lower-level failure, keeping it reachable through
    /// [`std::error::Error::source`].
    pub fn network_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Network {
            message: message.into(),
            source: Some(source.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn rate_limit(retry_after_seconds: Option<u64>, reset_timestamp: Option<i64>) -> Self {
        Self::RateLimit {
            retry_after_seconds,
            reset_timestamp,
            timestamp: Utc::now(),
        }
    }

    pub fn api(status: u16, message: impl Into<String>, body: Option<JsonValue>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            body,
            timestamp: Utc::now(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Network { .. } => ErrorKind::Network,
            Self::RateLimit { .. } => ErrorKind::RateLimit,
            Self::Api { .. } => ErrorKind::Api,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Validation { timestamp, .. }
            | Self::Network { timestamp, .. }
            | Self::RateLimit { timestamp, .. }
            | Self::Api { timestamp, .. } => *timestamp,
        }
    }

    /// HTTP status the server answered with, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimit { .. } => Some(429),
            _ => None,
        }
    }

    /// Whether the executor treats this failure as transient.
    ///
    /// Only network failures and 5xx API answers qualify. Rate limits are
    /// surfaced to the caller, who decides whether to wait.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Validation { .. } | Self::RateLimit { .. } => false,
        }
    }

    /// Moment the rate limit window resets, derived from `x-ratelimit-reset`.
    pub fn reset_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::RateLimit {
                reset_timestamp: Some(reset),
                ..
            } => Utc.timestamp_opt(*reset, 0).single(),
            _ => None,
        }
    }

    /// Milliseconds left until the rate limit resets, never negative.
    pub fn millis_until_reset(&self) -> Option<u64> {
        self.millis_until_reset_at(Utc::now())
    }

    pub(crate) fn millis_until_reset_at(&self, now: DateTime<Utc>) -> Option<u64> {
        let reset = self.reset_time()?;
        let remaining = reset.signed_duration_since(now).num_milliseconds();
        Some(remaining.max(0) as u64)
    }

    /// Renders the error as a JSON object suitable for structured logs.
    pub fn to_json(&self) -> JsonValue {
        let mut out = json!({
            "name": self.kind().error_name(),
            "kind": self.kind().as_str(),
            "message": self.to_string(),
            "timestamp": self.timestamp().to_rfc3339(),
        });
        let extra = match self {
            Self::Validation { field, value, .. } => json!({ "field": field, "value": value }),
            Self::Network { source, .. } => {
                json!({ "cause": source.as_ref().map(|err| err.to_string()) })
            }
            Self::RateLimit {
                retry_after_seconds,
                reset_timestamp,
                ..
            } => json!({
                "status": 429,
                "retryAfterSeconds": retry_after_seconds,
                "resetTimestamp": reset_timestamp,
                "resetDate": self.reset_time().map(|date| date.to_rfc3339()),
                "millisecondsUntilReset": self.millis_until_reset(),
            }),
            Self::Api { status, body, .. } => json!({ "status": status, "body": body }),
        };
        if let (Some(out), JsonValue::Object(extra)) = (out.as_object_mut(), extra) {
            out.extend(extra);
        }
        out
    }
}
