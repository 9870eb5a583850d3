//! Guard functions run before a request is built.
//!
//! Every failure is a [`MelonlyError::Validation`] naming the offending field,
//! raised before anything touches the network.

use url::Url;

use crate::{MelonlyError, Pagination, Result};

pub const MIN_TOKEN_LEN: usize = 10;
pub const MAX_PAGE: u32 = 10_000;
pub const MAX_LIMIT: u32 = 100;
pub const MIN_TIMEOUT_MS: u64 = 1_000;
pub const MAX_TIMEOUT_MS: u64 = 300_000;
pub const MAX_RETRIES: u32 = 10;

/// Checks that an API token is present and plausibly formed.
pub fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(MelonlyError::validation("token", "", "API token is required"));
    }
    if token.trim().is_empty() {
        return Err(MelonlyError::validation(
            "token",
            "<blank>",
            "API token cannot be empty",
        ));
    }
    if token.chars().count() < MIN_TOKEN_LEN {
        // The value is deliberately not echoed back.
        return Err(MelonlyError::validation(
            "token",
            "<redacted>",
            "API token appears to be invalid (too short)",
        ));
    }
    Ok(())
}

/// Checks a path-segment identifier.
pub fn validate_id(id: &str, field: &str) -> Result<()> {
    if id.is_empty() {
        return Err(MelonlyError::validation(field, id, format!("{field} is required")));
    }
    if id.trim().is_empty() {
        return Err(MelonlyError::validation(
            field,
            id,
            format!("{field} cannot be empty"),
        ));
    }
    if id.contains(['/', '?', '#']) {
        return Err(MelonlyError::validation(
            field,
            id,
            format!("{field} contains invalid characters"),
        ));
    }
    Ok(())
}

/// Checks that a username is not blank.
pub fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(MelonlyError::validation(
            "username",
            username,
            "username is required and cannot be empty",
        ));
    }
    Ok(())
}

/// Checks page and limit bounds.
pub fn validate_pagination(params: &Pagination) -> Result<()> {
    if let Some(page) = params.page {
        if page < 1 {
            return Err(MelonlyError::validation(
                "page",
                page,
                "page must be a positive integer starting from 1",
            ));
        }
        if page > MAX_PAGE {
            return Err(MelonlyError::validation(
                "page",
                page,
                format!("page number is too large (maximum: {MAX_PAGE})"),
            ));
        }
    }

    if let Some(limit) = params.limit {
        if limit < 1 {
            return Err(MelonlyError::validation(
                "limit",
                limit,
                "limit must be a positive integer",
            ));
        }
        if limit > MAX_LIMIT {
            return Err(MelonlyError::validation(
                "limit",
                limit,
                format!("limit cannot exceed {MAX_LIMIT} items per page"),
            ));
        }
    }
    Ok(())
}

/// Checks that `url` parses and uses HTTPS.
pub fn validate_url(url: &str, field: &str) -> Result<()> {
    if url.is_empty() {
        return Err(MelonlyError::validation(field, url, format!("{field} is required")));
    }
    let parsed = Url::parse(url).map_err(|_| {
        MelonlyError::validation(field, url, format!("{field} must be a valid URL"))
    })?;
    if parsed.scheme() != "https" {
        return Err(MelonlyError::validation(
            field,
            url,
            format!("{field} must use HTTPS"),
        ));
    }
    Ok(())
}

/// Checks that a timeout lies within the accepted range.
pub fn validate_timeout(timeout_ms: u64) -> Result<()> {
    if timeout_ms < MIN_TIMEOUT_MS {
        return Err(MelonlyError::validation(
            "timeout_ms",
            timeout_ms,
            format!("timeout must be at least {MIN_TIMEOUT_MS}ms"),
        ));
    }
    if timeout_ms > MAX_TIMEOUT_MS {
        return Err(MelonlyError::validation(
            "timeout_ms",
            timeout_ms,
            format!("timeout cannot exceed {MAX_TIMEOUT_MS}ms (5 minutes)"),
        ));
    }
    Ok(())
}

pub fn validate_retry_count(retries: u32) -> Result<()> {
    if retries > MAX_RETRIES {
        return Err(MelonlyError::validation(
            "max_retries",
            retries,
            format!("retry count cannot exceed {MAX_RETRIES}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn field_of(err: MelonlyError) -> String {
        match err {
            MelonlyError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn token_rules() {
        assert!(validate_token("test-api-token-123").is_ok());
        assert_eq!(field_of(validate_token("").unwrap_err()), "token");
        assert_eq!(field_of(validate_token("    ").unwrap_err()), "token");
        assert_eq!(field_of(validate_token("short").unwrap_err()), "token");
    }

    #[test]
    fn short_token_is_not_echoed() {
        let err = validate_token("secret").unwrap_err();
        assert!(!err.to_json().to_string().contains("secret"));
    }

    #[test]
    fn id_rules() {
        assert!(validate_id("app-123", "applicationId").is_ok());
        for bad in ["", "  ", "a/b", "a?b", "a#b"] {
            let err = validate_id(bad, "applicationId").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert_eq!(field_of(err), "applicationId");
        }
    }

    #[test]
    fn pagination_bounds() {
        assert!(validate_pagination(&Pagination::default()).is_ok());
        assert!(validate_pagination(&Pagination::new(1, 100)).is_ok());
        assert!(validate_pagination(&Pagination::new(10_000, 1)).is_ok());

        assert_eq!(field_of(validate_pagination(&Pagination::page(0)).unwrap_err()), "page");
        assert_eq!(
            field_of(validate_pagination(&Pagination::page(10_001)).unwrap_err()),
            "page"
        );
        assert_eq!(field_of(validate_pagination(&Pagination::limit(0)).unwrap_err()), "limit");
        assert_eq!(
            field_of(validate_pagination(&Pagination::limit(101)).unwrap_err()),
            "limit"
        );
    }

    #[test]
    fn url_must_be_https() {
        assert!(validate_url("https://example.com/api/v1", "base_url").is_ok());
        assert!(validate_url("http://example.com", "base_url").is_err());
        assert!(validate_url("not a url", "base_url").is_err());
        assert!(validate_url("", "base_url").is_err());
    }

    #[test]
    fn timeout_and_retry_bounds() {
        assert!(validate_timeout(30_000).is_ok());
        assert!(validate_timeout(999).is_err());
        assert!(validate_timeout(300_001).is_err());
        assert!(validate_retry_count(0).is_ok());
        assert!(validate_retry_count(10).is_ok());
        assert!(validate_retry_count(11).is_err());
    }

    #[test]
    fn username_must_not_be_blank() {
        assert!(validate_username("kit").is_ok());
        assert!(validate_username(" \t").is_err());
    }
}
