use std::fmt;
use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue},
    StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::time::sleep;
use url::Url;

use crate::{
    request::{build_url, normalize_base_url},
    response::interpret,
    retry::{AttemptOutcome, RetryPolicy},
    transport::{
        bearer_authorization, default_headers, merge_headers, parse_headers, send_with_timeout,
        HttpRequest, ReqwestTransport, Transport,
    },
    validation::{validate_retry_count, validate_token},
    ApiRequest, ClientOptions, MelonlyError, QueryParams, Result,
};

const TOKEN_ENV: &str = "MELONLY_TOKEN";
const BASE_URL_ENV: &str = "MELONLY_BASE_URL";

/// HTTP client for the Melonly API.
///
/// Every call goes through [`MelonlyClient::execute`], which retries network
/// failures and 5xx answers with exponential backoff and returns exactly one
/// payload or one [`MelonlyError`]. The client holds no mutable state, so
/// concurrent calls on one instance (or its clones) are independent.
#[derive(Clone)]
pub struct MelonlyClient<T = ReqwestTransport> {
    transport: T,
    options: ClientOptions,
    base_url: String,
    default_headers: HeaderMap,
    configured_headers: HeaderMap,
    authorization: HeaderValue,
    timeout: Duration,
    retry: RetryPolicy,
}

impl<T> fmt::Debug for MelonlyClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MelonlyClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl MelonlyClient<ReqwestTransport> {
    /// Creates a client with default options.
    pub fn new(token: impl AsRef<str>) -> Result<Self> {
        Self::with_options(token, ClientOptions::default())
    }

    /// Creates a client with explicit options.
    ///
    /// The token and options are checked before any transport is created.
    pub fn with_options(token: impl AsRef<str>, options: ClientOptions) -> Result<Self> {
        let parts = Parts::prepare(token.as_ref(), &options)?;
        Ok(parts.into_client(options, ReqwestTransport::new()))
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `MELONLY_TOKEN`: API token (required)
    /// - `MELONLY_BASE_URL`: API root (optional)
    ///
    /// Unlike the plain constructors, this applies the strict production
    /// checks of [`ClientOptions::validate`].
    pub fn from_env() -> Result<Self> {
        let (token, options) = config_from_lookup(|name| std::env::var(name).ok())?;
        Self::with_options(token, options)
    }
}

impl<T: Transport> MelonlyClient<T> {
    /// Creates a client on top of a custom [`Transport`].
    pub fn with_transport(
        token: impl AsRef<str>,
        options: ClientOptions,
        transport: T,
    ) -> Result<Self> {
        let parts = Parts::prepare(token.as_ref(), &options)?;
        Ok(parts.into_client(options, transport))
    }

    /// Returns the options this client was built with.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Executes a logical request and decodes the payload into `R`.
    ///
    /// Use `serde_json::Value` for `R` to get the payload untouched. A payload
    /// that does not fit `R` is reported as [`MelonlyError::Api`] with the
    /// status the server answered with.
    pub async fn execute<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        let (status, payload) = self.execute_with_retry(&request).await?;
        <R as Deserialize>::deserialize(&payload).map_err(|err| {
            MelonlyError::api(
                status.as_u16(),
                format!("unexpected response shape: {err}"),
                Some(payload.clone()),
            )
        })
    }

    /// Sends a `GET` with the given query.
    pub async fn get<R: DeserializeOwned>(
        &self,
        path: impl Into<String>,
        query: impl Into<QueryParams>,
    ) -> Result<R> {
        self.execute(ApiRequest::get(path).with_query(query)).await
    }

    /// Sends a `POST` with a JSON body.
    pub async fn post<R: DeserializeOwned, B: Serialize>(
        &self,
        path: impl Into<String>,
        body: &B,
    ) -> Result<R> {
        self.execute(ApiRequest::post(path).with_body(to_json_body(body)?))
            .await
    }

    /// Sends a `PUT` with a JSON body.
    pub async fn put<R: DeserializeOwned, B: Serialize>(
        &self,
        path: impl Into<String>,
        body: &B,
    ) -> Result<R> {
        self.execute(ApiRequest::put(path).with_body(to_json_body(body)?))
            .await
    }

    /// Sends a `PATCH` with a JSON body.
    pub async fn patch<R: DeserializeOwned, B: Serialize>(
        &self,
        path: impl Into<String>,
        body: &B,
    ) -> Result<R> {
        self.execute(ApiRequest::patch(path).with_body(to_json_body(body)?))
            .await
    }

    /// Sends a `DELETE`.
    pub async fn delete<R: DeserializeOwned>(&self, path: impl Into<String>) -> Result<R> {
        self.execute(ApiRequest::delete(path)).await
    }

    async fn execute_with_retry(&self, request: &ApiRequest) -> Result<(StatusCode, JsonValue)> {
        let url = build_url(&self.base_url, &request.path, Some(&request.query));
        let per_request = parse_headers(&request.headers)?;
        let headers = merge_headers(
            &self.default_headers,
            &self.configured_headers,
            &self.authorization,
            &per_request,
        );
        let body = match &request.body {
            Some(body) => Some(serde_json::to_vec(body).map_err(|err| {
                MelonlyError::validation(
                    "body",
                    JsonValue::Null,
                    format!("failed to serialize request body: {err}"),
                )
            })?),
            None => None,
        };

        for attempt in 1..=self.retry.max_attempts() {
            if self.options.debug {
                tracing::debug!(method = %request.method, %url, attempt, "sending request");
            }

            let exchange = HttpRequest {
                method: request.method.clone(),
                url: url.clone(),
                headers: headers.clone(),
                body: body.clone(),
            };
            let sent = send_with_timeout(&self.transport, exchange, self.timeout).await;
            let (status, result) = match sent {
                Ok(response) => (response.status, interpret(response)),
                Err(err) => (StatusCode::OK, Err(err)),
            };

            let failure = match AttemptOutcome::classify(result) {
                AttemptOutcome::Success(payload) => return Ok((status, payload)),
                AttemptOutcome::TerminalFailure(err) => return Err(err),
                AttemptOutcome::RetryableFailure(err) => err,
            };

            let decision = self.retry.should_retry(attempt, &failure);
            if !decision.retry {
                return Err(failure);
            }

            if self.options.debug {
                tracing::debug!(
                    method = %request.method,
                    %url,
                    attempt,
                    delay_ms = decision.delay.as_millis() as u64,
                    error = %failure,
                    "retrying request"
                );
            }
            sleep(decision.delay).await;
        }

        Err(MelonlyError::network("request failed after all retry attempts"))
    }
}

/// Validated pieces of a client, built before any transport exists.
struct Parts {
    base_url: String,
    default_headers: HeaderMap,
    configured_headers: HeaderMap,
    authorization: HeaderValue,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Parts {
    fn prepare(token: &str, options: &ClientOptions) -> Result<Self> {
        validate_token(token)?;
        let authorization = bearer_authorization(token)?;

        let base_url = normalize_base_url(&options.base_url);
        let parsed = Url::parse(&base_url).map_err(|_| {
            MelonlyError::validation("base_url", base_url.as_str(), "base_url must be a valid URL")
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MelonlyError::validation(
                "base_url",
                base_url.as_str(),
                "base_url must use http or https",
            ));
        }

        if options.timeout_ms == 0 {
            return Err(MelonlyError::validation(
                "timeout_ms",
                0,
                "timeout must be greater than zero",
            ));
        }
        validate_retry_count(options.max_retries)?;

        Ok(Self {
            base_url,
            default_headers: default_headers(),
            configured_headers: parse_headers(&options.headers)?,
            authorization,
            timeout: Duration::from_millis(options.timeout_ms),
            retry: RetryPolicy::new(options.max_retries),
        })
    }

    fn into_client<T>(self, options: ClientOptions, transport: T) -> MelonlyClient<T> {
        MelonlyClient {
            transport,
            options,
            base_url: self.base_url,
            default_headers: self.default_headers,
            configured_headers: self.configured_headers,
            authorization: self.authorization,
            timeout: self.timeout,
            retry: self.retry,
        }
    }
}

fn to_json_body<B: Serialize>(body: &B) -> Result<JsonValue> {
    serde_json::to_value(body).map_err(|err| {
        MelonlyError::validation(
            "body",
            JsonValue::Null,
            format!("failed to serialize request body: {err}"),
        )
    })
}

fn config_from_lookup<F>(lookup: F) -> Result<(String, ClientOptions)>
where
    F: Fn(&str) -> Option<String>,
{
    let token = lookup(TOKEN_ENV)
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| {
            MelonlyError::validation(
                TOKEN_ENV,
                JsonValue::Null,
                format!("missing {TOKEN_ENV} environment variable"),
            )
        })?;

    let mut options = ClientOptions::default();
    if let Some(base_url) = lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
        options.base_url = base_url;
    }
    options.validate()?;
    Ok((token, options))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };
    use std::time::Duration;

    use reqwest::{header, Method, StatusCode};
    use serde::Deserialize;
    use serde_json::{json, Value as JsonValue};
    use tracing_test::traced_test;

    use super::{config_from_lookup, MelonlyClient};
    use crate::{
        transport::{HttpRequest, RawResponse, Transport},
        ApiRequest, ClientOptions, ErrorKind, MelonlyError, Pagination, Result,
    };

    const TOKEN: &str = "test-api-token-123";

    /// Plays back queued outcomes and records every request it receives.
    #[derive(Clone, Default)]
    struct ScriptedTransport {
        script: Arc<Mutex<VecDeque<Result<RawResponse>>>>,
        requests: Arc<Mutex<Vec<HttpRequest>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<RawResponse>>) -> Self {
            Self {
                script: Arc::new(Mutex::new(script.into())),
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> HttpRequest {
            self.requests
                .lock()
                .expect("request log mutex must not be poisoned")
                .last()
                .cloned()
                .expect("at least one request must be recorded")
        }
    }

    impl Transport for ScriptedTransport {
        fn send(
            &self,
            request: HttpRequest,
        ) -> impl Future<Output = Result<RawResponse>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests
                .lock()
                .expect("request log mutex must not be poisoned")
                .push(request);
            let next = self
                .script
                .lock()
                .expect("script mutex must not be poisoned")
                .pop_front()
                .unwrap_or_else(|| Ok(json_response(500, json!({"error": "script exhausted"}))));
            async move { next }
        }
    }

    /// Never answers; only the client's deadline ends the exchange.
    #[derive(Clone, Default)]
    struct HangingTransport {
        calls: Arc<AtomicUsize>,
    }

    impl Transport for HangingTransport {
        fn send(
            &self,
            _request: HttpRequest,
        ) -> impl Future<Output = Result<RawResponse>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async move {
                std::future::pending::<()>().await;
                Ok(json_response(200, json!({})))
            }
        }
    }

    fn json_response(status: u16, body: JsonValue) -> RawResponse {
        RawResponse::json(
            StatusCode::from_u16(status).expect("valid status"),
            body.to_string().into_bytes(),
        )
    }

    fn options(max_retries: u32) -> ClientOptions {
        ClientOptions::default()
            .with_base_url("https://api.example.com/api/v1/")
            .with_max_retries(max_retries)
    }

    fn client(
        max_retries: u32,
        script: Vec<Result<RawResponse>>,
    ) -> (MelonlyClient<ScriptedTransport>, ScriptedTransport) {
        let transport = ScriptedTransport::new(script);
        let client = MelonlyClient::with_transport(TOKEN, options(max_retries), transport.clone())
            .expect("client must build");
        (client, transport)
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_server_error_uses_every_attempt() {
        for max_retries in 1..=5 {
            let script = (0..max_retries)
                .map(|_| Ok(json_response(503, json!({"error": "unavailable"}))))
                .collect();
            let (client, transport) = client(max_retries, script);

            let err = client
                .execute::<JsonValue>(ApiRequest::get("/server/info"))
                .await
                .expect_err("request must fail");

            assert_eq!(transport.calls(), max_retries as usize);
            match err {
                MelonlyError::Api { status, message, .. } => {
                    assert_eq!(status, 503);
                    assert_eq!(message, "unavailable");
                }
                other => panic!("expected api error, got {other:?}"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_two_server_errors() {
        let (client, transport) = client(
            3,
            vec![
                Ok(json_response(500, json!({"error": "boom"}))),
                Ok(json_response(500, json!({"error": "boom"}))),
                Ok(json_response(200, json!({"id": "server-123"}))),
            ],
        );

        let payload: JsonValue = client
            .execute(ApiRequest::get("/server/info"))
            .await
            .expect("third attempt must succeed");

        assert_eq!(payload, json!({"id": "server-123"}));
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_delays_follow_the_schedule() {
        let (client, _transport) = client(3, Vec::new());
        let started = tokio::time::Instant::now();

        let _ = client.execute::<JsonValue>(ApiRequest::get("/server/info")).await;

        // Two sleeps: [1000, 2000) after attempt 1 and [2000, 3000) after attempt 2.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(3_000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(5_000), "{elapsed:?}");
    }

    #[tokio::test]
    async fn rate_limit_is_surfaced_immediately() {
        let mut response = json_response(429, json!({"error": "too many requests"}));
        response
            .headers
            .insert("retry-after", header::HeaderValue::from_static("60"));
        let (client, transport) = client(3, vec![Ok(response)]);

        let err = client
            .execute::<JsonValue>(ApiRequest::get("/server/members"))
            .await
            .expect_err("429 must fail");

        assert_eq!(transport.calls(), 1);
        match err {
            MelonlyError::RateLimit {
                retry_after_seconds,
                reset_timestamp,
                ..
            } => {
                assert_eq!(retry_after_seconds, Some(60));
                assert_eq!(reset_timestamp, None);
            }
            other => panic!("expected rate limit error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let (client, transport) = client(
            3,
            vec![Ok(json_response(400, json!({"error": "bad request"})))],
        );

        let err = client
            .execute::<JsonValue>(ApiRequest::get("/server/logs"))
            .await
            .expect_err("400 must fail");

        assert_eq!(transport.calls(), 1);
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.kind(), ErrorKind::Api);
    }

    #[tokio::test]
    async fn invalid_json_on_success_is_an_api_error() {
        let (client, transport) = client(
            3,
            vec![Ok(RawResponse::json(StatusCode::OK, b"not json".to_vec()))],
        );

        let err = client
            .execute::<JsonValue>(ApiRequest::get("/server/info"))
            .await
            .expect_err("bad JSON must fail");

        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.status(), Some(200));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn network_errors_are_retried() {
        let (client, transport) = client(
            3,
            vec![
                Err(MelonlyError::network("connection reset")),
                Ok(json_response(200, json!({"ok": true}))),
            ],
        );

        let payload: JsonValue = client
            .execute(ApiRequest::get("/server/info"))
            .await
            .expect("second attempt must succeed");

        assert_eq!(payload["ok"], true);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn timeouts_are_retried_then_surfaced() {
        let transport = HangingTransport::default();
        let client = MelonlyClient::with_transport(
            TOKEN,
            options(2).with_timeout_ms(1_000),
            transport.clone(),
        )
        .expect("client must build");

        let err = client
            .execute::<JsonValue>(ApiRequest::get("/server/info"))
            .await
            .expect_err("hanging exchange must time out");

        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
        match err {
            MelonlyError::Network { message, .. } => {
                assert_eq!(message, "request timeout after 1000ms")
            }
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_retries_means_a_single_attempt() {
        let (client, transport) = client(0, Vec::new());

        let err = client
            .execute::<JsonValue>(ApiRequest::get("/server/info"))
            .await
            .expect_err("scripted 500 must fail");

        assert_eq!(err.status(), Some(500));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn sends_merged_headers_and_json_body() {
        let transport = ScriptedTransport::new(vec![Ok(json_response(200, json!({})))]);
        let client = MelonlyClient::with_transport(
            TOKEN,
            options(1)
                .with_header("X-Team", "configured")
                .with_header("User-Agent", "custom-agent"),
            transport.clone(),
        )
        .expect("client must build");

        let _: JsonValue = client
            .execute(
                ApiRequest::post("server/logs")
                    .with_body(json!({"text": "hello"}))
                    .with_header("x-team", "per-request"),
            )
            .await
            .expect("request must succeed");

        let sent = transport.last_request();
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.url, "https://api.example.com/api/v1/server/logs");
        assert_eq!(sent.headers[header::AUTHORIZATION], format!("Bearer {TOKEN}"));
        assert_eq!(sent.headers[header::ACCEPT], "application/json");
        assert_eq!(sent.headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(sent.headers[header::USER_AGENT], "custom-agent");
        assert_eq!(sent.headers["x-team"], "per-request");
        let body: JsonValue =
            serde_json::from_slice(sent.body.as_deref().expect("body must be sent")).unwrap();
        assert_eq!(body, json!({"text": "hello"}));
    }

    #[tokio::test]
    async fn configured_authorization_never_replaces_the_token() {
        let transport = ScriptedTransport::new(vec![
            Ok(json_response(200, json!({}))),
            Ok(json_response(200, json!({}))),
        ]);
        let client = MelonlyClient::with_transport(
            TOKEN,
            options(1).with_header("Authorization", "Bearer configured-other"),
            transport.clone(),
        )
        .expect("client must build");

        let _: JsonValue = client
            .execute(ApiRequest::get("/server/info"))
            .await
            .expect("request must succeed");
        let sent = transport.last_request();
        assert_eq!(sent.headers[header::AUTHORIZATION], format!("Bearer {TOKEN}"));
        assert_eq!(sent.headers.get_all(header::AUTHORIZATION).iter().count(), 1);

        let _: JsonValue = client
            .execute(
                ApiRequest::get("/server/info").with_header("Authorization", "Bearer per-request"),
            )
            .await
            .expect("request must succeed");
        let sent = transport.last_request();
        assert_eq!(sent.headers[header::AUTHORIZATION], "Bearer per-request");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_a_call_abandons_pending_backoff() {
        let script = (0..5)
            .map(|_| Ok(json_response(503, json!({"error": "unavailable"}))))
            .collect();
        let (client, transport) = client(5, script);

        // The first backoff sleep lasts at least a second, so the call is
        // dropped while waiting for attempt 2.
        let cancelled = tokio::time::timeout(
            Duration::from_millis(500),
            client.execute::<JsonValue>(ApiRequest::get("/server/info")),
        )
        .await
        .is_err();
        assert!(cancelled);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_a_call_abandons_the_inflight_exchange() {
        let transport = HangingTransport::default();
        let client = MelonlyClient::with_transport(
            TOKEN,
            options(3).with_timeout_ms(10_000),
            transport.clone(),
        )
        .expect("client must build");

        let cancelled = tokio::time::timeout(
            Duration::from_millis(500),
            client.execute::<JsonValue>(ApiRequest::get("/server/info")),
        )
        .await
        .is_err();
        assert!(cancelled);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_serializes_pagination() {
        let (client, transport) = client(1, vec![Ok(json_response(200, json!({"data": []})))]);

        let _: JsonValue = client
            .get("/server/applications", Pagination::new(2, 5))
            .await
            .expect("request must succeed");

        let sent = transport.last_request();
        assert!(sent.url.contains("page=2"), "{}", sent.url);
        assert!(sent.url.contains("limit=5"), "{}", sent.url);
        assert!(sent.body.is_none());
    }

    #[tokio::test]
    async fn shape_mismatch_is_an_api_error() {
        #[derive(Debug, Deserialize)]
        struct Strict {
            #[allow(dead_code)]
            id: u64,
        }

        let (client, _transport) = client(1, vec![Ok(json_response(201, json!({"id": "abc"})))]);
        let err = client
            .execute::<Strict>(ApiRequest::get("/server/info"))
            .await
            .expect_err("wrong shape must fail");

        match err {
            MelonlyError::Api { status, body, .. } => {
                assert_eq!(status, 201);
                assert_eq!(body, Some(json!({"id": "abc"})));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn illegal_per_request_header_fails_before_sending() {
        let (client, transport) = client(3, Vec::new());

        let err = client
            .execute::<JsonValue>(ApiRequest::get("/server/info").with_header("bad header", "v"))
            .await
            .expect_err("illegal header must fail");

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn concurrent_calls_are_independent() {
        let (client, transport) = client(
            1,
            vec![
                Ok(json_response(200, json!({"n": 1}))),
                Ok(json_response(404, json!({"error": "missing"}))),
            ],
        );

        let (first, second) = tokio::join!(
            client.execute::<JsonValue>(ApiRequest::get("/server/roles")),
            client.execute::<JsonValue>(ApiRequest::get("/server/shifts")),
        );

        let outcomes = [first.is_ok(), second.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn debug_mode_logs_each_attempt() {
        let transport = ScriptedTransport::new(vec![
            Ok(json_response(502, json!({"error": "bad gateway"}))),
            Ok(json_response(200, json!({}))),
        ]);
        let client = MelonlyClient::with_transport(TOKEN, options(2).with_debug(true), transport)
            .expect("client must build");

        let _: JsonValue = client
            .execute(ApiRequest::get("/server/info"))
            .await
            .expect("second attempt must succeed");

        assert!(logs_contain("sending request"));
        assert!(logs_contain("attempt=2"));
        assert!(logs_contain("retrying request"));
        assert!(logs_contain("delay_ms="));
    }

    #[tokio::test]
    #[traced_test]
    async fn quiet_mode_logs_nothing() {
        let (client, _transport) = client(1, vec![Ok(json_response(200, json!({})))]);

        let _: JsonValue = client
            .execute(ApiRequest::get("/server/info"))
            .await
            .expect("request must succeed");

        assert!(!logs_contain("sending request"));
    }

    #[test]
    fn empty_or_short_token_is_rejected() {
        for token in ["", "   ", "short"] {
            let err = MelonlyClient::new(token).expect_err("token must be rejected");
            match err {
                MelonlyError::Validation { field, .. } => assert_eq!(field, "token"),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_options_are_rejected() {
        let transport = ScriptedTransport::default();
        for options in [
            options(11),
            options(3).with_timeout_ms(0),
            options(3).with_base_url("ftp://files.example.com"),
            options(3).with_base_url("not a url"),
            options(3).with_header("bad header", "value"),
        ] {
            let err = MelonlyClient::with_transport(TOKEN, options, transport.clone())
                .expect_err("options must be rejected");
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn debug_redacts_token() {
        let client = MelonlyClient::new(TOKEN).expect("client must build");
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(TOKEN));
    }

    #[test]
    fn env_config_requires_a_token() {
        let err = config_from_lookup(|_| None).expect_err("token is required");
        assert_eq!(err.kind(), ErrorKind::Validation);

        let (token, options) = config_from_lookup(|name| match name {
            "MELONLY_TOKEN" => Some(TOKEN.to_owned()),
            "MELONLY_BASE_URL" => Some("https://staging.example.com/api/v1".to_owned()),
            _ => None,
        })
        .expect("config must load");
        assert_eq!(token, TOKEN);
        assert_eq!(options.base_url, "https://staging.example.com/api/v1");

        let err = config_from_lookup(|name| match name {
            "MELONLY_TOKEN" => Some(TOKEN.to_owned()),
            "MELONLY_BASE_URL" => Some("http://insecure.example.com".to_owned()),
            _ => None,
        })
        .expect_err("plain http is rejected for env config");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
