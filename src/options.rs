use crate::{
    validation::{validate_retry_count, validate_timeout, validate_url},
    Result,
};

/// API root used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://pubapitestingalphayes.melonly.xyz/api/v1";

/// Configures the target API, timeout, retry and header behavior.
///
/// Options are fixed once a client is built; build a new client to change
/// them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// API root every endpoint path is joined onto.
    pub base_url: String,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Total number of attempts per call, including the first.
    ///
    /// `0` behaves like `1`: a single attempt without retries.
    pub max_retries: u32,
    /// Emits a `tracing` event for each attempt and scheduled retry.
    pub debug: bool,
    /// Extra headers sent with every request. They override the built-in
    /// defaults and are overridden by per-request headers.
    pub headers: Vec<(String, String)>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_ms: 30_000,
            max_retries: 3,
            debug: false,
            headers: Vec::new(),
        }
    }
}

impl ClientOptions {
    /// Sets the API root; a trailing slash is ignored.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the per-attempt deadline in milliseconds.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the total number of attempts per call.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Enables per-attempt `tracing` debug events.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Checks the base URL, timeout and retry count.
    ///
    /// Header names and values are checked when the client is built.
    pub fn validate(&self) -> Result<()> {
        validate_url(self.base_url.trim(), "base_url")?;
        validate_timeout(self.timeout_ms)?;
        validate_retry_count(self.max_retries)?;
        Ok(())
    }
}
