//! `melonly-http` is an async, typed HTTP client for the Melonly REST API.
//!
//! All calls funnel through [`MelonlyClient::execute`], which:
//! - builds the target URL from the configured base URL, path and query,
//! - attaches the bearer token and JSON headers,
//! - enforces a per-attempt timeout,
//! - retries network failures and 5xx answers with capped exponential backoff,
//! - classifies failures into one [`MelonlyError`] variant.
//!
//! The typed resource methods (for example [`MelonlyClient::get_applications`])
//! are thin wrappers over the endpoint table in [`endpoints`].

mod client;
mod error;
mod options;
mod request;
mod resources;
mod response;

pub mod endpoints;
pub mod retry;
pub mod transport;
pub mod types;
pub mod validation;

pub use client::MelonlyClient;
pub use error::{ErrorKind, MelonlyError};
pub use options::{ClientOptions, DEFAULT_BASE_URL};
pub use request::{build_url, ApiRequest, Pagination, QueryParams};
pub use response::interpret;
pub use transport::{HttpRequest, RawResponse, ReqwestTransport, Transport};
pub use types::{ErrorBody, Paginated};

pub type Result<T> = std::result::Result<T, MelonlyError>;
