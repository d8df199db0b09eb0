//! Out-of-core integrations: the webhook notifier and the LLM summary job.
//!
//! Nothing here is reachable from the controller. Failures are logged by the
//! callers and never turn into store or UI errors.

pub mod llm;
pub mod summary;
pub mod webhook;

use std::time::Duration;

use crate::store::StoreError;

/// Request timeout for every outbound HTTP call
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest response body kept in an error message
const MAX_ERROR_BODY: usize = 500;

/// Error type for webhook and LLM calls
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response contained no message")]
    EmptyResponse,
    #[error("environment variable {0} is not set")]
    MissingApiKey(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Blocking client shared by the integrations
pub(crate) fn http_client() -> Result<reqwest::blocking::Client, IntegrationError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("worklog/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Turn a non-2xx response into [`IntegrationError::Status`], keeping a
/// bounded prefix of the body
pub(crate) fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, IntegrationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(IntegrationError::Status {
        status: status.as_u16(),
        body: truncate_chars(&body, MAX_ERROR_BODY),
    })
}

/// First `max` characters of `text`
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
