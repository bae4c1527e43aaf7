//! Error types for the extraction pipeline
//!
//! Both families are recovered locally into a failed [`ExtractionResult`]
//! (see [`Pipeline::extract`]); neither crosses the extractor boundary as
//! an unhandled fault.
//!
//! [`ExtractionResult`]: crate::ExtractionResult
//! [`Pipeline::extract`]: crate::Pipeline::extract

use thiserror::Error;

/// Errors from the content source (HTTP fetch or browser render)
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is missing or has an unsupported scheme
    #[error("invalid URL: must start with http:// or https://")]
    InvalidUrl,

    /// Failed to build the HTTP client
    #[error("failed to create HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// The resource could not be retrieved within the timeout
    #[error("request timed out")]
    Timeout,

    /// Failed to connect to the server
    #[error("server unreachable")]
    Unreachable(#[source] reqwest::Error),

    /// The remote returned a non-success status
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Other request failure
    #[error("request failed: {0}")]
    Request(String),

    /// A required DOM element never appeared within the wait budget
    #[error("render timed out waiting for `{selector}`")]
    RenderTimeout {
        /// Selector that never matched
        selector: String,
    },

    /// Browser driver fault
    #[error("driver error: {0}")]
    Driver(String),
}

impl FetchError {
    /// Map a reqwest error onto the fetch taxonomy
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Unreachable(err)
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

/// Errors from the inference collaborator
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The provider returned something that is not a structured record
    #[error("malformed inference response: {0}")]
    MalformedResponse(String),

    /// The provider did not answer within its own deadline
    #[error("inference request timed out")]
    Timeout,

    /// Provider-side fault (rate limit, transport, refusal)
    #[error("inference provider failed: {0}")]
    Provider(String),
}
