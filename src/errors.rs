//! Error taxonomy for the translation core.
//!
//! `InferenceError` covers every way a remote deployment call can fail and
//! propagates unmodified from the gateway up through the router.
//! `ServiceError` is what the orchestrating services return; the API layer
//! maps it onto HTTP statuses without leaking deployment detail.
//! A cache miss is not an error: it is internal control flow (`Option`).

use thiserror::Error;

/// Failure of a remote inference call. Fatal for the current request; the
/// router never catches and suppresses it.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The deployment could not be reached or the request did not complete.
    #[error("inference request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The deployment answered with an explicit error payload or a
    /// non-success status.
    #[error("inference deployment returned an error: {0}")]
    Remote(String),

    /// The response parsed but was missing the expected output field.
    #[error("inference response was missing the expected output")]
    MalformedResponse,
}

/// Request-level failure surfaced by the translation and speech services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or incomplete request; names the offending field.
    #[error("missing or invalid field `{field}`")]
    Validation { field: &'static str },

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl ServiceError {
    pub fn validation(field: &'static str) -> Self {
        Self::Validation { field }
    }
}
