use thiserror::Error;

use crate::config::API_BASE_ENV;

/// Failures the payment-rate handler can hit.
///
/// None of these ever become an HTTP error status: the handler renders their
/// `Display` text into the `error` field of a best-effort payload.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{} not set", API_BASE_ENV)]
    MissingApiBase,

    #[error("upstream error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Upstream(e.to_string())
    }
}
