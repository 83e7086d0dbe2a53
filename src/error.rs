//! Error types
//!
//! Construction failures are reported to the caller. Request-time failures are
//! converted to HTTP status codes by the handler and never escape as panics.

use hyper::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpaError {
    /// The content root or its fallback document is missing. Only raised while
    /// building a handler.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The root fallback document disappeared after the handler was built.
    #[error("not found: {0}")]
    NotFound(String),
    /// Reading file bytes failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpaError {
    /// HTTP status used when this error ends a request
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, SpaError>;
