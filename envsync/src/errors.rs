use std::borrow::Cow;

use thiserror::Error;

/// Errors produced by the console API and the sync pipeline built on it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The console rejected a request and returned an error payload.
    #[error("{message}")]
    Console { status: u16, message: String },

    /// The HTTP transport failed before a console response was available.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The console answered with a body the client could not interpret.
    #[error("unexpected console response: {message}")]
    UnexpectedResponse { message: String },

    /// Login succeeded at the HTTP level but no auth token was issued.
    #[error("console login did not return an auth token")]
    MissingAuthToken,

    /// Catch-all for failures raised outside the transport layer.
    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

impl ApiError {
    /// Build an `Other` error from a static or owned message.
    pub fn other(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Convenience alias for fallible console operations.
pub type ApiResult<T> = Result<T, ApiError>;
