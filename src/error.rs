//! Error types for the listing client.

use thiserror::Error;

/// Message shown to users when a request fails on the network or server side
pub const RETRY_MESSAGE: &str =
    "Something went wrong while contacting the server. Please check your connection and try again.";

/// Failures talking to the listing API.
///
/// Network and server failures share one user-facing retry message; the
/// variant itself is kept for diagnostics.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not one of the accepted shapes
    #[error("malformed response: {0}")]
    Malformed(String),

    /// An authenticated call was attempted without a session token
    #[error("authentication required")]
    Unauthorized,

    /// Input rejected locally before sending
    #[error("invalid input: {0}")]
    Validation(String),
}

impl ApiError {
    /// Short label naming the failure class, used in logs
    pub fn cause(&self) -> &'static str {
        match self {
            ApiError::Transport(_) => "transport",
            ApiError::Status { .. } => "status",
            ApiError::Malformed(_) => "malformed",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Validation(_) => "validation",
        }
    }

    /// Text for the view's `error` field. A missing session asks the user to
    /// log in and rejected input echoes the reason.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Please log in to continue.".to_string(),
            ApiError::Validation(reason) => reason.clone(),
            _ => RETRY_MESSAGE.to_string(),
        }
    }
}

/// Invalid configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_failures_share_one_message() {
        let status = ApiError::Status {
            status: 502,
            body: "bad gateway".into(),
        };
        let malformed = ApiError::Malformed("expected array".into());

        assert_eq!(status.user_message(), RETRY_MESSAGE);
        assert_eq!(malformed.user_message(), RETRY_MESSAGE);
        assert_eq!(status.cause(), "status");
        assert_eq!(malformed.cause(), "malformed");
    }

    #[test]
    fn local_failures_explain_themselves() {
        assert_eq!(ApiError::Unauthorized.user_message(), "Please log in to continue.");
        assert_eq!(
            ApiError::Validation("email: Enter a valid email".into()).user_message(),
            "email: Enter a valid email"
        );
        assert!(!RETRY_MESSAGE.contains("properties"));
    }
}
