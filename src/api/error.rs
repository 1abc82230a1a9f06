use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Shown to the user when the request never produced a usable answer.
pub const GENERIC_FAILURE: &str = "Request failed";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request did not reach the server, or the connection broke.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with `success: false` or an error status.
    #[error("server error ({status}): {message}")]
    Server {
        status: u16,
        message: String,
        field_errors: Vec<FieldError>,
    },

    /// The response body could not be parsed.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn server(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Server {
            status: status.as_u16(),
            message: message.into(),
            field_errors: vec![],
        }
    }

    /// Text for the user-facing notification: the server message verbatim,
    /// a generic line for everything else.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Transport(_) | ApiError::Decode(_) => GENERIC_FAILURE.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Server { status: 401, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Checks done locally before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please add a title before saving")]
    EmptyTitle,
    #[error("Please add some content before publishing")]
    EmptyContent,
    #[error("Please select a category before publishing")]
    MissingCategory,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },
    #[error("Please type \"{expected}\" to confirm")]
    ConfirmationMismatch { expected: &'static str },
    #[error("Please provide a reason for rejection")]
    EmptyRejectionReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let err = ApiError::server(StatusCode::BAD_REQUEST, "Title already taken");
        assert_eq!(err.user_message(), "Title already taken");
        assert_eq!(ApiError::Transport("connection refused".to_string()).user_message(), GENERIC_FAILURE);
        assert_eq!(ApiError::Decode("eof".to_string()).user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_unauthorized() {
        assert!(ApiError::server(StatusCode::UNAUTHORIZED, "Not authorized").is_unauthorized());
        assert!(!ApiError::server(StatusCode::FORBIDDEN, "Forbidden").is_unauthorized());
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::PasswordTooShort { min: 8 }.to_string(), "Password must be at least 8 characters long");
        assert_eq!(
            ValidationError::ConfirmationMismatch { expected: "DELETE" }.to_string(),
            "Please type \"DELETE\" to confirm"
        );
    }
}
