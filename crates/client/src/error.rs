use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Failure of an API call as the caller should handle it.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or a body that could not be read.
    #[error("Unknown error")]
    Unknown(String),
    /// The session is missing or expired, the caller should log in again.
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{message}")]
    Invalid { status: StatusCode, message: String },
    #[error("{message}")]
    Server { status: StatusCode, message: String },
}

impl ClientError {
    /// Builds the error for a non-success response from its status and
    /// the `error` field of the envelope, if one could be read.
    pub(crate) fn from_response(status: StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        if status == StatusCode::UNAUTHORIZED {
            Self::Unauthorized
        } else if status.is_client_error() {
            Self::Invalid { status, message }
        } else if status.is_server_error() {
            Self::Server { status, message }
        } else {
            Self::Unknown(format!("unexpected status {status}"))
        }
    }

    pub fn needs_login(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Text to show the user.
    pub fn message(&self) -> &str {
        match self {
            Self::Unknown(_) => UNKNOWN_ERROR,
            Self::Unauthorized => "Unauthorized",
            Self::Invalid { message, .. } | Self::Server { message, .. } => message,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Self::Invalid { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Unknown(_) => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        Self::Unknown(value.to_string())
    }
}
