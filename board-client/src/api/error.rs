use thiserror::Error;

/// Fallback shown when the server gives no usable error message
pub const GENERIC_SERVER_ERROR: &str = "A server error occurred.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Build the error for a non-success status from its (possibly absent) message
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string());
        match status {
            404 => ApiError::NotFound(message),
            401 | 403 => ApiError::Unauthorized(message),
            400 => ApiError::BadRequest(message),
            _ => ApiError::Api(message),
        }
    }

    /// Text suitable for a transient notification.
    ///
    /// Server-side failures show the server's message; transport and decode
    /// failures show a short description instead of internals.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Api(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Network(e) if e.is_timeout() => "The server took too long to respond.".to_string(),
            ApiError::Network(_) => "Could not reach the server. Check your connection.".to_string(),
            ApiError::Serialization(_) => GENERIC_SERVER_ERROR.to_string(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
