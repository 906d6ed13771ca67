use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced by the client core.
///
/// Transport failures and application-level rejections are kept apart so call
/// sites can decide what to show the user; nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request never got a usable response (connect refused, reset, TLS, ...)
    #[error("transport error: {0}")]
    Transport(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// Non-2xx status, or a 2xx body carrying `success: false`
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("no active session")]
    NoSession,

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) | ClientError::Timeout(_) => true,
            ClientError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Message suitable for a transient user-facing notice
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Rejected { message, .. } => message.clone(),
            ClientError::NoSession => "Please log in again".to_string(),
            ClientError::Transport(_) | ClientError::Timeout(_) => {
                "Network error, please try again".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<event_schema::SchemaError> for ClientError {
    fn from(err: event_schema::SchemaError) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Config(format!("invalid url: {err}"))
    }
}
