use thiserror::Error;

/// Main error type for the platform game
#[derive(Error, Debug)]
pub enum GameError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Decision oracle errors
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for GameError
pub type Result<T> = std::result::Result<T, GameError>;

/// Specific error types for the decision oracle
#[derive(Error, Debug, Clone)]
pub enum OracleError {
    #[error("Oracle API key not configured")]
    NotConfigured,

    #[error("Oracle API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Oracle transport error: {0}")]
    Transport(String),

    #[error("Oracle returned no choices")]
    EmptyReply,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

impl OracleError {
    /// Whether another attempt could succeed: transport failures, empty
    /// replies, rate limits and server errors. Other 4xx responses are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            OracleError::Transport(_) | OracleError::EmptyReply => true,
            OracleError::Api { status, .. } => *status == 429 || *status >= 500,
            OracleError::NotConfigured | OracleError::MaxRetriesExceeded { .. } => false,
        }
    }
}

impl GameError {
    /// Whether a retry loop should try again after this error
    pub fn is_retryable(&self) -> bool {
        match self {
            GameError::Oracle(e) => e.is_retryable(),
            GameError::Http(_) => true,
            _ => false,
        }
    }
}
