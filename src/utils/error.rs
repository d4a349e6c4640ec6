use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Missing required setting: {name}")]
    MissingSetting { name: String },

    #[error("Watchlist error: {0}")]
    Watchlist(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parse { message: String },

    #[error("Invalid selector: {selector}")]
    Selector { selector: String },

    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

impl AppError {
    /// Errors that abort startup instead of being logged and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::MissingSetting { .. }
                | AppError::Watchlist(_)
                | AppError::Selector { .. }
        )
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
