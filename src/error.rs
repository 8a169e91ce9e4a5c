use thiserror::Error;

/// Errors produced while scraping, exporting or analysing reviews
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (DNS, connect, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with something other than 200
    #[error("unexpected status code {0}")]
    Status(u16),

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid CSS selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("column '{column}' not found. Available columns: {available}")]
    MissingColumn { column: String, available: String },

    #[error("completion API error: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),

    #[error("completion API returned no content")]
    EmptyCompletion,
}

pub type Result<T> = std::result::Result<T, Error>;
