use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("unexpected response from {source_name}: {message}")]
    UnexpectedPayload {
        source_name: &'static str,
        message: String,
    },
}

impl Error {
    pub fn unexpected(source_name: &'static str, message: impl Into<String>) -> Self {
        Self::UnexpectedPayload {
            source_name,
            message: message.into(),
        }
    }
}
