use thiserror::Error;

use crate::Domain;

#[derive(Error, Debug)]
pub enum ScribeError {
    #[error("Failed to load base configuration: {0}")]
    FatalLoad(String),

    #[error("{domain} request failed: {message}")]
    Domain { domain: Domain, message: String },

    #[error("Save failed at {stage} stage: {message}")]
    Save { stage: Domain, message: String },

    #[error("Settings have not been loaded yet")]
    NotLoaded,

    #[error("Invalid settings value: {0}")]
    InvalidValue(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl ScribeError {
    pub fn domain(domain: Domain, message: impl ToString) -> Self {
        ScribeError::Domain {
            domain,
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScribeError>;
