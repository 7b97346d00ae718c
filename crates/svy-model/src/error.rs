use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema ({origin}): {source}")]
    Toml {
        origin: String,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("unknown variable: {name}")]
    UnknownVariable { name: String },

    #[error("unknown battery: {key}")]
    UnknownBattery { key: String },

    #[error("battery {key} has no item column {column}")]
    UnknownBatteryItem { key: String, column: String },
}

impl ModelError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
