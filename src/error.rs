use thiserror::Error;

#[derive(Error, Debug)]
pub enum RefgenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid config file: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Invalid exclude pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to import {module}: {reason}")]
    Import { module: String, reason: String },

    #[error("Couldn't import {module}.{symbol}")]
    Resolution { module: String, symbol: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl RefgenError {
    pub fn import(module: impl Into<String>, reason: impl Into<String>) -> Self {
        RefgenError::Import {
            module: module.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RefgenError>;
