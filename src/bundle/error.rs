//! Bundle errors

use thiserror::Error;

use crate::fs::FsError;

/// Errors from loading, configuring and bundling modules.
#[derive(Error, Debug)]
pub enum BundleError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid filter: {0}")]
    Filter(#[from] regex_lite::Error),

    #[error("invalid directory pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("cannot list directory: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("config error: {message}")]
    Config { message: String },
}

impl BundleError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        BundleError::Config {
            message: message.into(),
        }
    }
}
