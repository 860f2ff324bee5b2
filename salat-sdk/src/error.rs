use std::path::PathBuf;

use salat_stream::StreamError;
use salat_times::CalcError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Configuration error: {0}")]
    Config(#[from] CalcError),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("Calculator has been disposed")]
    Disposed,

    #[error("No Tokio runtime: create the calculator from within a runtime or pass a handle")]
    NoRuntime,

    #[error("Failed to access config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No configuration directory on this platform")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, SdkError>;
