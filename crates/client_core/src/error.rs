use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered with status {0}")]
    Status(StatusCode),
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("{unit}: mount element is missing")]
    MissingMount { unit: &'static str },
    #[error("{unit}: mount element is detached")]
    DetachedMount { unit: &'static str },
}
