use thiserror::Error;

/// Failure surface of the places backend.
///
/// Transport errors, non-2xx statuses, and malformed payloads are all
/// collapsed into `Network`; the cause stays in the message for diagnostics
/// but callers are not expected to distinguish them.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("search radius must be positive, got {0}")]
    InvalidRadius(i32),
    #[error("request to places backend failed: {0}")]
    Network(anyhow::Error),
}

impl FetchError {
    pub fn network(err: impl Into<anyhow::Error>) -> Self {
        Self::Network(err.into())
    }
}

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("image request failed")]
    Transport(#[from] reqwest::Error),
    #[error("image decode failed")]
    Decode(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("speech engine unavailable")]
    Unavailable,
    #[error("speech engine failed to initialize")]
    InitFailed,
}

#[derive(Debug, Error)]
#[error("no handler resolved for '{uri}'")]
pub struct NavigationError {
    pub uri: String,
}

impl NavigationError {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}
