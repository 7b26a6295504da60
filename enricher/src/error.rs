use thiserror::Error;

/// Failure of one TMDB call. None of these are cached, so a later run may retry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("TMDB returned status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(#[source] serde_json::Error),
}
