use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    /// The API answered but reported a failure (e.g. "Movie not found!")
    #[error("{0}")]
    Api(String),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0} API key is not configured")]
    MissingKey(&'static str),
}
