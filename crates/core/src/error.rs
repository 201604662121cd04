use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("nothing to index: {0}")]
    EmptyUpload(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("missing credentials: {0}")]
    MissingCredentials(String),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
