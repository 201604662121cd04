use crate::error::BackendError;
use crate::models::ChatMessage;
use async_trait::async_trait;

/// Embedding capability: fixed-dimensional vectors for a batch of texts.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier, for logging and error reporting.
    fn model(&self) -> &str;

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError>;
}

/// Chat-completion capability. Implementations are interchangeable; which
/// one a session uses is a configuration choice made at startup.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, BackendError>;
}
