use crate::error::BackendError;
use crate::models::ChatMessage;
use crate::traits::{ChatBackend, Embedder};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_OLLAMA_CHAT_MODEL: &str = "llama3.2";

fn validated_base(base_url: &str) -> Result<String, BackendError> {
    let base = Url::parse(base_url)?;
    Ok(base.as_str().trim_end_matches('/').to_string())
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Embeddings from a local Ollama server. Ollama has no batch endpoint, so
/// each text is one request.
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::new(),
            base_url: validated_base(base_url)?,
            model: model.into(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            let response = self
                .client
                .post(&url)
                .json(&EmbedRequest {
                    model: &self.model,
                    prompt: text,
                })
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(BackendError::BackendResponse {
                    backend: "ollama".to_string(),
                    details: response.status().to_string(),
                });
            }

            let parsed: EmbedResponse = response.json().await?;
            embeddings.push(parsed.embedding);
        }

        Ok(embeddings)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Chat completions from a local Ollama server via `/api/chat`.
pub struct OllamaChatBackend {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaChatBackend {
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::new(),
            endpoint: format!("{}/api/chat", validated_base(base_url)?),
            model: model.into(),
        })
    }
}

#[async_trait]
impl ChatBackend for OllamaChatBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, BackendError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest {
                model: &self.model,
                messages,
                stream: false,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::BackendResponse {
                backend: "ollama".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        Ok(parsed.message.content)
    }
}
