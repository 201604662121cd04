use crate::error::BackendError;
use crate::models::ChatMessage;
use crate::traits::{ChatBackend, Embedder};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_OPENAI_CHAT_MODEL: &str = "gpt-4o-mini";

fn validated_endpoint(base_url: &str, path: &str) -> Result<String, BackendError> {
    let base = Url::parse(base_url)?;
    Ok(format!("{}/{path}", base.as_str().trim_end_matches('/')))
}

fn require_api_key(api_key: &str) -> Result<String, BackendError> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(BackendError::MissingCredentials(
            "openai api key is empty; set OPENAI_API_KEY".to_string(),
        ));
    }
    Ok(api_key.to_string())
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingEntry>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingEntry {
    index: usize,
    embedding: Vec<f32>,
}

/// Embeddings over an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: impl Into<String>,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::new(),
            endpoint: validated_endpoint(base_url, "embeddings")?,
            api_key: require_api_key(api_key)?,
            model: model.into(),
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::BackendResponse {
                backend: "openai".to_string(),
                details: response.status().to_string(),
            });
        }

        let mut parsed: EmbeddingResponse = response.json().await?;
        parsed.data.sort_by_key(|entry| entry.index);

        if parsed.data.len() != texts.len() {
            return Err(BackendError::BackendResponse {
                backend: "openai".to_string(),
                details: format!(
                    "{} embeddings returned for {} inputs",
                    parsed.data.len(),
                    texts.len()
                ),
            });
        }

        Ok(parsed
            .data
            .into_iter()
            .map(|entry| entry.embedding)
            .collect())
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Chat completions over an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChatBackend {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiChatBackend {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: impl Into<String>,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::new(),
            endpoint: validated_endpoint(base_url, "chat/completions")?,
            api_key: require_api_key(api_key)?,
            model: model.into(),
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiChatBackend {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, BackendError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ChatCompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::BackendResponse {
                backend: "openai".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| BackendError::BackendResponse {
                backend: "openai".to_string(),
                details: "chat completion had no choices".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ChatCompletionRequest, ChatCompletionResponse, EmbeddingResponse, OpenAiChatBackend,
        OpenAiEmbedder, DEFAULT_OPENAI_BASE_URL,
    };
    use crate::error::BackendError;
    use crate::models::ChatMessage;

    #[test]
    fn empty_api_key_is_rejected() {
        let result = OpenAiEmbedder::new(DEFAULT_OPENAI_BASE_URL, "  ", "text-embedding-3-small");
        assert!(matches!(result, Err(BackendError::MissingCredentials(_))));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = OpenAiChatBackend::new("not a url", "key", "gpt-4o-mini");
        assert!(matches!(result, Err(BackendError::Url(_))));
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let embedder =
            OpenAiEmbedder::new("https://api.openai.com/v1/", "key", "m").expect("valid config");
        assert_eq!(embedder.endpoint, "https://api.openai.com/v1/embeddings");
    }

    #[test]
    fn chat_request_serializes_roles_and_model() {
        let messages = vec![ChatMessage::system("ctx"), ChatMessage::user("hi")];
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: &messages,
        };

        let json = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn chat_response_first_choice_is_parsed() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"An answer."}}]}"#;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(body).expect("response should parse");
        assert_eq!(parsed.choices[0].message.content, "An answer.");
    }

    #[test]
    fn embedding_response_entries_carry_their_index() {
        let body = r#"{"data":[{"index":1,"embedding":[0.5]},{"index":0,"embedding":[1.0]}]}"#;
        let mut parsed: EmbeddingResponse = serde_json::from_str(body).expect("response should parse");
        parsed.data.sort_by_key(|entry| entry.index);
        assert_eq!(parsed.data[0].embedding, vec![1.0]);
        assert_eq!(parsed.data[1].embedding, vec![0.5]);
    }
}
