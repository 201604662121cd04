pub mod ollama;
pub mod openai;

pub use ollama::{
    OllamaChatBackend, OllamaEmbedder, DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_CHAT_MODEL,
    DEFAULT_OLLAMA_EMBEDDING_MODEL,
};
pub use openai::{
    OpenAiChatBackend, OpenAiEmbedder, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_CHAT_MODEL,
    DEFAULT_OPENAI_EMBEDDING_MODEL,
};
