pub mod backends;
pub mod chunking;
pub mod conversation;
pub mod error;
pub mod extractor;
pub mod index;
pub mod ingest;
pub mod models;
pub mod traits;

pub use backends::{
    OllamaChatBackend, OllamaEmbedder, OpenAiChatBackend, OpenAiEmbedder, DEFAULT_OLLAMA_BASE_URL,
    DEFAULT_OLLAMA_CHAT_MODEL, DEFAULT_OLLAMA_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_OPENAI_CHAT_MODEL, DEFAULT_OPENAI_EMBEDDING_MODEL,
};
pub use chunking::{
    split_text, ChunkingConfig, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_SEPARATOR,
};
pub use conversation::{ConversationEngine, DEFAULT_TOP_K};
pub use error::{BackendError, IngestError};
pub use extractor::{extract_text, LopdfExtractor, PdfExtractor};
pub use index::{cosine_similarity, ChunkIndex};
pub use ingest::{build_conversation, fingerprint_document, UploadOutcome};
pub use models::{
    ChatMessage, ChatRole, ConversationTurn, DocumentFingerprint, ScoredChunk, UploadedDocument,
};
pub use traits::{ChatBackend, Embedder};
