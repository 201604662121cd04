mod routes;
mod session;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, ValueEnum};
use pdf_chat_core::{
    ChatBackend, ChunkingConfig, Embedder, OllamaChatBackend, OllamaEmbedder, OpenAiChatBackend,
    OpenAiEmbedder, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_OLLAMA_BASE_URL,
    DEFAULT_OLLAMA_CHAT_MODEL, DEFAULT_OLLAMA_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_OPENAI_CHAT_MODEL, DEFAULT_OPENAI_EMBEDDING_MODEL, DEFAULT_SEPARATOR, DEFAULT_TOP_K,
};
use session::AppState;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-chat", version)]
struct Cli {
    /// Address to bind the web UI on.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the web UI on.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Which chat-completion and embedding provider to use.
    #[arg(long, value_enum, default_value = "open-ai")]
    backend: Backend,

    /// OpenAI-compatible API base URL.
    #[arg(long, default_value = DEFAULT_OPENAI_BASE_URL)]
    openai_base_url: String,

    /// OpenAI API key, read from the environment at startup.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, default_value = "")]
    openai_api_key: String,

    /// Ollama base URL.
    #[arg(long, default_value = DEFAULT_OLLAMA_BASE_URL)]
    ollama_url: String,

    /// Chat model name; defaults to the selected backend's usual model.
    #[arg(long)]
    chat_model: Option<String>,

    /// Embedding model name; defaults to the selected backend's usual model.
    #[arg(long)]
    embedding_model: Option<String>,

    /// Maximum chunk length in characters.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Characters carried over between consecutive chunks.
    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    chunk_overlap: usize,

    /// Number of chunks retrieved per question.
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Maximum accepted upload size in bytes.
    #[arg(long, default_value_t = 32 * 1024 * 1024)]
    max_upload_bytes: usize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    /// Generic chat-completion API (OpenAI-compatible).
    OpenAi,
    /// Locally hosted models through Ollama.
    Ollama,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let chunking = ChunkingConfig::new(DEFAULT_SEPARATOR, cli.chunk_size, cli.chunk_overlap)
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    let (embedder, chat): (Arc<dyn Embedder>, Arc<dyn ChatBackend>) = match cli.backend {
        Backend::OpenAi => {
            let embedding_model = cli
                .embedding_model
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_EMBEDDING_MODEL.to_string());
            let chat_model = cli
                .chat_model
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_CHAT_MODEL.to_string());

            let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::new(
                &cli.openai_base_url,
                &cli.openai_api_key,
                embedding_model,
            )?);
            let chat: Arc<dyn ChatBackend> = Arc::new(OpenAiChatBackend::new(
                &cli.openai_base_url,
                &cli.openai_api_key,
                chat_model,
            )?);
            (embedder, chat)
        }
        Backend::Ollama => {
            let embedding_model = cli
                .embedding_model
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_EMBEDDING_MODEL.to_string());
            let chat_model = cli
                .chat_model
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_CHAT_MODEL.to_string());

            let embedder: Arc<dyn Embedder> =
                Arc::new(OllamaEmbedder::new(&cli.ollama_url, embedding_model)?);
            let chat: Arc<dyn ChatBackend> =
                Arc::new(OllamaChatBackend::new(&cli.ollama_url, chat_model)?);
            (embedder, chat)
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = chat.name(),
        chat_model = chat.model(),
        embedding_model = embedder.model(),
        started_at = %Utc::now().to_rfc3339(),
        "pdf-chat boot"
    );

    let state = AppState::new(embedder, chat, chunking, cli.top_k);
    let router = routes::router(state, cli.max_upload_bytes);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "serving web ui");

    axum::serve(listener, router)
        .await
        .context("server error")?;

    Ok(())
}
