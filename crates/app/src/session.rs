use pdf_chat_core::{
    build_conversation, BackendError, ChatBackend, ChunkingConfig, ConversationEngine,
    ConversationTurn, DocumentFingerprint, Embedder, IngestError, UploadedDocument,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::info;

/// The one mutable owner of the current conversation engine.
pub struct Session {
    engine: Option<ConversationEngine>,
}

impl Session {
    fn new() -> Self {
        Self { engine: None }
    }

    /// Installs a freshly built engine, discarding the previous one and its
    /// history entirely.
    fn replace_engine(&mut self, engine: ConversationEngine) {
        self.engine = Some(engine);
    }
}

pub struct UploadSummary {
    pub conversation_id: String,
    pub documents: Vec<DocumentFingerprint>,
    pub chunk_count: usize,
}

pub enum AskOutcome {
    /// No successful upload has happened yet; `ask` was not invoked.
    NoDocuments,
    Answered(String),
}

/// Shared handler state. The session sits behind a mutex so upload and ask
/// events run to completion one at a time.
#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<Session>>,
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatBackend>,
    chunking: ChunkingConfig,
    top_k: usize,
}

impl AppState {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        chat: Arc<dyn ChatBackend>,
        chunking: ChunkingConfig,
        top_k: usize,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            embedder,
            chat,
            chunking,
            top_k,
        }
    }

    /// Handles the upload event: run the pipeline and swap in the new
    /// engine. On any error the previous engine is left untouched.
    pub async fn upload(
        &self,
        documents: Vec<UploadedDocument>,
    ) -> Result<UploadSummary, IngestError> {
        let mut session = self.session.lock().await;
        let start = Instant::now();

        let outcome = build_conversation(
            &documents,
            self.chunking,
            Arc::clone(&self.embedder),
            Arc::clone(&self.chat),
            self.top_k,
        )
        .await?;

        for document in &outcome.documents {
            info!(
                filename = %document.filename,
                checksum = %document.checksum,
                "document ingested"
            );
        }
        info!(
            conversation_id = %outcome.engine.id(),
            documents = outcome.documents.len(),
            chunks = outcome.chunk_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "upload indexed"
        );

        let summary = UploadSummary {
            conversation_id: outcome.engine.id().to_string(),
            documents: outcome.documents,
            chunk_count: outcome.chunk_count,
        };
        session.replace_engine(outcome.engine);

        Ok(summary)
    }

    /// Handles the ask event. Asking before any successful upload is not an
    /// error; it reports back without touching the chat backend.
    pub async fn ask(&self, question: &str) -> Result<AskOutcome, BackendError> {
        let mut session = self.session.lock().await;
        let Some(engine) = session.engine.as_mut() else {
            return Ok(AskOutcome::NoDocuments);
        };

        let start = Instant::now();
        let answer = engine.ask(question).await?;
        info!(
            conversation_id = %engine.id(),
            turns = engine.history().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "question answered"
        );

        Ok(AskOutcome::Answered(answer))
    }

    pub async fn history(&self) -> (Option<String>, Vec<ConversationTurn>) {
        let session = self.session.lock().await;
        match &session.engine {
            Some(engine) => (
                Some(engine.id().to_string()),
                engine.history().to_vec(),
            ),
            None => (None, Vec::new()),
        }
    }
}
