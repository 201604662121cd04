use crate::error::BackendError;
use crate::index::ChunkIndex;
use crate::models::{ChatMessage, ConversationTurn, ScoredChunk};
use crate::traits::ChatBackend;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_TOP_K: usize = 4;

/// One conversation over one upload: a chunk index, a chat backend, and the
/// running history. Created fresh per upload; the previous engine and its
/// history are discarded wholesale when a new upload completes.
pub struct ConversationEngine {
    id: Uuid,
    index: ChunkIndex,
    chat: Arc<dyn ChatBackend>,
    history: Vec<ConversationTurn>,
    top_k: usize,
}

impl ConversationEngine {
    pub fn new(index: ChunkIndex, chat: Arc<dyn ChatBackend>, top_k: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            index,
            chat,
            history: Vec::new(),
            top_k,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn indexed_chunks(&self) -> usize {
        self.index.len()
    }

    /// Answers one question: retrieve supporting chunks, hand them to the
    /// chat backend together with the running history, record the turn.
    ///
    /// A failed retrieval or completion leaves the history untouched; the
    /// engine stays usable for the next question.
    pub async fn ask(&mut self, question: &str) -> Result<String, BackendError> {
        let support = self.index.search(question, self.top_k).await?;
        let messages = build_messages(&self.history, &support, question);
        let answer = self.chat.complete(&messages).await?;

        self.history.push(ConversationTurn {
            question: question.to_string(),
            answer: answer.clone(),
            asked_at: Utc::now(),
        });

        Ok(answer)
    }
}

fn build_messages(
    history: &[ConversationTurn],
    support: &[ScoredChunk],
    question: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 2);
    messages.push(ChatMessage::system(system_prompt(support)));

    for turn in history {
        messages.push(ChatMessage::user(turn.question.clone()));
        messages.push(ChatMessage::assistant(turn.answer.clone()));
    }

    messages.push(ChatMessage::user(question.to_string()));
    messages
}

fn system_prompt(support: &[ScoredChunk]) -> String {
    if support.is_empty() {
        return "You answer questions about documents the user uploaded. \
                No relevant excerpt was retrieved for this question; say so \
                rather than guessing."
            .to_string();
    }

    let mut prompt = String::from(
        "You answer questions about documents the user uploaded. Base your \
         answer on the excerpts below and say when they do not cover the \
         question.\n\n",
    );
    for (position, chunk) in support.iter().enumerate() {
        prompt.push_str(&format!("[{}] {}\n\n", position + 1, chunk.text));
    }
    prompt
}
