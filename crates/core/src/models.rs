use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One PDF file as received from the upload event. Consumed by the extractor
/// and discarded afterwards.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentFingerprint {
    pub filename: String,
    pub checksum: String,
    pub uploaded_at: DateTime<Utc>,
}

/// One answered question in the running conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

/// A retrieved chunk together with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub text: String,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single message in the wire format both chat backends accept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChatMessage;

    #[test]
    fn chat_roles_serialize_lowercase() {
        let message = ChatMessage::assistant("hi");
        let json = serde_json::to_value(&message).expect("message should serialize");
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hi");
    }
}
