use crate::chunking::{split_text, ChunkingConfig};
use crate::conversation::ConversationEngine;
use crate::error::IngestError;
use crate::extractor::extract_text;
use crate::index::ChunkIndex;
use crate::models::{DocumentFingerprint, UploadedDocument};
use crate::traits::{ChatBackend, Embedder};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;

pub struct UploadOutcome {
    pub engine: ConversationEngine,
    pub documents: Vec<DocumentFingerprint>,
    pub chunk_count: usize,
}

pub fn fingerprint_document(document: &UploadedDocument) -> DocumentFingerprint {
    let mut hasher = Sha256::new();
    hasher.update(&document.bytes);

    DocumentFingerprint {
        filename: document.filename.clone(),
        checksum: format!("{:x}", hasher.finalize()),
        uploaded_at: Utc::now(),
    }
}

/// Runs the whole upload pipeline: extract, chunk, embed, index, then wrap
/// the index in a conversation engine with a fresh, empty history.
///
/// Any failure aborts the upload and the caller keeps whatever engine it
/// had before. An upload whose documents contain no extractable text fails
/// with `EmptyUpload` rather than producing an index that can never hit.
pub async fn build_conversation(
    documents: &[UploadedDocument],
    chunking: ChunkingConfig,
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatBackend>,
    top_k: usize,
) -> Result<UploadOutcome, IngestError> {
    let fingerprints: Vec<DocumentFingerprint> =
        documents.iter().map(fingerprint_document).collect();

    let raw_text = extract_text(documents)?;
    let chunks = split_text(&raw_text, &chunking);

    if chunks.is_empty() {
        return Err(IngestError::EmptyUpload(
            "uploaded documents contain no extractable text".to_string(),
        ));
    }

    let chunk_count = chunks.len();
    let index = ChunkIndex::from_texts(chunks, embedder).await?;
    let engine = ConversationEngine::new(index, chat, top_k);

    Ok(UploadOutcome {
        engine,
        documents: fingerprints,
        chunk_count,
    })
}

#[cfg(test)]
mod tests {
    use super::{build_conversation, fingerprint_document};
    use crate::chunking::ChunkingConfig;
    use crate::conversation::DEFAULT_TOP_K;
    use crate::error::{BackendError, IngestError};
    use crate::extractor::minimal_pdf_with_phrase;
    use crate::models::{ChatMessage, UploadedDocument};
    use crate::traits::{ChatBackend, Embedder};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct UnitEmbedder;

    #[async_trait]
    impl Embedder for UnitEmbedder {
        fn model(&self) -> &str {
            "unit-test"
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    struct EchoChat;

    #[async_trait]
    impl ChatBackend for EchoChat {
        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-model"
        }

        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, BackendError> {
            Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
        }
    }

    #[test]
    fn fingerprints_are_reproducible_and_content_addressed() {
        let document = UploadedDocument::new("a.pdf", b"abc".to_vec());
        let first = fingerprint_document(&document);
        let second = fingerprint_document(&document);
        assert_eq!(first.checksum, second.checksum);
        assert_eq!(first.filename, "a.pdf");

        let other = UploadedDocument::new("a.pdf", b"abd".to_vec());
        assert_ne!(fingerprint_document(&other).checksum, first.checksum);
    }

    #[tokio::test]
    async fn one_page_upload_round_trips_into_a_single_chunk_index() {
        let documents = vec![UploadedDocument::new(
            "alpha.pdf",
            minimal_pdf_with_phrase("Alpha beta gamma."),
        )];

        let outcome = build_conversation(
            &documents,
            ChunkingConfig::default(),
            Arc::new(UnitEmbedder),
            Arc::new(EchoChat),
            DEFAULT_TOP_K,
        )
        .await
        .expect("upload should succeed");

        assert_eq!(outcome.chunk_count, 1);
        assert_eq!(outcome.engine.indexed_chunks(), 1);
        assert!(outcome.engine.history().is_empty());
        assert_eq!(outcome.documents.len(), 1);
        assert_eq!(outcome.documents[0].filename, "alpha.pdf");
    }

    #[tokio::test]
    async fn upload_without_extractable_text_is_rejected() {
        let result = build_conversation(
            &[],
            ChunkingConfig::default(),
            Arc::new(UnitEmbedder),
            Arc::new(EchoChat),
            DEFAULT_TOP_K,
        )
        .await;

        assert!(matches!(result, Err(IngestError::EmptyUpload(_))));
    }

    #[tokio::test]
    async fn unparsable_upload_is_rejected_before_indexing() {
        let documents = vec![UploadedDocument::new("bad.pdf", b"%PDF-1.4\n%broken".to_vec())];

        let result = build_conversation(
            &documents,
            ChunkingConfig::default(),
            Arc::new(UnitEmbedder),
            Arc::new(EchoChat),
            DEFAULT_TOP_K,
        )
        .await;

        assert!(matches!(result, Err(IngestError::PdfParse(_))));
    }
}
