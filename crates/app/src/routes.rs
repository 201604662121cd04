use crate::session::{AppState, AskOutcome};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use pdf_chat_core::{ConversationTurn, DocumentFingerprint, IngestError, UploadedDocument};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/ask", post(ask))
        .route("/history", get(history))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn index_page() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: String) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse { error: message }),
    )
}

#[derive(Serialize)]
struct UploadResponse {
    conversation_id: String,
    documents: Vec<DocumentFingerprint>,
    chunks: usize,
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut documents = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| bad_request(format!("failed to read multipart field: {error}")))?
    {
        let Some(filename) = field.file_name().map(|name| name.to_string()) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|error| bad_request(format!("failed to read {filename}: {error}")))?;
        documents.push(UploadedDocument::new(filename, bytes.to_vec()));
    }

    if documents.is_empty() {
        return Err(bad_request("no files in upload".to_string()));
    }

    let summary = state.upload(documents).await.map_err(upload_error)?;

    Ok(Json(UploadResponse {
        conversation_id: summary.conversation_id,
        documents: summary.documents,
        chunks: summary.chunk_count,
    }))
}

fn upload_error(error: IngestError) -> ApiError {
    let status = match &error {
        IngestError::PdfParse(_) | IngestError::EmptyUpload(_) => StatusCode::UNPROCESSABLE_ENTITY,
        IngestError::Backend(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: Option<String>,
    notice: Option<String>,
}

async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(bad_request("question is empty".to_string()));
    }

    match state.ask(question).await {
        Ok(AskOutcome::Answered(answer)) => Ok(Json(AskResponse {
            answer: Some(answer),
            notice: None,
        })),
        Ok(AskOutcome::NoDocuments) => Ok(Json(AskResponse {
            answer: None,
            notice: Some("No documents uploaded yet. Add PDFs in the sidebar first.".to_string()),
        })),
        Err(error) => Err((
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: error.to_string(),
            }),
        )),
    }
}

#[derive(Serialize)]
struct HistoryResponse {
    conversation_id: Option<String>,
    turns: Vec<ConversationTurn>,
}

async fn history(State(state): State<AppState>) -> Json<HistoryResponse> {
    let (conversation_id, turns) = state.history().await;
    Json(HistoryResponse {
        conversation_id,
        turns,
    })
}
