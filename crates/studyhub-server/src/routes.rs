//! JSON request/response types and handlers for the study hub API

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use studyhub_core::{Error, ScrapeResult};

use crate::server::AppState;

/// Wrapper turning core errors into HTTP responses.
///
/// Missing session maps to 401, bad input to 400, unknown ids to 404, and
/// upstream provider trouble to 502 so the front end can tell whose fault
/// a failure was.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Authentication => StatusCode::UNAUTHORIZED,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Provider { .. } | Error::Network(_) | Error::UnexpectedResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            Error::Storage(_) | Error::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult = Result<Json<serde_json::Value>, ApiError>;

// ── Request bodies ──

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_content_type() -> String {
    "general".to_string()
}

fn default_num_questions() -> usize {
    studyhub_core::DEFAULT_QUIZ_QUESTIONS
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub api_key: String,
    #[serde(default = "default_provider")]
    pub provider: String,
}

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub content: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

#[derive(Debug, Deserialize)]
pub struct McqRequest {
    pub content: String,
    #[serde(default = "default_num_questions")]
    pub num_questions: usize,
}

#[derive(Debug, Deserialize)]
pub struct FlashcardsRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub duration_minutes: u32,
}

// ── Session ──

pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> ApiResult {
    let provider = req.provider.parse()?;
    let session = state.sessions.login(&req.api_key, provider).await?;
    Ok(Json(json!({
        "success": true,
        "provider": session.provider.to_string(),
    })))
}

pub async fn logout(State(state): State<AppState>) -> ApiResult {
    state.sessions.logout().await?;
    Ok(Json(json!({ "success": true })))
}

// ── Scraping ──

pub async fn scrape(
    State(state): State<AppState>,
    Json(req): Json<ScrapeRequest>,
) -> Json<ScrapeResult> {
    // Failures come back in-band so the page can show what went wrong.
    Json(state.scraper.scrape(&req.url).await)
}

// ── Study assistant ──

pub async fn generate_summary(
    State(state): State<AppState>,
    Json(req): Json<SummaryRequest>,
) -> ApiResult {
    let summary = state
        .assistant
        .summarize(&req.content, &req.content_type)
        .await?;
    Ok(Json(json!({ "summary": summary })))
}

pub async fn generate_mcq(State(state): State<AppState>, Json(req): Json<McqRequest>) -> ApiResult {
    let mcq = state.assistant.quiz(&req.content, req.num_questions).await?;
    Ok(Json(json!({ "mcq": mcq })))
}

pub async fn generate_flashcards(
    State(state): State<AppState>,
    Json(req): Json<FlashcardsRequest>,
) -> ApiResult {
    let flashcards = state.assistant.flashcards(&req.content).await?;
    Ok(Json(json!({ "flashcards": flashcards })))
}

pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> ApiResult {
    let response = state.assistant.chat(&req.message).await?;
    state.store.append_chat(&req.message, &response).await;
    state.persist().await?;
    Ok(Json(json!({ "response": response })))
}

// ── Notes ──

pub async fn add_note(State(state): State<AppState>, Json(req): Json<NoteRequest>) -> ApiResult {
    let note = state.store.add_note(&req.title, &req.content, req.tags).await?;
    state.persist().await?;
    Ok(Json(json!({ "note": note })))
}

pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NoteRequest>,
) -> ApiResult {
    let note = state
        .store
        .update_note(&id, &req.title, &req.content, req.tags)
        .await?;
    state.persist().await?;
    Ok(Json(json!({ "success": true, "note": note })))
}

pub async fn delete_note(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    state.store.delete_note(&id).await;
    state.persist().await?;
    Ok(Json(json!({ "success": true })))
}

// ── Events ──

pub async fn add_event(State(state): State<AppState>, Json(req): Json<EventRequest>) -> ApiResult {
    let event = state
        .store
        .add_event(&req.title, &req.description, &req.date, req.duration_minutes)
        .await?;
    state.persist().await?;
    Ok(Json(json!({ "event": event })))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EventRequest>,
) -> ApiResult {
    let event = state
        .store
        .update_event(&id, &req.title, &req.description, &req.date, req.duration_minutes)
        .await?;
    state.persist().await?;
    Ok(Json(json!({ "success": true, "event": event })))
}

pub async fn delete_event(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    state.store.delete_event(&id).await;
    state.persist().await?;
    Ok(Json(json!({ "success": true })))
}

// ── Data export ──

pub async fn get_data(State(state): State<AppState>) -> ApiResult {
    Ok(Json(json!({
        "notes": state.store.notes().await,
        "events": state.store.events().await,
        "chat_history": state.store.chat_history().await,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyhub_core::GatewayConfig;

    fn test_state(dir: &std::path::Path) -> AppState {
        AppState::new(GatewayConfig::default(), dir.to_path_buf())
    }

    #[tokio::test]
    async fn test_login_sets_session() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let body = login(
            State(state.clone()),
            Json(LoginRequest {
                api_key: "AIza-test".to_string(),
                provider: "gemini".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(body.0["success"], true);
        assert_eq!(body.0["provider"], "gemini");
        assert!(state.sessions.current().await.is_some());
    }

    #[tokio::test]
    async fn test_login_unknown_provider_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let err = login(
            State(state),
            Json(LoginRequest {
                api_key: "key".to_string(),
                provider: "claude".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_summary_without_login_is_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let err = generate_summary(
            State(state),
            Json(SummaryRequest {
                content: "Mitosis is how cells divide.".to_string(),
                content_type: "general".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_empty_content_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        state
            .sessions
            .login("AIza-test", "gemini".parse().unwrap())
            .await
            .unwrap();

        let err = generate_mcq(
            State(state),
            Json(McqRequest {
                content: "  ".to_string(),
                num_questions: 5,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_note_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let body = add_note(
            State(state.clone()),
            Json(NoteRequest {
                title: "Mitosis".to_string(),
                content: "cells divide".to_string(),
                tags: vec!["bio".to_string()],
            }),
        )
        .await
        .unwrap();
        let id = body.0["note"]["id"].as_str().unwrap().to_string();

        let body = update_note(
            State(state.clone()),
            Path(id.clone()),
            Json(NoteRequest {
                title: "Mitosis II".to_string(),
                content: "cells divide twice".to_string(),
                tags: vec![],
            }),
        )
        .await
        .unwrap();
        assert_eq!(body.0["note"]["title"], "Mitosis II");

        delete_note(State(state.clone()), Path(id)).await.unwrap();
        let data = get_data(State(state)).await.unwrap();
        assert_eq!(data.0["notes"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_event_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let err = update_event(
            State(state),
            Path("missing".to_string()),
            Json(EventRequest {
                title: "Review".to_string(),
                description: String::new(),
                date: "2026-09-01".to_string(),
                duration_minutes: 30,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_missing_note_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        delete_note(State(state), Path("missing".to_string()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_notes_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let state = test_state(dir.path());
            add_note(
                State(state),
                Json(NoteRequest {
                    title: "Osmosis".to_string(),
                    content: String::new(),
                    tags: vec![],
                }),
            )
            .await
            .unwrap();
        }

        let state = test_state(dir.path());
        let data = get_data(State(state)).await.unwrap();
        assert_eq!(data.0["notes"][0]["title"], "Osmosis");
    }
}
