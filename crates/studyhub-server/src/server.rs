//! Study hub REST server — Axum-based JSON API

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use studyhub_core::{Gateway, GatewayConfig, Scraper, SessionStore, StudyAssistant, StudyStore};

use crate::routes;

/// Shared state for all request handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub assistant: Arc<StudyAssistant>,
    pub scraper: Arc<Scraper>,
    pub store: Arc<StudyStore>,
    pub data_dir: PathBuf,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: GatewayConfig, data_dir: PathBuf) -> Self {
        let sessions = Arc::new(SessionStore::open(&data_dir));
        let gateway = Arc::new(Gateway::new(sessions.clone(), config));
        Self {
            sessions,
            assistant: Arc::new(StudyAssistant::new(gateway)),
            scraper: Arc::new(Scraper::new()),
            store: Arc::new(StudyStore::load(&data_dir)),
            data_dir,
            start_time: std::time::Instant::now(),
        }
    }

    /// Snapshot the notes/events/chat store to disk after a mutation.
    pub async fn persist(&self) -> studyhub_core::Result<()> {
        self.store.save(&self.data_dir).await
    }
}

/// The study hub server
pub struct StudyServer {
    state: AppState,
    bind: SocketAddr,
}

impl StudyServer {
    /// Create a new server
    pub fn new(bind: SocketAddr, config: GatewayConfig, data_dir: PathBuf) -> Self {
        Self {
            state: AppState::new(config, data_dir),
            bind,
        }
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        Self::router_with_state(self.state.clone())
    }

    pub fn router_with_state(state: AppState) -> Router {
        Router::new()
            .route("/login", post(routes::login))
            .route("/logout", post(routes::logout))
            .route("/scrape", post(routes::scrape))
            .route("/generate_summary", post(routes::generate_summary))
            .route("/generate_mcq", post(routes::generate_mcq))
            .route("/generate_flashcards", post(routes::generate_flashcards))
            .route("/chat", post(routes::chat))
            .route("/add_note", post(routes::add_note))
            .route("/update_note/{id}", put(routes::update_note))
            .route("/delete_note/{id}", delete(routes::delete_note))
            .route("/add_event", post(routes::add_event))
            .route("/update_event/{id}", put(routes::update_event))
            .route("/delete_event/{id}", delete(routes::delete_event))
            .route("/get_data", get(routes::get_data))
            .route("/api/status", get(status_handler))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Start the server (blocks until shutdown)
    pub async fn run(self) -> anyhow::Result<()> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.bind).await?;
        info!("Study hub listening on {}", self.bind);

        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Start the server in the background, returning a handle
    pub fn spawn(self) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}

// ── HTTP Handlers ──

async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let provider = state
        .sessions
        .current()
        .await
        .map(|s| s.provider.to_string());
    let uptime = state.start_time.elapsed().as_secs();

    axum::Json(serde_json::json!({
        "status": "ok",
        "logged_in": provider.is_some(),
        "provider": provider,
        "uptime_secs": uptime,
    }))
}
