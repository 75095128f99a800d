//! HTTP surface of the dashboard.
//!
//! The loaded [`Dataset`] is shared read-only by every request. Sessions
//! hold a filter state and a [`Binder`](crate::binder::Binder) each and live
//! in a table behind a tokio `RwLock` until deleted. Sessions left unused for
//! longer than the idle timeout are dropped whenever a new one is created.
//!
//! Every failure, including a body or query string that does not decode,
//! is answered with a JSON `{"error": ...}` body.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use crate::binder::{ChartUpdate, Session};
use crate::charts::{self, ChartId, ChartOutput};
use crate::config::Config;
use crate::dashboard::{self, DashboardView, FilterOptions};
use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::filter::{FilterChange, FilterOverrides, FilterState};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// A session and when it was last touched.
#[derive(Debug)]
struct LiveSession {
    session: Session,
    last_used: Instant,
}

impl LiveSession {
    fn new(session: Session) -> Self {
        Self {
            session,
            last_used: Instant::now(),
        }
    }
}

/// State shared by all handlers.
#[derive(Debug)]
pub struct AppState {
    dataset: Arc<Dataset>,
    sessions: RwLock<HashMap<u64, LiveSession>>,
    next_session: AtomicU64,
    idle_timeout: Duration,
}

impl AppState {
    /// Wrap a loaded dataset.
    #[must_use]
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            sessions: RwLock::new(HashMap::new()),
            next_session: AtomicU64::new(1),
            idle_timeout: Config::default().session_idle_timeout(),
        }
    }

    /// Drop sessions that have been unused for longer than `timeout`.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// The shared dataset.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn filters_for(&self, overrides: &FilterOverrides) -> Result<FilterState> {
        let filters = overrides.apply_to(&self.dataset.default_filters())?;
        filters.check_within(self.dataset.window())?;
        Ok(filters)
    }

    fn evict_idle(&self, sessions: &mut HashMap<u64, LiveSession>) {
        let before = sessions.len();
        sessions.retain(|_, live| live.last_used.elapsed() < self.idle_timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Dropped {evicted} idle session(s)");
        }
    }
}

/// Reply to `POST /api/sessions`.
#[derive(Debug, Serialize)]
pub struct SessionCreated {
    /// Session id for later calls.
    pub id: u64,
    /// Initial filters.
    pub filters: FilterState,
    /// Every chart.
    pub charts: Vec<ChartUpdate>,
}

/// Reply to `POST /api/sessions/{id}/changes`.
#[derive(Debug, Serialize)]
pub struct SessionUpdate {
    /// Session id.
    pub id: u64,
    /// Filters after the batch.
    pub filters: FilterState,
    /// Only the charts that were recomputed.
    pub updates: Vec<ChartUpdate>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        if status.is_server_error() {
            warn!("Request failed: {self}");
        } else {
            debug!("Request rejected: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

macro_rules! bad_request_from {
    ($($rejection:ty),+ $(,)?) => {
        $(
            impl From<$rejection> for Error {
                fn from(rejection: $rejection) -> Self {
                    Self::BadRequest(rejection.body_text())
                }
            }
        )+
    };
}

bad_request_from!(JsonRejection, QueryRejection, PathRejection);

/// Build the router.
pub fn router(state: Arc<AppState>, assets_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/options", get(options))
        .route("/api/dashboard", get(dashboard_view))
        .route("/api/charts/{chart}", get(chart))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", delete(delete_session))
        .route("/api/sessions/{id}/changes", post(apply_changes))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .with_state(state)
}

/// Bind to the configured address and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address is invalid or cannot be bound.
pub async fn serve(config: &Config, dataset: Dataset) -> Result<()> {
    let addr = config.socket_addr()?;
    let state = Arc::new(
        AppState::new(Arc::new(dataset)).with_idle_timeout(config.session_idle_timeout()),
    );
    let app = router(state, &config.data.assets_path());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let dataset = state.dataset();
    Json(json!({
        "status": "ok",
        "accidents": dataset.accidents().len(),
        "impacts": dataset.impacts().len(),
        "cleaned": dataset.cleaned().len(),
        "sessions": state.session_count().await,
    }))
}

async fn options(State(state): State<Arc<AppState>>) -> Json<FilterOptions> {
    Json(FilterOptions::for_dataset(state.dataset()))
}

async fn dashboard_view(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<FilterOverrides>, QueryRejection>,
) -> Result<Json<DashboardView>> {
    let Query(overrides) = query?;
    let filters = state.filters_for(&overrides)?;
    Ok(Json(dashboard::render_all(state.dataset(), &filters)))
}

async fn chart(
    State(state): State<Arc<AppState>>,
    UrlPath(chart): UrlPath<String>,
    query: std::result::Result<Query<FilterOverrides>, QueryRejection>,
) -> Result<Json<ChartOutput>> {
    let chart: ChartId = chart.parse()?;
    let Query(overrides) = query?;
    let filters = state.filters_for(&overrides)?;
    Ok(Json(charts::render(chart, state.dataset(), &filters)))
}

async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionCreated>) {
    let id = state.next_session.fetch_add(1, Ordering::Relaxed);
    let session = Session::new(state.dataset());
    let reply = SessionCreated {
        id,
        filters: session.filters().clone(),
        charts: session.render_all(state.dataset()),
    };
    let mut sessions = state.sessions.write().await;
    state.evict_idle(&mut sessions);
    sessions.insert(id, LiveSession::new(session));
    debug!("Created session {id}");
    (StatusCode::CREATED, Json(reply))
}

async fn apply_changes(
    State(state): State<Arc<AppState>>,
    id: std::result::Result<UrlPath<u64>, PathRejection>,
    body: std::result::Result<Json<Vec<FilterChange>>, JsonRejection>,
) -> Result<Json<SessionUpdate>> {
    let UrlPath(id) = id?;
    let Json(changes) = body?;
    let mut sessions = state.sessions.write().await;
    let live = sessions.get_mut(&id).ok_or(Error::UnknownSession(id))?;
    live.last_used = Instant::now();
    let updates = live.session.apply(state.dataset(), changes)?;
    Ok(Json(SessionUpdate {
        id,
        filters: live.session.filters().clone(),
        updates,
    }))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    id: std::result::Result<UrlPath<u64>, PathRejection>,
) -> Result<StatusCode> {
    let UrlPath(id) = id?;
    state
        .sessions
        .write()
        .await
        .remove(&id)
        .ok_or(Error::UnknownSession(id))?;
    debug!("Deleted session {id}");
    Ok(StatusCode::NO_CONTENT)
}
