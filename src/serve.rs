//! The HTTP routes. Each handler fetches what it needs from the store, hands it
//! to the matching view builder and renders the result; errors are turned into
//! responses by [`AppError`].
//!
//! | Route            | Page                                            |
//! |------------------|-------------------------------------------------|
//! | `/`              | the most recent entry                           |
//! | `/entry/{id}`    | a single entry                                  |
//! | `/history`       | every entry, grouped by year                    |
//! | `/feeds/{type}`  | `atom.xml`, `rss.xml` or `jsonfeed.json`        |
//! | `/{uid}`         | a one-off page, or the landing page if unknown  |
//! | `/health`        | JSON health report                              |
//!
//! `health`, `history` and `feeds` are reserved: the fixed routes above take
//! priority over `/{uid}`, so one-off pages with those uids are never served.

use crate::entry::EntryId;
use crate::error::{AppError, AppResult};
use crate::feed::{self, Feed, FeedConfig, FeedKind};
use crate::history::HistoryView;
use crate::render::Templates;
use crate::store::EntryStore;
use crate::view::EntryView;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared, read-only dependencies of every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntryStore>,
    pub templates: Arc<Templates>,
    pub feed: Arc<FeedSettings>,
}

/// The feed identity plus the limits applied when building a feed.
#[derive(Clone, Debug)]
pub struct FeedSettings {
    pub identity: FeedConfig,

    /// How many of the most recent entries a feed lists.
    pub recent_entries: usize,

    /// How many content characters an item description keeps.
    pub description_cutoff: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn EntryStore>, templates: Templates, feed: FeedSettings) -> AppState {
        AppState {
            store,
            templates: Arc::new(templates),
            feed: Arc::new(feed),
        }
    }
}

/// Builds the application router. When `static_directory` is given its files
/// are served under `/static`, and `static` becomes a reserved uid as well.
pub fn router(state: AppState, static_directory: Option<&std::path::Path>) -> Router {
    let mut router = Router::new()
        .route("/", get(landing))
        .route("/entry/{id}", get(entry_page))
        .route("/history", get(history_page))
        .route("/feeds", get(feed_without_type))
        .route("/feeds/", get(feed_without_type))
        .route("/feeds/{kind}", get(feed_page))
        .route("/health", get(health))
        .route("/{uid}", get(one_off_page));
    if let Some(dir) = static_directory {
        router = router.nest_service("/static", ServeDir::new(dir));
    }
    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// GET / -- the most recent entry.
async fn landing(State(state): State<AppState>) -> AppResult<Html<String>> {
    render_landing(&state).await
}

async fn render_landing(state: &AppState) -> AppResult<Html<String>> {
    let entry = state.store.get_entry(None).await?;
    let view = EntryView::from_entry(&entry)?;
    Ok(Html(state.templates.render_landing(&view)?))
}

/// GET /entry/{id}
async fn entry_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id: EntryId = id.parse().map_err(|_| AppError::InvalidIdentifier(id))?;
    let entry = state.store.get_entry(Some(id)).await?;
    Ok(Html(state.templates.render_entry(&EntryView::from_entry(&entry)?)?))
}

/// GET /{uid} -- a one-off page. Unknown uids get the landing page. Uids that
/// collide with a fixed route (`health`, `history`, `feeds`) never reach here.
async fn one_off_page(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> AppResult<Html<String>> {
    match state.store.get_one_off(&uid).await {
        Ok(one_off) => Ok(Html(
            state.templates.render_entry(&EntryView::from_one_off(&one_off))?,
        )),
        Err(err) if err.is_not_found() => {
            tracing::info!(uid = %uid, "No one-off page, serving landing page");
            render_landing(&state).await
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /history
async fn history_page(State(state): State<AppState>) -> AppResult<Html<String>> {
    let records = state.store.get_history().await?;
    let view = HistoryView::from_history(&records)?;
    Ok(Html(state.templates.render_history(&view)?))
}

/// GET /feeds/{kind}. The feed type is validated before the store is queried.
async fn feed_page(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<Response> {
    let kind = FeedKind::from_selector(Some(kind.as_str()))?;
    let settings = &state.feed;
    let entries = state.store.get_recent(settings.recent_entries).await?;
    let body =
        Feed::new(&settings.identity, &entries, settings.description_cutoff)?.render(kind)?;
    Ok(([(CONTENT_TYPE, kind.content_type())], body).into_response())
}

/// GET /feeds
async fn feed_without_type() -> AppResult<Response> {
    Err(feed::Error::MissingType.into())
}

/// Health check response payload.
#[derive(Serialize)]
struct HealthResponse {
    /// `ok`, or `degraded` when the store is unreachable.
    status: &'static str,
    /// Crate version from Cargo.toml.
    version: &'static str,
    store_healthy: bool,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_healthy = state.store.health_check().await.is_ok();
    Json(HealthResponse {
        status: if store_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        store_healthy,
    })
}
