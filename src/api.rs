use std::sync::Arc;

use serde::Deserialize;
use shuttle_axum::axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::bootstrap::FeedRuntime;
use crate::pipeline::FeedOutcome;
use crate::profile::ViewerPreferences;

#[derive(Clone)]
pub struct AppState {
    runtime: Arc<FeedRuntime>,
}

pub fn router(runtime: Arc<FeedRuntime>) -> Router {
    let state = AppState { runtime };

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/feed", get(feed))
        .route(
            "/viewers/{id}/preferences",
            get(get_preferences).put(put_preferences),
        )
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct FeedQuery {
    #[serde(default)]
    viewer: Option<String>,
}

async fn feed(State(state): State<AppState>, Query(q): Query<FeedQuery>) -> Json<FeedOutcome> {
    Json(state.runtime.feed_for(q.viewer.as_deref()).await)
}

async fn get_preferences(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.runtime.profiles().get_preferences(&id).await {
        Some(prefs) => Json(prefs).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_preferences(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(prefs): Json<ViewerPreferences>,
) -> StatusCode {
    state.runtime.profiles().set_preferences(&id, prefs).await;
    tracing::info!(viewer = %id, "preferences updated");
    StatusCode::NO_CONTENT
}
