//! Health check endpoint

use crate::backend::Mode;
use crate::server::AppState;
use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub models_loaded: bool,
    pub sensevoice_enabled: bool,
    pub translation_enabled: bool,
    pub active_mode: Option<Mode>,
    pub version: String,
}

/// GET /health
///
/// Pure status query; never triggers a load.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.service.health();
    Json(HealthResponse {
        status: "healthy",
        models_loaded: snapshot.models_loaded,
        sensevoice_enabled: snapshot.sensevoice_enabled,
        translation_enabled: snapshot.translation_enabled,
        active_mode: snapshot.active_mode,
        version: crate::version_string(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
