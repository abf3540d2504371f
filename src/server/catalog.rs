//! Registry listings: languages and emotions

use crate::registry::{EmotionDisplay, LanguageInfo};
use crate::server::AppState;
use axum::{Json, Router, extract::State, routing::get};
use std::collections::BTreeMap;

/// GET /languages
pub async fn list_languages(State(state): State<AppState>) -> Json<Vec<&'static LanguageInfo>> {
    Json(state.service.languages())
}

/// GET /emotions
pub async fn list_emotions(
    State(state): State<AppState>,
) -> Json<BTreeMap<&'static str, EmotionDisplay>> {
    Json(state.service.emotions())
}

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/languages", get(list_languages))
        .route("/emotions", get(list_emotions))
}
