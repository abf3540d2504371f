//! Text translation endpoint

use crate::analysis::TranslationItem;
use crate::server::AppState;
use crate::server::error::ApiResult;
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub source_language: String,
    pub target_languages: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub source_text: String,
    pub source_language: String,
    pub translations: Vec<TranslationItem>,
}

/// POST /translate
///
/// Loads the translator on first use; 503 when it is missing or fails to load.
pub async fn translate_text(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> ApiResult<Json<TranslateResponse>> {
    let translations = state
        .service
        .translate(
            &request.text,
            &request.source_language,
            &request.target_languages,
        )
        .await?;

    Ok(Json(TranslateResponse {
        source_text: request.text,
        source_language: request.source_language,
        translations,
    }))
}

pub fn translate_routes() -> Router<AppState> {
    Router::new().route("/translate", post(translate_text))
}
