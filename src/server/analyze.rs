//! Audio upload and analysis endpoint

use crate::analysis::AnalysisResult;
use crate::audio::TempClip;
use crate::defaults::DEFAULT_LANGUAGE;
use crate::server::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::translation::parse_target_list;
use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    routing::post,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    pub language: Option<String>,
    /// Comma-separated target languages, e.g. "es,fr,de"
    pub translate_to: Option<String>,
}

/// POST /analyze
///
/// Expects a multipart body with an `audio` file field. The upload lives in a
/// temporary file for the duration of the request only.
pub async fn analyze_audio(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
    mut multipart: Multipart,
) -> ApiResult<Json<AnalysisResult>> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("audio") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            upload = Some((content_type, bytes));
            break;
        }
    }

    let (content_type, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("missing multipart field `audio`".to_string()))?;

    let temp = TempClip::store(&bytes, &content_type).await?;
    tracing::debug!(
        content_type = %content_type,
        bytes = temp.len_bytes(),
        path = %temp.clip().path().display(),
        "Stored upload"
    );

    let language = params
        .language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);
    let targets = params
        .translate_to
        .as_deref()
        .map(parse_target_list)
        .unwrap_or_default();

    let result = state
        .service
        .analyze(temp.clip().clone(), language, &targets)
        .await?;
    Ok(Json(result))
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze_audio))
}
