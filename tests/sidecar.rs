//! Remote collaborators against an in-process fake sidecar.

#![cfg(feature = "remote")]

use axum::{
    Json, Router,
    extract::Multipart,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use voxsense::audio::AudioClip;
use voxsense::backend::BackendManager;
use voxsense::backend::remote::{RemoteTranslator, RemoteUnified};
use voxsense::service::{ServiceOptions, VoiceService};
use voxsense::VoxError;

async fn generate(mut multipart: Multipart) -> Json<Value> {
    let mut language = String::new();
    let mut audio_len = 0;
    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name() {
            Some("audio") => audio_len = field.bytes().await.map(|b| b.len()).unwrap_or(0),
            Some("language") => language = field.text().await.unwrap_or_default(),
            _ => {}
        }
    }

    if audio_len == 0 {
        return Json(json!({ "text": null }));
    }
    let reported = if language == "auto" { "fr" } else { language.as_str() };
    Json(json!({
        "text": "<|fr|><|SURPRISED|><|Speech|><|withitn|>Bonjour <|Applause|>",
        "language": reported,
    }))
}

async fn translate(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let target = body["target"].as_str().unwrap_or_default();
    if target == "spa_Latn" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "model exploded" })),
        );
    }
    let text = body["text"].as_str().unwrap_or_default();
    let source = body["source"].as_str().unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({ "translated_text": format!("{source}>{target}: {text}") })),
    )
}

/// Start the fake sidecar and return its base URL.
async fn spawn_sidecar() -> String {
    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/generate", post(generate))
        .route("/translate", post(translate));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

fn clip_file(contents: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

fn remote_service(base_url: &str) -> VoiceService {
    let timeout = Duration::from_secs(10);
    let manager = BackendManager::new()
        .with_unified(Box::new(RemoteUnified::new(base_url, timeout)))
        .with_translator(Box::new(RemoteTranslator::new(base_url, timeout)));
    VoiceService::new(manager, ServiceOptions::default())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_remote_analysis_with_translations() {
    let base_url = spawn_sidecar().await;
    let service = remote_service(&base_url);
    let file = clip_file(b"RIFF fake audio");

    let targets: Vec<String> = ["fr", "es", "de"].iter().map(|s| s.to_string()).collect();
    let result = service
        .analyze(AudioClip::new(file.path()), "auto", &targets)
        .await
        .unwrap();

    assert_eq!(result.transcription.text, "Bonjour");
    assert_eq!(result.transcription.language_code, "fr");
    // Only the transcription languages have display names; others show the code.
    assert_eq!(result.transcription.language_display_name.as_deref(), Some("fr"));
    assert_eq!(result.emotion.label.identifier(), "SURPRISED");
    assert_eq!(
        result.audio_events.as_ref().map(|e| e.len()),
        Some(1)
    );

    // fr is the source, es fails on the sidecar, only de survives.
    let translations = result.translations.unwrap();
    assert_eq!(translations.len(), 1);
    assert_eq!(translations[0].language_code, "de");
    assert_eq!(translations[0].translated_text, "fra_Latn>deu_Latn: Bonjour");

    let health = service.health();
    assert!(health.models_loaded);
    assert!(health.sensevoice_enabled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_remote_empty_output() {
    let base_url = spawn_sidecar().await;
    let service = remote_service(&base_url);
    let file = clip_file(b"");

    let result = service
        .analyze(AudioClip::new(file.path()), "auto", &[])
        .await
        .unwrap();

    assert_eq!(result.transcription.text, "");
    assert_eq!(result.transcription.language_code, "unknown");
    assert_eq!(result.audio_events, Some(vec![]));
    assert!(result.translations.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unreachable_sidecar_is_no_backend() {
    let service = remote_service("http://127.0.0.1:1");
    let file = clip_file(b"RIFF");

    let err = service
        .analyze(AudioClip::new(file.path()), "auto", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, VoxError::NoBackendAvailable { .. }), "{err:?}");
}
