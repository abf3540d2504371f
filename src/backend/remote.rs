//! Collaborators backed by model sidecar processes over HTTP.
//!
//! Each sidecar exposes `GET /health` plus one inference route. The HTTP
//! client is built in `load()`, which always runs on a blocking thread.

use crate::audio::AudioClip;
use crate::backend::{
    AsrModel, EmotionModel, EmotionScores, Model, RichTranscript, Transcript, TranslationModel,
    UnifiedModel,
};
use crate::error::{Result, VoxError};
use reqwest::blocking::{Client, RequestBuilder, multipart};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection to one sidecar.
#[derive(Debug)]
struct Sidecar {
    name: String,
    base_url: String,
    timeout: Duration,
    client: Option<Client>,
}

impl Sidecar {
    fn new(name: &str, base_url: &str, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: None,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn load_error(&self, message: impl std::fmt::Display) -> VoxError {
        VoxError::ModelLoad {
            model: self.name.clone(),
            message: message.to_string(),
        }
    }

    fn connect(&mut self) -> Result<()> {
        let client = match self.client.take() {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| self.load_error(e))?,
        };

        let url = self.url("health");
        tracing::debug!(sidecar = %self.name, url = %url, "Checking sidecar health");
        let result = client.get(&url).send();
        self.client = Some(client);

        let response = result.map_err(|e| self.load_error(e))?;
        if !response.status().is_success() {
            return Err(self.load_error(format!("health check returned {}", response.status())));
        }
        Ok(())
    }

    fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or_else(|| VoxError::ModelNotLoaded {
            model: self.name.clone(),
        })
    }

    /// Send a request and decode its JSON body. Any failure is a plain message.
    fn call<T: DeserializeOwned>(
        &self,
        build: impl FnOnce(&Client) -> std::result::Result<RequestBuilder, String>,
    ) -> std::result::Result<T, String> {
        let client = self.client().map_err(|e| e.to_string())?;
        let response = build(client)?.send().map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(format!("{} returned {}: {}", self.name, status, body));
        }
        response.json::<T>().map_err(|e| e.to_string())
    }

    fn audio_form(clip: &AudioClip) -> std::result::Result<multipart::Form, String> {
        multipart::Form::new()
            .file("audio", clip.path())
            .map_err(|e| format!("cannot read {}: {}", clip.path().display(), e))
    }
}

/// Single-pass model behind `POST /generate`.
#[derive(Debug)]
pub struct RemoteUnified {
    sidecar: Sidecar,
}

impl RemoteUnified {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            sidecar: Sidecar::new("sensevoice", base_url, timeout),
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    text: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

impl Model for RemoteUnified {
    fn name(&self) -> &str {
        &self.sidecar.name
    }

    fn load(&mut self) -> Result<()> {
        self.sidecar.connect()
    }
}

impl UnifiedModel for RemoteUnified {
    fn generate(&mut self, clip: &AudioClip, language: &str) -> Result<Option<RichTranscript>> {
        let url = self.sidecar.url("generate");
        let language = language.to_string();
        let response: GenerateResponse = self
            .sidecar
            .call(|client| {
                let form = Sidecar::audio_form(clip)?.text("language", language);
                Ok(client.post(&url).multipart(form))
            })
            .map_err(VoxError::analysis)?;

        Ok(response.text.map(|text| RichTranscript {
            text,
            language: response.language,
        }))
    }
}

/// ASR model behind `POST /transcribe`.
#[derive(Debug)]
pub struct RemoteAsr {
    sidecar: Sidecar,
}

impl RemoteAsr {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            sidecar: Sidecar::new("asr", base_url, timeout),
        }
    }
}

impl Model for RemoteAsr {
    fn name(&self) -> &str {
        &self.sidecar.name
    }

    fn load(&mut self) -> Result<()> {
        self.sidecar.connect()
    }
}

impl AsrModel for RemoteAsr {
    fn transcribe(&mut self, clip: &AudioClip) -> Result<Transcript> {
        let url = self.sidecar.url("transcribe");
        self.sidecar
            .call(|client| Ok(client.post(&url).multipart(Sidecar::audio_form(clip)?)))
            .map_err(VoxError::analysis)
    }
}

/// Emotion classifier behind `POST /classify`.
#[derive(Debug)]
pub struct RemoteEmotion {
    sidecar: Sidecar,
}

impl RemoteEmotion {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            sidecar: Sidecar::new("emotion", base_url, timeout),
        }
    }
}

impl Model for RemoteEmotion {
    fn name(&self) -> &str {
        &self.sidecar.name
    }

    fn load(&mut self) -> Result<()> {
        self.sidecar.connect()
    }
}

impl EmotionModel for RemoteEmotion {
    fn classify(&mut self, clip: &AudioClip) -> Result<EmotionScores> {
        let url = self.sidecar.url("classify");
        self.sidecar
            .call(|client| Ok(client.post(&url).multipart(Sidecar::audio_form(clip)?)))
            .map_err(VoxError::analysis)
    }
}

/// Translator behind `POST /translate`.
#[derive(Debug)]
pub struct RemoteTranslator {
    sidecar: Sidecar,
}

impl RemoteTranslator {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            sidecar: Sidecar::new("translator", base_url, timeout),
        }
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    source: &'a str,
    target: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translated_text: String,
}

impl Model for RemoteTranslator {
    fn name(&self) -> &str {
        &self.sidecar.name
    }

    fn load(&mut self) -> Result<()> {
        self.sidecar.connect()
    }
}

impl TranslationModel for RemoteTranslator {
    fn translate(&mut self, text: &str, source: &str, target: &str) -> Result<String> {
        let url = self.sidecar.url("translate");
        let body = TranslateRequest {
            text,
            source,
            target,
        };
        let response: TranslateResponse = self
            .sidecar
            .call(|client| Ok(client.post(&url).json(&body)))
            .map_err(|message| VoxError::TranslationFailure {
                target: target.to_string(),
                message,
            })?;
        Ok(response.translated_text)
    }
}
