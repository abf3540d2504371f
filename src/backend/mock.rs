//! Mock collaborators for tests and offline runs.
//!
//! Each mock succeeds by default; builder methods switch on canned responses
//! or failures. Load and call counts are shared handles so they can still be
//! read after the mock is boxed into a slot.

use crate::audio::AudioClip;
use crate::backend::{
    AsrModel, EmotionModel, EmotionScores, Model, RichTranscript, Transcript, TranslationModel,
    UnifiedModel,
};
use crate::error::{Result, VoxError};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Shared counter of how often something happened.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
struct Lifecycle {
    name: String,
    fail_load: bool,
    load_delay: Option<Duration>,
    loads: Counter,
}

impl Lifecycle {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail_load: false,
            load_delay: None,
            loads: Counter::default(),
        }
    }

    fn load(&self) -> Result<()> {
        if let Some(delay) = self.load_delay {
            std::thread::sleep(delay);
        }
        self.loads.bump();
        if self.fail_load {
            Err(VoxError::ModelLoad {
                model: self.name.clone(),
                message: "mock load failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

fn mock_failure() -> VoxError {
    VoxError::analysis("mock inference failure")
}

/// Mock single-pass model returning annotated text.
#[derive(Debug, Clone)]
pub struct MockUnified {
    lifecycle: Lifecycle,
    response: Option<RichTranscript>,
    should_fail: bool,
    delay: Option<Duration>,
}

impl MockUnified {
    pub fn new(name: &str) -> Self {
        Self {
            lifecycle: Lifecycle::new(name),
            response: Some(RichTranscript {
                text: "<|en|><|NEUTRAL|><|Speech|><|withitn|>mock transcription".to_string(),
                language: Some("en".to_string()),
            }),
            should_fail: false,
            delay: None,
        }
    }

    pub fn with_response(mut self, text: &str, language: Option<&str>) -> Self {
        self.response = Some(RichTranscript {
            text: text.to_string(),
            language: language.map(str::to_string),
        });
        self
    }

    /// Produce no output at all, as for a silent clip.
    pub fn with_no_output(mut self) -> Self {
        self.response = None;
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn with_load_failure(mut self) -> Self {
        self.lifecycle.fail_load = true;
        self
    }

    /// Sleep before answering, to simulate slow inference.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep inside `load`, as a cold sidecar would.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.lifecycle.load_delay = Some(delay);
        self
    }

    pub fn load_counter(&self) -> Counter {
        self.lifecycle.loads.clone()
    }
}

impl Model for MockUnified {
    fn name(&self) -> &str {
        &self.lifecycle.name
    }

    fn load(&mut self) -> Result<()> {
        self.lifecycle.load()
    }
}

impl UnifiedModel for MockUnified {
    fn generate(&mut self, _clip: &AudioClip, _language: &str) -> Result<Option<RichTranscript>> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.should_fail {
            return Err(mock_failure());
        }
        Ok(self.response.clone())
    }
}

/// Mock ASR model.
#[derive(Debug, Clone)]
pub struct MockAsr {
    lifecycle: Lifecycle,
    response: Transcript,
    should_fail: bool,
}

impl MockAsr {
    pub fn new(name: &str) -> Self {
        Self {
            lifecycle: Lifecycle::new(name),
            response: Transcript {
                text: "mock transcription".to_string(),
                language: "en".to_string(),
            },
            should_fail: false,
        }
    }

    pub fn with_response(mut self, text: &str, language: &str) -> Self {
        self.response = Transcript {
            text: text.to_string(),
            language: language.to_string(),
        };
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn with_load_failure(mut self) -> Self {
        self.lifecycle.fail_load = true;
        self
    }

    pub fn load_counter(&self) -> Counter {
        self.lifecycle.loads.clone()
    }
}

impl Model for MockAsr {
    fn name(&self) -> &str {
        &self.lifecycle.name
    }

    fn load(&mut self) -> Result<()> {
        self.lifecycle.load()
    }
}

impl AsrModel for MockAsr {
    fn transcribe(&mut self, _clip: &AudioClip) -> Result<Transcript> {
        if self.should_fail {
            return Err(mock_failure());
        }
        Ok(self.response.clone())
    }
}

/// Mock emotion classifier.
#[derive(Debug, Clone)]
pub struct MockEmotion {
    lifecycle: Lifecycle,
    response: EmotionScores,
    should_fail: bool,
}

impl MockEmotion {
    pub fn new(name: &str) -> Self {
        Self {
            lifecycle: Lifecycle::new(name),
            response: EmotionScores {
                label: String::new(),
                confidence: 0.0,
                probabilities: BTreeMap::new(),
            },
            should_fail: false,
        }
        .with_label("neutral", 0.9)
    }

    /// Answer with `label` at `confidence`, the rest spread evenly.
    pub fn with_label(mut self, label: &str, confidence: f32) -> Self {
        let others = ["angry", "disgust", "fearful", "happy", "neutral", "sad", "surprised"];
        let rest = (1.0 - confidence) / (others.len() - 1) as f32;
        let mut probabilities: BTreeMap<String, f32> =
            others.iter().map(|l| (l.to_string(), rest)).collect();
        probabilities.insert(label.to_string(), confidence);
        self.response = EmotionScores {
            label: label.to_string(),
            confidence,
            probabilities,
        };
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn with_load_failure(mut self) -> Self {
        self.lifecycle.fail_load = true;
        self
    }

    pub fn load_counter(&self) -> Counter {
        self.lifecycle.loads.clone()
    }
}

impl Model for MockEmotion {
    fn name(&self) -> &str {
        &self.lifecycle.name
    }

    fn load(&mut self) -> Result<()> {
        self.lifecycle.load()
    }
}

impl EmotionModel for MockEmotion {
    fn classify(&mut self, _clip: &AudioClip) -> Result<EmotionScores> {
        if self.should_fail {
            return Err(mock_failure());
        }
        Ok(self.response.clone())
    }
}

/// Mock translator answering `"[{target}] {text}"`.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    lifecycle: Lifecycle,
    failing_targets: HashSet<String>,
    slow_targets: HashSet<String>,
    delay: Duration,
    calls: Counter,
}

impl MockTranslator {
    pub fn new(name: &str) -> Self {
        Self {
            lifecycle: Lifecycle::new(name),
            failing_targets: HashSet::new(),
            slow_targets: HashSet::new(),
            delay: Duration::ZERO,
            calls: Counter::default(),
        }
    }

    /// Fail every call whose internal target code is `target`.
    pub fn with_failing_target(mut self, target: &str) -> Self {
        self.failing_targets.insert(target.to_string());
        self
    }

    /// Sleep for `delay` on every call whose internal target code is `target`.
    pub fn with_slow_target(mut self, target: &str, delay: Duration) -> Self {
        self.slow_targets.insert(target.to_string());
        self.delay = delay;
        self
    }

    pub fn with_load_failure(mut self) -> Self {
        self.lifecycle.fail_load = true;
        self
    }

    pub fn load_counter(&self) -> Counter {
        self.lifecycle.loads.clone()
    }

    pub fn call_counter(&self) -> Counter {
        self.calls.clone()
    }
}

impl Model for MockTranslator {
    fn name(&self) -> &str {
        &self.lifecycle.name
    }

    fn load(&mut self) -> Result<()> {
        self.lifecycle.load()
    }
}

impl TranslationModel for MockTranslator {
    fn translate(&mut self, text: &str, _source: &str, target: &str) -> Result<String> {
        self.calls.bump();
        if self.slow_targets.contains(target) {
            std::thread::sleep(self.delay);
        }
        if self.failing_targets.contains(target) {
            return Err(VoxError::TranslationFailure {
                target: target.to_string(),
                message: "mock translation failure".to_string(),
            });
        }
        Ok(format!("[{}] {}", target, text))
    }
}
