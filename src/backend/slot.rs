//! Lifecycle slot owning one collaborator.

use crate::backend::Model;
use crate::error::{Result, VoxError};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Load state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    /// Configured but never loaded.
    Unconfigured,
    Loading,
    Ready,
    /// Last load attempt failed; the next `ensure_loaded` retries.
    Failed,
}

/// One collaborator plus its load state.
///
/// Loading and every call through [`Slot::with`] hold the same model lock, so
/// concurrent first callers load once and the rest observe `Ready`. The state
/// sits behind its own lock so [`Slot::state`] never waits on inference.
pub struct Slot<M: ?Sized> {
    state: Mutex<SlotState>,
    model: Mutex<Box<M>>,
    name: String,
}

impl<M: Model + ?Sized> Slot<M> {
    pub fn new(model: Box<M>) -> Self {
        let name = model.name().to_string();
        Self {
            state: Mutex::new(SlotState::Unconfigured),
            model: Mutex::new(model),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SlotState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SlotState::Ready
    }

    fn set_state(&self, state: SlotState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn lock_model(&self) -> Result<MutexGuard<'_, Box<M>>> {
        self.model
            .lock()
            .map_err(|_| VoxError::analysis(format!("{} lock poisoned", self.name)))
    }

    /// Load the collaborator unless it is already ready.
    ///
    /// A failed slot is retried once per call.
    pub fn ensure_loaded(&self) -> Result<()> {
        let mut model = self.lock_model()?;
        if self.is_ready() {
            return Ok(());
        }

        self.set_state(SlotState::Loading);
        tracing::info!(model = %self.name, "Loading model");
        match model.load() {
            Ok(()) => {
                self.set_state(SlotState::Ready);
                tracing::info!(model = %self.name, "Model ready");
                Ok(())
            }
            Err(e) => {
                self.set_state(SlotState::Failed);
                tracing::warn!(model = %self.name, error = %e, "Model failed to load");
                Err(match e {
                    VoxError::ModelLoad { .. } => e,
                    other => VoxError::ModelLoad {
                        model: self.name.clone(),
                        message: other.to_string(),
                    },
                })
            }
        }
    }

    /// Run `f` against the loaded collaborator.
    pub fn with<R>(&self, f: impl FnOnce(&mut M) -> Result<R>) -> Result<R> {
        let mut model = self.lock_model()?;
        if !self.is_ready() {
            return Err(VoxError::ModelNotLoaded {
                model: self.name.clone(),
            });
        }
        f(&mut **model)
    }
}

impl<M: ?Sized> std::fmt::Debug for Slot<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.name)
            .field("state", &*self.state.lock().unwrap_or_else(PoisonError::into_inner))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioClip;
    use crate::backend::AsrModel;
    use crate::backend::mock::MockAsr;
    use std::sync::Arc;

    #[test]
    fn test_new_slot_is_unconfigured() {
        let slot: Slot<dyn AsrModel> = Slot::new(Box::new(MockAsr::new("asr")));
        assert_eq!(slot.state(), SlotState::Unconfigured);
        assert!(!slot.is_ready());
        assert_eq!(slot.name(), "asr");
    }

    #[test]
    fn test_load_is_idempotent_once_ready() {
        let mock = MockAsr::new("asr");
        let loads = mock.load_counter();
        let slot: Slot<dyn AsrModel> = Slot::new(Box::new(mock));

        slot.ensure_loaded().unwrap();
        slot.ensure_loaded().unwrap();
        assert_eq!(slot.state(), SlotState::Ready);
        assert_eq!(loads.count(), 1);
    }

    #[test]
    fn test_failed_slot_retries_once_per_call() {
        let mock = MockAsr::new("asr").with_load_failure();
        let loads = mock.load_counter();
        let slot: Slot<dyn AsrModel> = Slot::new(Box::new(mock));

        let err = slot.ensure_loaded().unwrap_err();
        assert!(matches!(err, VoxError::ModelLoad { .. }));
        assert_eq!(slot.state(), SlotState::Failed);
        assert_eq!(loads.count(), 1);

        assert!(slot.ensure_loaded().is_err());
        assert_eq!(loads.count(), 2);
    }

    #[test]
    fn test_with_requires_ready() {
        let slot: Slot<dyn AsrModel> = Slot::new(Box::new(MockAsr::new("asr")));
        let clip = AudioClip::new("/tmp/clip.wav");

        let err = slot.with(|m| m.transcribe(&clip)).unwrap_err();
        assert!(matches!(err, VoxError::ModelNotLoaded { .. }));

        slot.ensure_loaded().unwrap();
        let transcript = slot.with(|m| m.transcribe(&clip)).unwrap();
        assert_eq!(transcript.text, "mock transcription");
    }

    #[test]
    fn test_concurrent_first_loads_load_once() {
        let mock = MockAsr::new("asr");
        let loads = mock.load_counter();
        let slot: Arc<Slot<dyn AsrModel>> = Arc::new(Slot::new(Box::new(mock)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let slot = slot.clone();
                std::thread::spawn(move || slot.ensure_loaded())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(loads.count(), 1);
    }
}
