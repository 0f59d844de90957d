// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tone output boundary.
//!
//! This module provides:
//! - The `ToneSink` trait implemented by whatever actually makes sound
//! - `ToneOutput`, which applies the mute preference and swallows sink errors
//! - A silent sink for headless use
//! - `SineSink`, which renders each slot's pitch through cpal

mod output;

pub use output::{Mixer, SineSink, Voice, TONE_SECONDS};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::game::Slot;
use crate::tones::{Tone, ToneRegistry};

/// Audio error types
#[derive(Debug, Clone, Error)]
pub enum AudioError {
    /// No audio backend could be opened
    #[error("No audio device available")]
    NoDevice,
    /// Device found but could not be configured
    #[error("Audio initialization failed: {0}")]
    InitFailed(String),
    /// Output stream could not be built or started
    #[error("Audio stream error: {0}")]
    StreamFailed(String),
    /// Backend accepted the tone but failed to play it
    #[error("Tone playback failed: {0}")]
    PlaybackFailed(String),
    /// Slot has no registered tone
    #[error("No tone registered for slot {0}")]
    UnknownSlot(Slot),
}

/// Something that can play a tone.
///
/// Implementations must return quickly; playback is fire-and-forget.
pub trait ToneSink: Send + Sync {
    /// Start playing a tone
    fn play(&self, tone: &Tone) -> Result<(), AudioError>;
}

/// Sink that discards every tone
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl ToneSink for SilentSink {
    fn play(&self, _tone: &Tone) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Tone emission with the mute gate applied.
///
/// Cheap to clone; clones share the sink and the enabled flag.
#[derive(Clone)]
pub struct ToneOutput {
    registry: Arc<ToneRegistry>,
    sink: Arc<dyn ToneSink>,
    enabled: Arc<AtomicBool>,
}

impl ToneOutput {
    /// Create a new tone output
    pub fn new(registry: ToneRegistry, sink: Arc<dyn ToneSink>, enabled: bool) -> Self {
        Self {
            registry: Arc::new(registry),
            sink,
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    /// Emit the tone for a slot.
    ///
    /// Does nothing while muted. Sink failures are logged and dropped so
    /// they can never reach game state.
    pub fn emit(&self, slot: Slot) {
        if !self.is_enabled() {
            return;
        }

        let result = match self.registry.tone(slot) {
            Some(tone) => self.sink.play(tone),
            None => Err(AudioError::UnknownSlot(slot)),
        };

        if let Err(e) = result {
            warn!(slot, error = %e, "tone emission failed");
        }
    }

    /// Enable or mute output
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Check whether output is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Tone registry in use
    pub fn registry(&self) -> &ToneRegistry {
        &self.registry
    }
}
