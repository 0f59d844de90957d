// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback scheduler.
//!
//! Presents a sequence to the player one slot at a time. For each slot:
//! wait `inter_step / speed`, activate, wait `highlight / speed`,
//! deactivate. Highlights never overlap.
//!
//! The plan is a plain list of steps so it can be inspected without a
//! clock; [`PlaybackScheduler::present`] walks it on the tokio timer.
//! Cancelling a presentation is dropping its future.

use std::time::Duration;

use tokio::time::sleep;

use crate::config::PlaybackConfig;
use crate::game::{Sequence, Slot};

/// Presentation cue for the display and tone output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Light the slot and play its tone
    Activate(Slot),
    /// Turn the slot off
    Deactivate(Slot),
}

/// A cue and the wait that precedes it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStep {
    /// Delay since the previous step
    pub wait: Duration,
    /// Cue to fire after the delay
    pub cue: Cue,
}

/// Timed presentation of sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackScheduler {
    inter_step: Duration,
    highlight: Duration,
}

impl PlaybackScheduler {
    /// Create a scheduler from playback timing
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            inter_step: config.inter_step(),
            highlight: config.highlight(),
        }
    }

    /// Step plan for `sequence` at `speed`.
    ///
    /// `speed` must be positive; the round keeps it within its bounds.
    pub fn plan(&self, sequence: &Sequence, speed: f64) -> Vec<PlaybackStep> {
        let inter_step = self.inter_step.div_f64(speed);
        let highlight = self.highlight.div_f64(speed);

        sequence
            .as_slice()
            .iter()
            .flat_map(|&slot| {
                [
                    PlaybackStep { wait: inter_step, cue: Cue::Activate(slot) },
                    PlaybackStep { wait: highlight, cue: Cue::Deactivate(slot) },
                ]
            })
            .collect()
    }

    /// Total time `plan` takes
    pub fn duration(&self, sequence: &Sequence, speed: f64) -> Duration {
        self.plan(sequence, speed).iter().map(|s| s.wait).sum()
    }

    /// Present `sequence`, calling `on_cue` for every cue in order.
    ///
    /// Returns once the last slot has been deactivated.
    pub async fn present<F>(&self, sequence: &Sequence, speed: f64, mut on_cue: F)
    where
        F: FnMut(Cue),
    {
        for step in self.plan(sequence, speed) {
            if !step.wait.is_zero() {
                sleep(step.wait).await;
            }
            on_cue(step.cue);
        }
    }
}
