// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequence game engine.
//!
//! This module provides the core of the game:
//! - Sequence generation from an RNG source
//! - Input matching against the expected sequence
//! - Scoring, combo, streak and difficulty progression
//! - The round state machine that ties them together
//!
//! The engine is synchronous and owns no timers. Operations return a
//! [`Step`] describing what happened and, when a delay is needed, the one
//! [`Pending`] transition the caller should schedule. Each pending
//! transition carries a [`Ticket`]; the round ignores any wake-up whose
//! ticket is not the one it is waiting for.

pub mod matcher;
pub mod round;
pub mod scoring;
pub mod sequence;

pub use matcher::{MatchResult, Progress};
pub use round::Round;
pub use scoring::{Award, Progression, ScoreCard, ScoringEngine};
pub use sequence::SequenceGenerator;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Index of a selectable position on the board, in `[0, board size)`
pub type Slot = usize;

/// Ordered list of slots the player must reproduce.
///
/// Sequences are values: extending one produces a new sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence {
    slots: Vec<Slot>,
}

impl Sequence {
    /// Create a sequence from slots
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// New sequence with one more slot at the end
    pub fn extended(&self, slot: Slot) -> Self {
        let mut slots = Vec::with_capacity(self.slots.len() + 1);
        slots.extend_from_slice(&self.slots);
        slots.push(slot);
        Self { slots }
    }

    /// Slot at a position
    pub fn get(&self, index: usize) -> Option<Slot> {
        self.slots.get(index).copied()
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if there are no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots as a slice
    pub fn as_slice(&self) -> &[Slot] {
        &self.slots
    }
}

impl From<Vec<Slot>> for Sequence {
    fn from(slots: Vec<Slot>) -> Self {
        Self::new(slots)
    }
}

/// Game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    #[default]
    Normal,
    TimeAttack,
    Survival,
}

impl GameMode {
    /// All modes in display order
    pub const ALL: [GameMode; 3] = [GameMode::Normal, GameMode::TimeAttack, GameMode::Survival];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Normal => "Normal",
            GameMode::TimeAttack => "Time Attack",
            GameMode::Survival => "Survival",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(GameMode::Normal),
            "time-attack" | "timeattack" | "time" => Ok(GameMode::TimeAttack),
            "survival" => Ok(GameMode::Survival),
            other => Err(format!("Unknown game mode: {}", other)),
        }
    }
}

/// Round status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// No active sequence
    #[default]
    Idle,
    /// Sequence is being shown; input is ignored
    Presenting,
    /// Waiting for the player's selections
    AwaitingInput,
    /// Level complete, waiting to present the next sequence; input is ignored
    Evaluating,
    /// Round ended
    GameOver,
}

impl Status {
    /// True while a round is in progress
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Status::Presenting | Status::AwaitingInput | Status::Evaluating
        )
    }
}

/// Identifies one scheduled transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Raw counter value
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Monotonic ticket source
#[derive(Debug, Default)]
pub(crate) struct TicketCounter(u64);

impl TicketCounter {
    pub(crate) fn issue(&mut self) -> Ticket {
        self.0 += 1;
        Ticket(self.0)
    }
}

/// A delayed transition the caller must schedule
#[derive(Debug, Clone, PartialEq)]
pub enum Pending {
    /// Wait `lead_in`, present `sequence` at `speed`, then report back
    /// through [`Round::presentation_finished`]
    Present {
        ticket: Ticket,
        lead_in: Duration,
        sequence: Sequence,
        speed: f64,
    },
    /// Wait `delay`, then report back through [`Round::advance_due`]
    Advance { ticket: Ticket, delay: Duration },
}

impl Pending {
    /// Ticket carried by this transition
    pub fn ticket(&self) -> Ticket {
        match self {
            Pending::Present { ticket, .. } | Pending::Advance { ticket, .. } => *ticket,
        }
    }
}

/// Notable things that happened during an engine operation
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A fresh round began
    RoundStarted { mode: GameMode },
    /// The player's selection was accepted; play its tone
    PlayerTone(Slot),
    /// A level was reproduced correctly
    LevelComplete { level: u32, award: Award },
    /// Several levels in a row without a miss
    ComboReached(u32),
    /// Streak payout
    StreakBonus { streak: u32, points: u32 },
    /// Survival miss with lives remaining
    LifeLost { lives_left: u32 },
    /// Time-attack countdown ran out
    TimeExpired,
    /// Terminal transition
    GameOver {
        mode: GameMode,
        final_score: u32,
        level: u32,
        best_combo: u32,
        new_high_score: bool,
    },
    /// High score beaten; persist it
    NewHighScore(u32),
    /// Speed multiplier changed
    SpeedChanged(f64),
    /// Sound preference toggled; persist it
    SoundToggled(bool),
}

/// Result of an engine operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    /// Events in the order they happened
    pub events: Vec<GameEvent>,
    /// Transition to schedule, replacing any earlier one
    pub schedule: Option<Pending>,
}

impl Step {
    /// Step with no effect
    pub fn none() -> Self {
        Self::default()
    }

    /// True if nothing happened
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.schedule.is_none()
    }

    pub(crate) fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

/// Read-only view of the round for display
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSnapshot {
    pub mode: GameMode,
    pub status: Status,
    pub level: u32,
    pub score: u32,
    pub high_score: u32,
    pub combo: u32,
    pub best_combo: u32,
    pub streak: u32,
    /// Survival only
    pub lives: Option<u32>,
    /// Time attack only
    pub time_remaining: Option<f64>,
    pub speed: f64,
    pub sequence_len: usize,
    pub progress_len: usize,
    pub sound_enabled: bool,
}
