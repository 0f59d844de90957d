// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scoring and progression engine.
//!
//! Score for a completed level:
//! `len * points_per_slot + floor(combo * combo_rate) + floor(time_left * time_bonus_rate)`
//! where `combo` is the count before this completion and the time term only
//! applies in time attack. Every `streak_interval`-th success in a row pays
//! a further `(streak / streak_interval) * streak_bonus`.

use crate::config::{ProgressionConfig, ScoringConfig, SpeedStep, TimeAttackRules};

/// Breakdown of the points for one completed level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Award {
    pub base: u32,
    pub combo_bonus: u32,
    pub time_bonus: u32,
    pub streak_bonus: u32,
}

impl Award {
    /// Sum of all parts
    pub fn total(&self) -> u32 {
        self.base
            .saturating_add(self.combo_bonus)
            .saturating_add(self.time_bonus)
            .saturating_add(self.streak_bonus)
    }
}

/// Score counters for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreCard {
    pub score: u32,
    pub combo: u32,
    /// Best combo of the session; survives round resets
    pub best_combo: u32,
    pub streak: u32,
}

impl ScoreCard {
    /// Reset the per-round counters for a new round
    pub fn reset_round(&mut self) {
        self.score = 0;
        self.combo = 0;
        self.streak = 0;
    }

    /// A miss breaks the combo and the streak
    pub fn record_miss(&mut self) {
        self.combo = 0;
        self.streak = 0;
    }
}

/// Score rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringEngine {
    rules: ScoringConfig,
}

impl ScoringEngine {
    /// Create an engine from score rules
    pub fn new(rules: ScoringConfig) -> Self {
        Self { rules }
    }

    /// Score a completed level and advance the counters.
    ///
    /// `time_remaining` is `Some` only in time attack.
    pub fn complete(
        &self,
        card: &mut ScoreCard,
        sequence_len: usize,
        time_remaining: Option<f64>,
    ) -> Award {
        let base = (sequence_len as u32).saturating_mul(self.rules.points_per_slot);
        let combo_bonus = (card.combo as f64 * self.rules.combo_rate).floor() as u32;
        let time_bonus = time_remaining
            .map(|t| (t.max(0.0) * self.rules.time_bonus_rate).floor() as u32)
            .unwrap_or(0);

        let streak = card.streak + 1;
        let interval = self.rules.streak_interval;
        let streak_bonus = if interval > 0 && streak % interval == 0 {
            (streak / interval).saturating_mul(self.rules.streak_bonus)
        } else {
            0
        };

        let award = Award { base, combo_bonus, time_bonus, streak_bonus };

        card.score = card.score.saturating_add(award.total());
        card.combo += 1;
        card.best_combo = card.best_combo.max(card.combo);
        card.streak = streak;

        award
    }
}

/// Difficulty scaling: speed steps and the time-attack clock
#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    steps: Vec<SpeedStep>,
    min_speed: f64,
    max_speed: f64,
    max_level: Option<u32>,
    time_attack: TimeAttackRules,
}

impl Progression {
    /// Create from configuration
    pub fn new(config: &ProgressionConfig, time_attack: TimeAttackRules) -> Self {
        let mut steps = config.speed_steps.clone();
        steps.sort_by_key(|s| s.above_level);
        Self {
            steps,
            min_speed: config.min_speed,
            max_speed: config.max_speed,
            max_level: config.max_level,
            time_attack,
        }
    }

    /// Speed for `level`, if the level has passed any threshold
    pub fn speed_for_level(&self, level: u32) -> Option<f64> {
        self.steps
            .iter()
            .rev()
            .find(|s| level > s.above_level)
            .map(|s| s.multiplier.min(self.max_speed))
    }

    /// Level after clearing `level`; holds at the cap once reached
    pub fn next_level(&self, level: u32) -> u32 {
        let next = level.saturating_add(1);
        match self.max_level {
            Some(max) => next.min(max.max(level)),
            None => next,
        }
    }

    /// Clamp a requested speed to the allowed range; `None` if not a number
    pub fn clamp_speed(&self, requested: f64) -> Option<f64> {
        if requested.is_finite() {
            Some(requested.clamp(self.min_speed, self.max_speed))
        } else {
            None
        }
    }

    /// Countdown at the start of a time-attack round
    pub fn start_seconds(&self) -> f64 {
        self.time_attack.start_seconds
    }

    /// Countdown after a completed level, capped at the starting value
    pub fn top_up(&self, remaining: f64) -> f64 {
        (remaining + self.time_attack.success_bonus_seconds).min(self.time_attack.start_seconds)
    }
}
