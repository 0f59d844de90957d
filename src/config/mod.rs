// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for the memory game.
//!
//! This module provides data structures for loading, validating and saving
//! the board layout, playback timing, scoring rules, difficulty progression
//! and per-mode rules. Every field has a default, so an empty file is valid.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Root game configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GameConfig {
    /// Board layout
    #[serde(default)]
    pub board: BoardConfig,
    /// Presentation timing
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Score rules
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Sequence growth and speed scaling
    #[serde(default)]
    pub progression: ProgressionConfig,
    /// Mode-specific rules
    #[serde(default)]
    pub modes: ModesConfig,
}

impl GameConfig {
    /// Load a game configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a game configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Reject values that must never reach a round
    pub fn validate(&self) -> Result<()> {
        let size = self.board.size;
        ensure!(
            (2..=16).contains(&size),
            "board.size must be between 2 and 16, got {}",
            size
        );
        if !self.board.tones.is_empty() && self.board.tones.len() != size {
            bail!(
                "board.tones lists {} frequencies for a board of {} slots",
                self.board.tones.len(),
                size
            );
        }
        ensure!(
            self.board.tones.iter().all(|hz| hz.is_finite() && *hz > 0.0),
            "board.tones must be positive frequencies"
        );

        let p = &self.progression;
        ensure!(
            p.min_speed.is_finite() && p.max_speed.is_finite() && p.min_speed > 0.0,
            "progression speed bounds must be positive"
        );
        ensure!(
            p.min_speed <= p.max_speed,
            "progression.min_speed ({}) exceeds max_speed ({})",
            p.min_speed,
            p.max_speed
        );
        ensure!(p.max_level != Some(0), "progression.max_level must be at least 1");
        for step in &p.speed_steps {
            ensure!(
                step.multiplier >= p.min_speed && step.multiplier <= p.max_speed,
                "speed step above level {} has multiplier {} outside [{}, {}]",
                step.above_level,
                step.multiplier,
                p.min_speed,
                p.max_speed
            );
        }

        let s = &self.scoring;
        ensure!(
            s.combo_rate.is_finite() && s.time_bonus_rate.is_finite(),
            "scoring rates must be finite"
        );
        ensure!(
            s.combo_rate >= 0.0 && s.time_bonus_rate >= 0.0,
            "scoring rates must not be negative"
        );

        ensure!(self.modes.survival.lives > 0, "modes.survival.lives must be at least 1");
        let t = &self.modes.time_attack;
        ensure!(
            t.start_seconds.is_finite() && t.success_bonus_seconds.is_finite(),
            "modes.time_attack durations must be finite"
        );
        ensure!(
            t.start_seconds > 0.0,
            "modes.time_attack.start_seconds must be positive"
        );
        ensure!(
            t.success_bonus_seconds >= 0.0,
            "modes.time_attack.success_bonus_seconds must not be negative"
        );
        Ok(())
    }
}

/// Board layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardConfig {
    /// Number of slots
    #[serde(default = "default_board_size")]
    pub size: usize,
    /// Explicit tone frequencies, one per slot (empty = built-in palette)
    #[serde(default)]
    pub tones: Vec<f64>,
}

fn default_board_size() -> usize {
    8
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            size: default_board_size(),
            tones: Vec::new(),
        }
    }
}

/// Presentation timing in milliseconds at speed 1.0
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// Pause before the first presentation of a round
    #[serde(default = "default_lead_in")]
    pub lead_in_ms: u64,
    /// Pause before each slot is highlighted
    #[serde(default = "default_inter_step")]
    pub inter_step_ms: u64,
    /// How long each slot stays highlighted
    #[serde(default = "default_highlight")]
    pub highlight_ms: u64,
    /// Pause between a completed level and the next presentation
    #[serde(default = "default_advance_delay")]
    pub advance_delay_ms: u64,
}

fn default_lead_in() -> u64 {
    1000
}
fn default_inter_step() -> u64 {
    200
}
fn default_highlight() -> u64 {
    500
}
fn default_advance_delay() -> u64 {
    1000
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            lead_in_ms: default_lead_in(),
            inter_step_ms: default_inter_step(),
            highlight_ms: default_highlight(),
            advance_delay_ms: default_advance_delay(),
        }
    }
}

impl PlaybackConfig {
    /// Lead-in as a duration
    pub fn lead_in(&self) -> Duration {
        Duration::from_millis(self.lead_in_ms)
    }

    /// Inter-step pause as a duration
    pub fn inter_step(&self) -> Duration {
        Duration::from_millis(self.inter_step_ms)
    }

    /// Highlight length as a duration
    pub fn highlight(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }

    /// Advance delay as a duration
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}

/// Score rules
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    /// Points per slot of a completed sequence
    #[serde(default = "default_points_per_slot")]
    pub points_per_slot: u32,
    /// Bonus points per combo step (floored)
    #[serde(default = "default_combo_rate")]
    pub combo_rate: f64,
    /// Bonus points per second left on the countdown (floored, time attack only)
    #[serde(default = "default_time_bonus_rate")]
    pub time_bonus_rate: f64,
    /// Streak payout interval (0 disables streak bonuses)
    #[serde(default = "default_streak_interval")]
    pub streak_interval: u32,
    /// Points per completed streak interval
    #[serde(default = "default_streak_bonus")]
    pub streak_bonus: u32,
}

fn default_points_per_slot() -> u32 {
    10
}
fn default_combo_rate() -> f64 {
    0.5
}
fn default_time_bonus_rate() -> f64 {
    0.3
}
fn default_streak_interval() -> u32 {
    3
}
fn default_streak_bonus() -> u32 {
    5
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_per_slot: default_points_per_slot(),
            combo_rate: default_combo_rate(),
            time_bonus_rate: default_time_bonus_rate(),
            streak_interval: default_streak_interval(),
            streak_bonus: default_streak_bonus(),
        }
    }
}

/// How the sequence grows from level to level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Growth {
    /// Start with one slot and append one per level
    Incremental,
    /// Draw a fresh sequence of `level + offset` slots every level
    Fresh {
        #[serde(default = "default_fresh_offset")]
        offset: usize,
    },
}

fn default_fresh_offset() -> usize {
    2
}

impl Default for Growth {
    fn default() -> Self {
        Growth::Incremental
    }
}

/// Speed multiplier applied once the level passes a threshold
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpeedStep {
    /// Applies to levels strictly above this one
    pub above_level: u32,
    /// Playback speed multiplier
    pub multiplier: f64,
}

/// Sequence growth and speed scaling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressionConfig {
    /// Sequence growth rule
    #[serde(default)]
    pub growth: Growth,
    /// Level thresholds for automatic speed-ups
    #[serde(default = "default_speed_steps")]
    pub speed_steps: Vec<SpeedStep>,
    /// Lowest manual speed
    #[serde(default = "default_min_speed")]
    pub min_speed: f64,
    /// Highest speed, manual or automatic
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    /// Level counter stops here; sequences keep growing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_level: Option<u32>,
}

fn default_speed_steps() -> Vec<SpeedStep> {
    vec![
        SpeedStep { above_level: 5, multiplier: 1.2 },
        SpeedStep { above_level: 10, multiplier: 1.5 },
        SpeedStep { above_level: 15, multiplier: 1.8 },
    ]
}
fn default_min_speed() -> f64 {
    0.5
}
fn default_max_speed() -> f64 {
    2.0
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            growth: Growth::default(),
            speed_steps: default_speed_steps(),
            min_speed: default_min_speed(),
            max_speed: default_max_speed(),
            max_level: None,
        }
    }
}

/// What happens after a game over
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    /// Start a fresh round straight away
    #[default]
    Auto,
    /// Stay in game over until the player starts again
    Manual,
}

/// Per-mode rules
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ModesConfig {
    /// Normal mode
    #[serde(default)]
    pub normal: NormalRules,
    /// Time-attack mode
    #[serde(default)]
    pub time_attack: TimeAttackRules,
    /// Survival mode
    #[serde(default)]
    pub survival: SurvivalRules,
}

/// Normal mode rules
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct NormalRules {
    #[serde(default)]
    pub restart: RestartPolicy,
}

/// Time-attack mode rules
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeAttackRules {
    #[serde(default)]
    pub restart: RestartPolicy,
    /// Countdown at the start of a round, and its ceiling
    #[serde(default = "default_start_seconds")]
    pub start_seconds: f64,
    /// Seconds added on every completed level
    #[serde(default = "default_success_bonus")]
    pub success_bonus_seconds: f64,
}

fn default_start_seconds() -> f64 {
    30.0
}
fn default_success_bonus() -> f64 {
    5.0
}

impl Default for TimeAttackRules {
    fn default() -> Self {
        Self {
            restart: RestartPolicy::Auto,
            start_seconds: default_start_seconds(),
            success_bonus_seconds: default_success_bonus(),
        }
    }
}

/// Survival mode rules
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SurvivalRules {
    #[serde(default)]
    pub restart: RestartPolicy,
    /// Lives at the start of a round
    #[serde(default = "default_lives")]
    pub lives: u32,
    /// Present the sequence again after a lost life
    #[serde(default)]
    pub replay_after_miss: bool,
}

fn default_lives() -> u32 {
    3
}

impl Default for SurvivalRules {
    fn default() -> Self {
        Self {
            restart: RestartPolicy::Auto,
            lives: default_lives(),
            replay_after_miss: false,
        }
    }
}
