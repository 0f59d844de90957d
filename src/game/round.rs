// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Round state machine.
//!
//! ```text
//! Idle -> Presenting -> AwaitingInput -> Evaluating -> Presenting ...
//!                            |
//!                          miss -> GameOver (-> Presenting if the mode restarts automatically)
//! ```
//!
//! The round owns all round-scoped state. Delays are never taken here;
//! instead the round hands out one [`Pending`] transition at a time and
//! remembers its ticket. A wake-up carrying any other ticket is stale and
//! changes nothing.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info, warn};

use super::{
    GameEvent, GameMode, MatchResult, Pending, Progress, Progression, RoundSnapshot, ScoreCard,
    ScoringEngine, Sequence, SequenceGenerator, Slot, Status, Step, Ticket, TicketCounter,
};
use crate::config::{GameConfig, ModesConfig, PlaybackConfig, RestartPolicy};
use crate::store::Preferences;

/// One play session: the current round plus session-wide counters
#[derive(Debug)]
pub struct Round<R = StdRng> {
    mode: GameMode,
    status: Status,
    sequence: Sequence,
    progress: Progress,
    level: u32,
    card: ScoreCard,
    high_score: u32,
    lives: u32,
    time_remaining: f64,
    speed: f64,
    sound_enabled: bool,

    tickets: TicketCounter,
    waiting_on: Option<Ticket>,

    generator: SequenceGenerator,
    scoring: ScoringEngine,
    progression: Progression,
    playback: PlaybackConfig,
    modes: ModesConfig,
    rng: R,
}

impl<R: Rng> Round<R> {
    /// Create an idle round.
    ///
    /// `prefs` carries the high score and sound preference read at startup.
    pub fn new(config: &GameConfig, rng: R, prefs: Preferences) -> Self {
        Self {
            mode: GameMode::default(),
            status: Status::Idle,
            sequence: Sequence::default(),
            progress: Progress::new(),
            level: 1,
            card: ScoreCard::default(),
            high_score: prefs.high_score,
            lives: config.modes.survival.lives,
            time_remaining: config.modes.time_attack.start_seconds,
            speed: 1.0,
            sound_enabled: prefs.sound_enabled,
            tickets: TicketCounter::default(),
            waiting_on: None,
            generator: SequenceGenerator::new(config.board.size, config.progression.growth),
            scoring: ScoringEngine::new(config.scoring),
            progression: Progression::new(&config.progression, config.modes.time_attack),
            playback: config.playback,
            modes: config.modes,
            rng,
        }
    }

    /// Start a fresh round in `mode`, abandoning any round in progress
    pub fn start_game(&mut self, mode: GameMode) -> Step {
        let mut step = Step::none();
        self.begin(mode, &mut step);
        step
    }

    /// The presentation scheduled under `ticket` has finished
    pub fn presentation_finished(&mut self, ticket: Ticket) -> Step {
        if !self.redeem(ticket, Status::Presenting) {
            return Step::none();
        }

        let mut step = Step::none();
        if self.mode == GameMode::TimeAttack && self.time_remaining <= 0.0 {
            // Countdown ran out mid-presentation; apply it now
            self.expire(&mut step);
            return step;
        }

        self.status = Status::AwaitingInput;
        debug!(len = self.sequence.len(), "awaiting input");
        step
    }

    /// The inter-level pause scheduled under `ticket` has elapsed
    pub fn advance_due(&mut self, ticket: Ticket) -> Step {
        if !self.redeem(ticket, Status::Evaluating) {
            return Step::none();
        }

        let mut step = Step::none();
        self.sequence = self.generator.extend(&self.sequence, self.level, &mut self.rng);
        if let Some(speed) = self.progression.speed_for_level(self.level) {
            if speed != self.speed {
                self.speed = speed;
                step.push(GameEvent::SpeedChanged(speed));
            }
        }

        debug!(level = self.level, len = self.sequence.len(), "next level");
        self.present(Duration::ZERO, &mut step);
        step
    }

    /// Player selected `slot`
    pub fn select_slot(&mut self, slot: Slot) -> Step {
        if self.status != Status::AwaitingInput {
            debug!(slot, status = ?self.status, "selection ignored");
            return Step::none();
        }
        if slot >= self.generator.board_size() {
            warn!(slot, board = self.generator.board_size(), "selection outside the board");
            return Step::none();
        }

        let mut step = Step::none();
        match self.progress.select(&self.sequence, slot) {
            MatchResult::Partial => step.push(GameEvent::PlayerTone(slot)),
            MatchResult::Complete => {
                step.push(GameEvent::PlayerTone(slot));
                self.complete(&mut step);
            }
            MatchResult::Mismatch { expected } => {
                debug!(slot, expected, position = self.progress.len(), "mismatch");
                self.miss(&mut step);
            }
        }
        step
    }

    /// Advance the time-attack countdown by `elapsed`.
    ///
    /// Only runs while a time-attack round is active. Expiry outside
    /// `AwaitingInput` is held until the presentation in flight finishes.
    pub fn countdown_tick(&mut self, elapsed: Duration) -> Step {
        if self.mode != GameMode::TimeAttack || !self.status.is_active() {
            return Step::none();
        }

        self.time_remaining = (self.time_remaining - elapsed.as_secs_f64()).max(0.0);
        if self.time_remaining > 0.0 {
            return Step::none();
        }

        let mut step = Step::none();
        if self.status == Status::AwaitingInput {
            self.expire(&mut step);
        } else {
            debug!(status = ?self.status, "countdown expired, deferred");
        }
        step
    }

    /// Set the playback speed; only effective while a round is active
    pub fn set_speed(&mut self, requested: f64) -> Step {
        if !self.status.is_active() {
            debug!(requested, "speed change ignored outside a round");
            return Step::none();
        }

        match self.progression.clamp_speed(requested) {
            Some(speed) => {
                self.speed = speed;
                Step {
                    events: vec![GameEvent::SpeedChanged(speed)],
                    schedule: None,
                }
            }
            None => {
                warn!(requested, "rejected speed");
                Step::none()
            }
        }
    }

    /// Flip the sound preference
    pub fn toggle_sound(&mut self) -> Step {
        self.sound_enabled = !self.sound_enabled;
        Step {
            events: vec![GameEvent::SoundToggled(self.sound_enabled)],
            schedule: None,
        }
    }

    /// Display view of the round
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            mode: self.mode,
            status: self.status,
            level: self.level,
            score: self.card.score,
            high_score: self.high_score,
            combo: self.card.combo,
            best_combo: self.card.best_combo,
            streak: self.card.streak,
            lives: (self.mode == GameMode::Survival).then_some(self.lives),
            time_remaining: (self.mode == GameMode::TimeAttack).then_some(self.time_remaining),
            speed: self.speed,
            sequence_len: self.sequence.len(),
            progress_len: self.progress.len(),
            sound_enabled: self.sound_enabled,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Slots confirmed so far in the current attempt
    pub fn progress(&self) -> &[Slot] {
        self.progress.as_slice()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.card.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn combo(&self) -> u32 {
        self.card.combo
    }

    pub fn best_combo(&self) -> u32 {
        self.card.best_combo
    }

    pub fn streak(&self) -> u32 {
        self.card.streak
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn time_remaining(&self) -> f64 {
        self.time_remaining
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn board_size(&self) -> usize {
        self.generator.board_size()
    }

    /// Ticket of the transition the round is waiting for, if any
    pub fn waiting_on(&self) -> Option<Ticket> {
        self.waiting_on
    }

    fn begin(&mut self, mode: GameMode, step: &mut Step) {
        self.mode = mode;
        self.card.reset_round();
        self.level = 1;
        self.lives = self.modes.survival.lives;
        self.time_remaining = self.progression.start_seconds();
        self.speed = 1.0;
        self.progress.clear();
        self.sequence = self.generator.first(&mut self.rng);

        info!(mode = %mode, "round started");
        step.push(GameEvent::RoundStarted { mode });
        self.present(self.playback.lead_in(), step);
    }

    /// Enter `Presenting` and schedule the current sequence
    fn present(&mut self, lead_in: Duration, step: &mut Step) {
        self.status = Status::Presenting;
        self.progress.clear();

        let ticket = self.tickets.issue();
        self.waiting_on = Some(ticket);
        step.schedule = Some(Pending::Present {
            ticket,
            lead_in: self.scaled(lead_in),
            sequence: self.sequence.clone(),
            speed: self.speed,
        });
    }

    /// Accept a wake-up only if it is the one we are waiting for
    fn redeem(&mut self, ticket: Ticket, expected: Status) -> bool {
        if self.waiting_on != Some(ticket) || self.status != expected {
            debug!(ticket = ticket.value(), status = ?self.status, "stale wake-up ignored");
            return false;
        }
        self.waiting_on = None;
        true
    }

    fn complete(&mut self, step: &mut Step) {
        let time_left = (self.mode == GameMode::TimeAttack).then_some(self.time_remaining);
        let award = self.scoring.complete(&mut self.card, self.sequence.len(), time_left);

        info!(level = self.level, points = award.total(), score = self.card.score, "level complete");
        step.push(GameEvent::LevelComplete { level: self.level, award });
        if award.streak_bonus > 0 {
            step.push(GameEvent::StreakBonus {
                streak: self.card.streak,
                points: award.streak_bonus,
            });
        }
        if self.card.combo > 1 {
            step.push(GameEvent::ComboReached(self.card.combo));
        }

        self.level = self.progression.next_level(self.level);
        if self.mode == GameMode::TimeAttack {
            self.time_remaining = self.progression.top_up(self.time_remaining);
        }

        self.status = Status::Evaluating;
        let ticket = self.tickets.issue();
        self.waiting_on = Some(ticket);
        step.schedule = Some(Pending::Advance {
            ticket,
            delay: self.scaled(self.playback.advance_delay()),
        });
    }

    fn miss(&mut self, step: &mut Step) {
        self.card.record_miss();

        if self.mode != GameMode::Survival {
            self.game_over(step);
            return;
        }

        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.game_over(step);
            return;
        }

        info!(lives = self.lives, "life lost");
        step.push(GameEvent::LifeLost { lives_left: self.lives });
        self.progress.clear();
        if self.modes.survival.replay_after_miss {
            self.present(Duration::ZERO, step);
        } else {
            self.status = Status::AwaitingInput;
        }
    }

    fn expire(&mut self, step: &mut Step) {
        info!("countdown expired");
        step.push(GameEvent::TimeExpired);
        self.card.record_miss();
        self.game_over(step);
    }

    fn game_over(&mut self, step: &mut Step) {
        let final_score = self.card.score;
        let new_high_score = final_score > self.high_score;

        self.status = Status::GameOver;
        self.waiting_on = None;
        self.progress.clear();

        info!(mode = %self.mode, final_score, level = self.level, "game over");
        step.push(GameEvent::GameOver {
            mode: self.mode,
            final_score,
            level: self.level,
            best_combo: self.card.best_combo,
            new_high_score,
        });
        if new_high_score {
            self.high_score = final_score;
            step.push(GameEvent::NewHighScore(final_score));
        }

        if self.restart_policy() == RestartPolicy::Auto {
            self.begin(self.mode, step);
        }
    }

    fn restart_policy(&self) -> RestartPolicy {
        match self.mode {
            GameMode::Normal => self.modes.normal.restart,
            GameMode::TimeAttack => self.modes.time_attack.restart,
            GameMode::Survival => self.modes.survival.restart,
        }
    }

    fn scaled(&self, d: Duration) -> Duration {
        d.div_f64(self.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn round_with(config: GameConfig) -> Round {
        Round::new(&config, StdRng::seed_from_u64(5), Preferences::default())
    }

    fn round() -> Round {
        round_with(GameConfig::default())
    }

    /// Start `mode`, replace the sequence and finish the presentation
    fn awaiting(round: &mut Round, mode: GameMode, slots: Vec<Slot>) {
        let step = round.start_game(mode);
        round.sequence = Sequence::new(slots);
        let ticket = step.schedule.unwrap().ticket();
        round.presentation_finished(ticket);
        assert_eq!(round.status(), Status::AwaitingInput);
    }

    fn advance_ticket(step: &Step) -> Ticket {
        match &step.schedule {
            Some(Pending::Advance { ticket, .. }) => *ticket,
            other => panic!("expected advance, got {:?}", other),
        }
    }

    #[test]
    fn test_new_round_is_idle() {
        let round = round();
        assert_eq!(round.status(), Status::Idle);
        assert!(round.sequence().is_empty());
        assert_eq!(round.snapshot().lives, None);
    }

    #[test]
    fn test_start_schedules_presentation() {
        let mut round = round();
        let step = round.start_game(GameMode::Normal);

        assert_eq!(step.events, vec![GameEvent::RoundStarted { mode: GameMode::Normal }]);
        match step.schedule {
            Some(Pending::Present { lead_in, ref sequence, speed, .. }) => {
                assert_eq!(lead_in, Duration::from_millis(1000));
                assert_eq!(sequence.len(), 1);
                assert_eq!(speed, 1.0);
            }
            ref other => panic!("expected presentation, got {:?}", other),
        }
        assert_eq!(round.status(), Status::Presenting);
    }

    #[test]
    fn test_complete_first_level() {
        let mut round = round();
        awaiting(&mut round, GameMode::Normal, vec![3]);

        let step = round.select_slot(3);

        assert_eq!(step.events[0], GameEvent::PlayerTone(3));
        assert!(matches!(step.events[1], GameEvent::LevelComplete { level: 1, .. }));
        assert_eq!(round.score(), 10);
        assert_eq!(round.level(), 2);
        assert_eq!(round.combo(), 1);
        assert_eq!(round.status(), Status::Evaluating);

        let ticket = advance_ticket(&step);
        let next = round.advance_due(ticket);
        assert_eq!(round.sequence().len(), 2);
        assert_eq!(round.sequence().get(0), Some(3));
        assert!(matches!(next.schedule, Some(Pending::Present { .. })));
        assert_eq!(round.status(), Status::Presenting);
    }

    #[test]
    fn test_normal_mismatch_restarts() {
        let mut round = round();
        awaiting(&mut round, GameMode::Normal, vec![3, 5]);
        round.level = 2;
        round.card.score = 10;

        assert_eq!(round.select_slot(3).events, vec![GameEvent::PlayerTone(3)]);
        let step = round.select_slot(1);

        assert_eq!(
            step.events[0],
            GameEvent::GameOver {
                mode: GameMode::Normal,
                final_score: 10,
                level: 2,
                best_combo: 0,
                new_high_score: true,
            }
        );
        assert_eq!(step.events[1], GameEvent::NewHighScore(10));
        assert_eq!(step.events[2], GameEvent::RoundStarted { mode: GameMode::Normal });
        assert_eq!(round.high_score(), 10);
        assert_eq!(round.level(), 1);
        assert_eq!(round.score(), 0);
        assert_eq!(round.sequence().len(), 1);
        assert_eq!(round.status(), Status::Presenting);
    }

    #[test]
    fn test_manual_restart_holds_game_over() {
        let mut config = GameConfig::default();
        config.modes.normal.restart = RestartPolicy::Manual;
        let mut round = round_with(config);
        awaiting(&mut round, GameMode::Normal, vec![4]);
        round.card.score = 40;

        let step = round.select_slot(0);
        assert!(step.schedule.is_none());
        assert_eq!(round.status(), Status::GameOver);
        assert_eq!(round.score(), 40);

        assert!(round.select_slot(4).is_empty());
        round.start_game(GameMode::Normal);
        assert_eq!(round.status(), Status::Presenting);
    }

    #[test]
    fn test_no_high_score_when_not_beaten() {
        let mut round = Round::new(
            &GameConfig::default(),
            StdRng::seed_from_u64(1),
            Preferences { high_score: 500, sound_enabled: true },
        );
        awaiting(&mut round, GameMode::Normal, vec![2]);
        round.card.score = 20;

        let step = round.select_slot(1);
        assert!(!step.events.iter().any(|e| matches!(e, GameEvent::NewHighScore(_))));
        assert_eq!(round.high_score(), 500);
    }

    #[test]
    fn test_survival_loses_life() {
        let mut round = round();
        awaiting(&mut round, GameMode::Survival, vec![3, 5]);
        assert_eq!(round.lives(), 3);

        round.select_slot(3);
        let step = round.select_slot(2);

        assert_eq!(step.events, vec![GameEvent::LifeLost { lives_left: 2 }]);
        assert!(step.schedule.is_none());
        assert_eq!(round.lives(), 2);
        assert!(round.progress().is_empty());
        assert_eq!(round.sequence().as_slice(), &[3, 5]);
        assert_eq!(round.status(), Status::AwaitingInput);

        // Same sequence can be retried
        round.select_slot(3);
        round.select_slot(5);
        assert_eq!(round.status(), Status::Evaluating);
    }

    #[test]
    fn test_survival_last_life_ends_round() {
        let mut round = round();
        awaiting(&mut round, GameMode::Survival, vec![1]);

        round.select_slot(0);
        round.select_slot(0);
        let step = round.select_slot(0);

        assert!(matches!(step.events[0], GameEvent::GameOver { mode: GameMode::Survival, .. }));
        assert_eq!(round.lives(), 3);
        assert_eq!(round.status(), Status::Presenting);
    }

    #[test]
    fn test_survival_replay_after_miss() {
        let mut config = GameConfig::default();
        config.modes.survival.replay_after_miss = true;
        let mut round = round_with(config);
        awaiting(&mut round, GameMode::Survival, vec![6, 6]);

        let step = round.select_slot(1);
        match step.schedule {
            Some(Pending::Present { ref sequence, .. }) => assert_eq!(sequence.as_slice(), &[6, 6]),
            ref other => panic!("expected replay, got {:?}", other),
        }
        assert_eq!(round.status(), Status::Presenting);
    }

    #[test]
    fn test_time_attack_expiry_restarts() {
        let mut round = round();
        awaiting(&mut round, GameMode::TimeAttack, vec![2, 2]);

        assert!(round.countdown_tick(Duration::from_secs(29)).is_empty());
        let step = round.countdown_tick(Duration::from_secs(1));

        assert_eq!(step.events[0], GameEvent::TimeExpired);
        assert!(matches!(step.events[1], GameEvent::GameOver { .. }));
        assert_eq!(round.time_remaining(), 30.0);
        assert_eq!(round.status(), Status::Presenting);
    }

    #[test]
    fn test_time_attack_expiry_deferred_during_presentation() {
        let mut round = round();
        let step = round.start_game(GameMode::TimeAttack);
        let ticket = step.schedule.unwrap().ticket();

        assert!(round.countdown_tick(Duration::from_secs(45)).is_empty());
        assert_eq!(round.status(), Status::Presenting);
        assert_eq!(round.time_remaining(), 0.0);

        let step = round.presentation_finished(ticket);
        assert_eq!(step.events[0], GameEvent::TimeExpired);
        assert_eq!(round.time_remaining(), 30.0);
    }

    #[test]
    fn test_time_attack_bonus_and_top_up() {
        let mut round = round();
        awaiting(&mut round, GameMode::TimeAttack, vec![4]);
        round.countdown_tick(Duration::from_secs(10));

        let step = round.select_slot(4);
        match step.events[1] {
            GameEvent::LevelComplete { award, .. } => {
                assert_eq!(award.base, 10);
                assert_eq!(award.time_bonus, 6);
            }
            ref other => panic!("unexpected {:?}", other),
        }
        assert_eq!(round.time_remaining(), 25.0);
    }

    #[test]
    fn test_countdown_ignored_outside_time_attack() {
        let mut round = round();
        awaiting(&mut round, GameMode::Normal, vec![1]);
        assert!(round.countdown_tick(Duration::from_secs(60)).is_empty());
        assert_eq!(round.status(), Status::AwaitingInput);
    }

    #[test]
    fn test_input_ignored_unless_awaiting() {
        let mut round = round();
        assert!(round.select_slot(0).is_empty());

        round.start_game(GameMode::Normal);
        let before = round.snapshot();
        for slot in 0..8 {
            assert!(round.select_slot(slot).is_empty());
        }
        assert_eq!(round.snapshot(), before);
    }

    #[test]
    fn test_out_of_range_slot_ignored() {
        let mut round = round();
        awaiting(&mut round, GameMode::Normal, vec![1, 2]);
        assert!(round.select_slot(8).is_empty());
        assert_eq!(round.status(), Status::AwaitingInput);
    }

    #[test]
    fn test_stale_tickets_ignored() {
        let mut round = round();
        let first = round.start_game(GameMode::Normal).schedule.unwrap().ticket();
        let second = round.start_game(GameMode::Normal).schedule.unwrap().ticket();

        assert!(round.presentation_finished(first).is_empty());
        assert_eq!(round.status(), Status::Presenting);
        round.presentation_finished(second);
        assert_eq!(round.status(), Status::AwaitingInput);

        // Redeeming twice does nothing
        round.presentation_finished(second);
        assert_eq!(round.status(), Status::AwaitingInput);
    }

    #[test]
    fn test_advance_after_restart_ignored() {
        let mut round = round();
        awaiting(&mut round, GameMode::Normal, vec![7]);
        let ticket = advance_ticket(&round.select_slot(7));

        round.start_game(GameMode::Normal);
        let restarted = round.sequence().clone();
        assert!(round.advance_due(ticket).is_empty());
        assert_eq!(round.sequence(), &restarted);
        assert_eq!(round.level(), 1);
        assert_eq!(round.score(), 0);
    }

    #[test]
    fn test_speed_steps_applied_on_advance() {
        let mut round = round();
        awaiting(&mut round, GameMode::Normal, vec![0]);
        round.level = 5;

        let ticket = advance_ticket(&round.select_slot(0));
        let step = round.advance_due(ticket);

        assert_eq!(round.level(), 6);
        assert_eq!(round.speed(), 1.2);
        assert_eq!(step.events, vec![GameEvent::SpeedChanged(1.2)]);
        match step.schedule {
            Some(Pending::Present { speed, .. }) => assert_eq!(speed, 1.2),
            ref other => panic!("expected presentation, got {:?}", other),
        }
    }

    #[test]
    fn test_advance_delay_scales_with_speed() {
        let mut round = round();
        awaiting(&mut round, GameMode::Normal, vec![0]);
        round.set_speed(2.0);

        match round.select_slot(0).schedule {
            Some(Pending::Advance { delay, .. }) => assert_eq!(delay, Duration::from_millis(500)),
            other => panic!("expected advance, got {:?}", other),
        }
    }

    #[test]
    fn test_set_speed_bounds() {
        let mut round = round();
        assert!(round.set_speed(1.5).is_empty());
        assert_eq!(round.speed(), 1.0);

        round.start_game(GameMode::Normal);
        assert_eq!(round.set_speed(3.0).events, vec![GameEvent::SpeedChanged(2.0)]);
        assert_eq!(round.set_speed(0.1).events, vec![GameEvent::SpeedChanged(0.5)]);
        assert!(round.set_speed(f64::INFINITY).is_empty());
        assert_eq!(round.speed(), 0.5);
    }

    #[test]
    fn test_toggle_sound() {
        let mut round = round();
        assert!(round.sound_enabled());
        assert_eq!(round.toggle_sound().events, vec![GameEvent::SoundToggled(false)]);
        assert_eq!(round.toggle_sound().events, vec![GameEvent::SoundToggled(true)]);
    }

    #[test]
    fn test_combo_and_streak_events() {
        let mut round = round();
        awaiting(&mut round, GameMode::Normal, vec![1]);

        let mut all = Vec::new();
        for _ in 0..3 {
            let slot = round.sequence().get(round.progress().len()).unwrap();
            let mut step = round.select_slot(slot);
            while round.status() == Status::AwaitingInput {
                let slot = round.sequence().get(round.progress().len()).unwrap();
                step = round.select_slot(slot);
            }
            all.extend(step.events.clone());
            let ticket = advance_ticket(&step);
            let present = round.advance_due(ticket).schedule.unwrap().ticket();
            round.presentation_finished(present);
        }

        assert!(all.contains(&GameEvent::ComboReached(2)));
        assert!(all.contains(&GameEvent::ComboReached(3)));
        assert!(all.contains(&GameEvent::StreakBonus { streak: 3, points: 5 }));
        assert_eq!(round.best_combo(), 3);
    }

    #[test]
    fn test_best_combo_kept_across_rounds() {
        let mut round = round();
        awaiting(&mut round, GameMode::Normal, vec![2]);
        let ticket = advance_ticket(&round.select_slot(2));
        let present = round.advance_due(ticket).schedule.unwrap().ticket();
        round.presentation_finished(present);

        let wrong = (round.sequence().get(0).unwrap() + 1) % 8;
        round.select_slot(wrong);
        assert_eq!(round.combo(), 0);
        assert_eq!(round.best_combo(), 1);
    }

    #[test]
    fn test_level_holds_at_cap_while_sequence_grows() {
        let mut config = GameConfig::default();
        config.progression.max_level = Some(2);
        let mut round = round_with(config);
        awaiting(&mut round, GameMode::Normal, vec![3]);

        for expected_len in 2..=4 {
            let mut step = Step::none();
            while round.status() == Status::AwaitingInput {
                let slot = round.sequence().get(round.progress().len()).unwrap();
                step = round.select_slot(slot);
            }
            let present = round.advance_due(advance_ticket(&step)).schedule.unwrap().ticket();
            round.presentation_finished(present);

            assert_eq!(round.level(), 2);
            assert_eq!(round.sequence().len(), expected_len);
        }
    }
}
