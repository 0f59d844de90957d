// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Game session driver.
//!
//! Runs the round on a single tokio task. Three independent streams are
//! multiplexed with `select!`:
//! - control messages from the player (start, select, sound, speed)
//! - the one pending transition (a presentation or an inter-level pause)
//! - the one-second time-attack countdown
//!
//! Replacing the pending future drops the old one, which cancels its
//! timers; the round's ticket check catches anything that slips through.
//! Side effects (tones, persistence) happen here and never feed errors
//! back into the round.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::audio::{ToneOutput, ToneSink};
use crate::config::GameConfig;
use crate::game::{GameEvent, GameMode, Pending, Round, RoundSnapshot, Slot, Step, Ticket};
use crate::playback::{Cue, PlaybackScheduler};
use crate::store::{load_preferences, ScoreStore};
use crate::tones::ToneRegistry;

/// Countdown resolution
const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// Control surface messages
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// Start (or restart) a round in a mode
    Start(GameMode),
    /// Player selected a slot
    Select(Slot),
    /// Flip the sound preference
    ToggleSound,
    /// Set the playback speed multiplier
    SetSpeed(f64),
    /// Stop the session
    Shutdown,
}

/// Everything a presenter needs to follow the game
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Presentation cue
    Cue(Cue),
    /// Engine notification
    Game(GameEvent),
    /// Round state after every change
    State(RoundSnapshot),
}

/// The session task has stopped
#[derive(Debug, Clone, Copy, Error)]
#[error("game session has shut down")]
pub struct SessionClosed;

/// Cloneable sender for control messages
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Control>,
}

impl SessionHandle {
    /// Wrap a control sender
    pub fn new(tx: mpsc::Sender<Control>) -> Self {
        Self { tx }
    }

    pub async fn start_game(&self, mode: GameMode) -> Result<(), SessionClosed> {
        self.send(Control::Start(mode)).await
    }

    pub async fn select_slot(&self, slot: Slot) -> Result<(), SessionClosed> {
        self.send(Control::Select(slot)).await
    }

    pub async fn toggle_sound(&self) -> Result<(), SessionClosed> {
        self.send(Control::ToggleSound).await
    }

    pub async fn set_speed(&self, multiplier: f64) -> Result<(), SessionClosed> {
        self.send(Control::SetSpeed(multiplier)).await
    }

    pub async fn shutdown(&self) -> Result<(), SessionClosed> {
        self.send(Control::Shutdown).await
    }

    /// Send any control message
    pub async fn send(&self, control: Control) -> Result<(), SessionClosed> {
        self.tx.send(control).await.map_err(|_| SessionClosed)
    }
}

enum Wakeup {
    PresentationDone(Ticket),
    AdvanceDue(Ticket),
}

type PendingFuture = Pin<Box<dyn Future<Output = Wakeup> + Send>>;

/// Owns a round and drives it in time
pub struct Session<R = StdRng> {
    round: Round<R>,
    scheduler: PlaybackScheduler,
    tones: ToneOutput,
    store: Box<dyn ScoreStore>,
    events: mpsc::UnboundedSender<SessionEvent>,
    pending: Option<PendingFuture>,
}

impl<R: Rng + Send + 'static> Session<R> {
    /// Create a session and the stream of events it publishes.
    ///
    /// High score and sound preference are read from `store` here, once.
    pub fn new(
        config: &GameConfig,
        rng: R,
        sink: Arc<dyn ToneSink>,
        store: Box<dyn ScoreStore>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let prefs = load_preferences(store.as_ref());
        let registry = ToneRegistry::from_config(&config.board);
        let (events, rx) = mpsc::unbounded_channel();

        let session = Self {
            round: Round::new(config, rng, prefs),
            scheduler: PlaybackScheduler::new(&config.playback),
            tones: ToneOutput::new(registry, sink, prefs.sound_enabled),
            store,
            events,
            pending: None,
        };
        (session, rx)
    }

    /// Run the session on its own task
    pub fn spawn(self) -> (SessionHandle, JoinHandle<RoundSnapshot>) {
        let (tx, rx) = mpsc::channel(64);
        let task = tokio::spawn(self.run(rx));
        (SessionHandle::new(tx), task)
    }

    /// Current round
    pub fn round(&self) -> &Round<R> {
        &self.round
    }

    /// Drive the round until `Shutdown` or until every control sender is gone.
    ///
    /// Returns the final state of the round.
    pub async fn run(mut self, mut controls: mpsc::Receiver<Control>) -> RoundSnapshot {
        let mut countdown = interval_at(Instant::now() + COUNTDOWN_PERIOD, COUNTDOWN_PERIOD);
        countdown.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.publish(SessionEvent::State(self.round.snapshot()));

        loop {
            let counting = self.countdown_running();
            let waiting = self.pending.is_some();

            let restarted = tokio::select! {
                control = controls.recv() => match control {
                    Some(Control::Shutdown) | None => break,
                    Some(control) => self.handle(control),
                },
                wake = next_wakeup(&mut self.pending), if waiting => {
                    self.pending = None;
                    let step = match wake {
                        Wakeup::PresentationDone(ticket) => self.round.presentation_finished(ticket),
                        Wakeup::AdvanceDue(ticket) => self.round.advance_due(ticket),
                    };
                    self.apply(step)
                },
                _ = countdown.tick(), if counting => {
                    let step = self.round.countdown_tick(COUNTDOWN_PERIOD);
                    self.apply(step)
                },
            };

            if restarted {
                countdown.reset();
            }
        }

        debug!("session stopped");
        self.round.snapshot()
    }

    /// Apply one control message; returns true if a new round began
    pub fn handle(&mut self, control: Control) -> bool {
        let step = match control {
            Control::Start(mode) => self.round.start_game(mode),
            Control::Select(slot) => self.round.select_slot(slot),
            Control::ToggleSound => self.round.toggle_sound(),
            Control::SetSpeed(multiplier) => self.round.set_speed(multiplier),
            Control::Shutdown => Step::none(),
        };
        self.apply(step)
    }

    fn countdown_running(&self) -> bool {
        self.round.mode() == GameMode::TimeAttack && self.round.status().is_active()
    }

    /// Carry out a step's side effects and schedule its transition
    fn apply(&mut self, step: Step) -> bool {
        let mut restarted = false;

        for event in step.events {
            match &event {
                GameEvent::PlayerTone(slot) => self.tones.emit(*slot),
                GameEvent::NewHighScore(score) => {
                    if let Err(e) = self.store.write_high_score(*score) {
                        warn!(score, error = %e, "failed to persist high score");
                    }
                }
                GameEvent::SoundToggled(enabled) => {
                    self.tones.set_enabled(*enabled);
                    if let Err(e) = self.store.write_sound_enabled(*enabled) {
                        warn!(error = %e, "failed to persist sound preference");
                    }
                }
                GameEvent::RoundStarted { .. } => restarted = true,
                _ => {}
            }
            self.publish(SessionEvent::Game(event));
        }

        if let Some(pending) = step.schedule {
            debug!(ticket = pending.ticket().value(), "scheduling transition");
            self.pending = Some(self.prepare(pending));
        }

        self.publish(SessionEvent::State(self.round.snapshot()));
        restarted
    }

    /// Turn a pending transition into a future that sleeps, presents if
    /// needed and reports its ticket
    fn prepare(&self, pending: Pending) -> PendingFuture {
        match pending {
            Pending::Present { ticket, lead_in, sequence, speed } => {
                let scheduler = self.scheduler;
                let tones = self.tones.clone();
                let events = self.events.clone();
                Box::pin(async move {
                    sleep(lead_in).await;
                    scheduler
                        .present(&sequence, speed, |cue| {
                            if let Cue::Activate(slot) = cue {
                                tones.emit(slot);
                            }
                            let _ = events.send(SessionEvent::Cue(cue));
                        })
                        .await;
                    Wakeup::PresentationDone(ticket)
                })
            }
            Pending::Advance { ticket, delay } => Box::pin(async move {
                sleep(delay).await;
                Wakeup::AdvanceDue(ticket)
            }),
        }
    }

    fn publish(&self, event: SessionEvent) {
        // Nobody listening is fine; the game runs headless
        let _ = self.events.send(event);
    }
}

async fn next_wakeup(pending: &mut Option<PendingFuture>) -> Wakeup {
    match pending {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}
