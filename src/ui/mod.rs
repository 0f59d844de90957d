// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI for the memory game.
//!
//! Provides a ratatui-based terminal interface with the tile board, a
//! score panel and a feed of game notifications.

mod bell;
mod board;
mod notifications;
mod scoreboard;

pub use bell::BellSink;
pub use board::BoardWidget;
pub use notifications::NotificationsWidget;
pub use scoreboard::ScoreboardWidget;

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use soundmem::game::{GameEvent, GameMode, RoundSnapshot, Slot, Status};
use soundmem::playback::Cue;
use soundmem::session::{Control, SessionEvent};
use soundmem::tones::ToneRegistry;

/// How long a tile stays lit after the player presses it
const PRESS_FLASH: Duration = Duration::from_millis(300);

/// Speed change per key press
const SPEED_STEP: f64 = 0.25;

/// UI state fed by the session's event stream
#[derive(Debug, Clone)]
pub struct UiState {
    /// Latest round state
    pub round: Option<RoundSnapshot>,
    /// One entry per board slot
    pub tiles: Vec<TileState>,
    /// Recent notifications
    pub notifications: NotificationLog,
    /// Help text visible
    pub show_help: bool,
}

impl UiState {
    /// Create state for a board with the given tones
    pub fn new(registry: &ToneRegistry) -> Self {
        Self {
            round: None,
            tiles: registry.iter().map(|t| TileState::new(t.name.clone())).collect(),
            notifications: NotificationLog::new(),
            show_help: false,
        }
    }

    /// Fold one session event into the display state
    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Cue(Cue::Activate(slot)) => self.set_lit(*slot, true),
            SessionEvent::Cue(Cue::Deactivate(slot)) => self.set_lit(*slot, false),
            SessionEvent::Game(game) => {
                match game {
                    GameEvent::PlayerTone(slot) => {
                        if let Some(tile) = self.tiles.get_mut(*slot) {
                            tile.flash_until = Some(Instant::now() + PRESS_FLASH);
                        }
                    }
                    // A cancelled presentation may leave a tile on
                    GameEvent::RoundStarted { .. } => self.tiles.iter_mut().for_each(TileState::clear),
                    _ => {}
                }
                if let Some(text) = describe(game) {
                    self.notifications.add(text);
                }
            }
            SessionEvent::State(snapshot) => self.round = Some(snapshot.clone()),
        }
    }

    fn set_lit(&mut self, slot: Slot, lit: bool) {
        if let Some(tile) = self.tiles.get_mut(slot) {
            tile.lit = lit;
        }
    }

    /// Current mode, defaulting to normal before the first snapshot
    pub fn mode(&self) -> GameMode {
        self.round.as_ref().map(|r| r.mode).unwrap_or_default()
    }

    /// Current speed multiplier
    pub fn speed(&self) -> f64 {
        self.round.as_ref().map(|r| r.speed).unwrap_or(1.0)
    }
}

/// Display state of one tile
#[derive(Debug, Clone, PartialEq)]
pub struct TileState {
    /// Tone name shown on the tile
    pub name: String,
    /// Lit by the presentation
    pub lit: bool,
    /// Lit by a player press until this time
    pub flash_until: Option<Instant>,
}

impl TileState {
    fn new(name: String) -> Self {
        Self { name, lit: false, flash_until: None }
    }

    /// Whether the tile should be drawn lit at `now`
    pub fn is_lit(&self, now: Instant) -> bool {
        self.lit || self.flash_until.is_some_and(|until| now < until)
    }

    fn clear(&mut self) {
        self.lit = false;
        self.flash_until = None;
    }
}

/// Bounded list of recent notifications
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    /// Oldest first
    pub messages: Vec<Notification>,
    /// Maximum messages to keep
    pub max_messages: usize,
}

impl NotificationLog {
    /// Create with default capacity
    pub fn new() -> Self {
        Self {
            max_messages: 10,
            ..Default::default()
        }
    }

    /// Add a message, dropping the oldest if full
    pub fn add(&mut self, text: impl Into<String>) {
        self.messages.push(Notification {
            text: text.into(),
            time: Instant::now(),
        });
        if self.messages.len() > self.max_messages {
            self.messages.remove(0);
        }
    }

    /// Most recent message
    pub fn latest(&self) -> Option<&Notification> {
        self.messages.last()
    }
}

/// One notification line
#[derive(Debug, Clone)]
pub struct Notification {
    pub text: String,
    pub time: Instant,
}

/// Notification text for a game event, if it deserves one
fn describe(event: &GameEvent) -> Option<String> {
    let text = match event {
        GameEvent::RoundStarted { mode } => format!("{} round started", mode),
        GameEvent::PlayerTone(_) => return None,
        GameEvent::LevelComplete { level, award } => {
            format!("Level {} complete: +{}", level, award.total())
        }
        GameEvent::ComboReached(combo) => format!("Combo x{}", combo),
        GameEvent::StreakBonus { streak, points } => format!("Streak of {}: +{}", streak, points),
        GameEvent::LifeLost { lives_left } => match lives_left {
            1 => "Wrong tile! 1 life left".to_string(),
            n => format!("Wrong tile! {} lives left", n),
        },
        GameEvent::TimeExpired => "Time's up".to_string(),
        GameEvent::GameOver { final_score, level, best_combo, .. } => format!(
            "Game over: {} points, level {}, best combo {}",
            final_score, level, best_combo
        ),
        GameEvent::NewHighScore(score) => format!("New high score: {}", score),
        GameEvent::SpeedChanged(speed) => format!("Speed x{:.2}", speed),
        GameEvent::SoundToggled(true) => "Sound on".to_string(),
        GameEvent::SoundToggled(false) => "Sound off".to_string(),
    };
    Some(text)
}

/// Key event result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    /// No action needed
    None,
    /// Quit the application
    Quit,
    /// Select a tile
    Select(Slot),
    /// Start or restart in the current mode
    Restart,
    /// Start a round in a specific mode
    StartMode(GameMode),
    /// Toggle sound
    ToggleSound,
    /// Increase playback speed
    SpeedUp,
    /// Decrease playback speed
    SpeedDown,
    /// Toggle help
    ToggleHelp,
}

impl KeyAction {
    /// Control message for the session, if the action needs one
    pub fn control(&self, state: &UiState) -> Option<Control> {
        match *self {
            KeyAction::Select(slot) => Some(Control::Select(slot)),
            KeyAction::Restart => Some(Control::Start(state.mode())),
            KeyAction::StartMode(mode) => Some(Control::Start(mode)),
            KeyAction::ToggleSound => Some(Control::ToggleSound),
            KeyAction::SpeedUp => Some(Control::SetSpeed(state.speed() + SPEED_STEP)),
            KeyAction::SpeedDown => Some(Control::SetSpeed(state.speed() - SPEED_STEP)),
            KeyAction::None | KeyAction::Quit | KeyAction::ToggleHelp => None,
        }
    }
}

/// Map a key press to an action
pub fn map_key(code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
    match (code, modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE)
        | (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,

        // Tiles 1-9
        (KeyCode::Char(c @ '1'..='9'), KeyModifiers::NONE) => {
            KeyAction::Select((c as usize) - ('1' as usize))
        }

        (KeyCode::Enter, _) | (KeyCode::Char('r'), KeyModifiers::NONE) => KeyAction::Restart,
        (KeyCode::Char('n'), KeyModifiers::NONE) => KeyAction::StartMode(GameMode::Normal),
        (KeyCode::Char('t'), KeyModifiers::NONE) => KeyAction::StartMode(GameMode::TimeAttack),
        (KeyCode::Char('s'), KeyModifiers::NONE) => KeyAction::StartMode(GameMode::Survival),

        (KeyCode::Char('m'), KeyModifiers::NONE) => KeyAction::ToggleSound,

        // '+' arrives with SHIFT on most layouts
        (KeyCode::Char('+'), _) | (KeyCode::Char('='), KeyModifiers::NONE) => KeyAction::SpeedUp,
        (KeyCode::Char('-'), KeyModifiers::NONE) => KeyAction::SpeedDown,

        (KeyCode::Char('?'), _) | (KeyCode::Char('h'), KeyModifiers::NONE) => KeyAction::ToggleHelp,

        _ => KeyAction::None,
    }
}

/// Terminal UI application
pub struct App {
    /// Display state
    state: UiState,
    /// Terminal handle
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Target frame rate
    frame_rate: u32,
    /// Whether to continue running
    running: bool,
}

impl App {
    /// Take over the terminal
    pub fn new(state: UiState) -> io::Result<Self> {
        enable_raw_mode()?;
        let terminal = restore_on_error(Self::enter_screen(), || {
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            let _ = disable_raw_mode();
        })?;

        Ok(Self {
            state,
            terminal,
            frame_rate: 30,
            running: true,
        })
    }

    fn enter_screen() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        Terminal::new(CrosstermBackend::new(stdout))
    }

    /// Display state
    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// Feed a session event into the display
    pub fn apply(&mut self, event: &SessionEvent) {
        self.state.apply(event);
    }

    /// Time between frames
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / self.frame_rate as u64)
    }

    /// Check if running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the app
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Handle a key event
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
        let action = map_key(code, modifiers);
        match action {
            KeyAction::Quit => self.quit(),
            KeyAction::ToggleHelp => self.state.show_help = !self.state.show_help,
            _ => {}
        }
        action
    }

    /// Draw the UI
    pub fn draw(&mut self) -> io::Result<()> {
        let state = &self.state;

        self.terminal.draw(|frame| {
            let area = frame.area();

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(4), // Score panel
                    Constraint::Min(5),    // Board
                    Constraint::Length(6), // Notifications
                    Constraint::Length(1), // Key hints
                ])
                .split(area);

            if let Some(round) = &state.round {
                frame.render_widget(
                    ScoreboardWidget::new(round)
                        .block(Block::default().borders(Borders::ALL).title(" Score ")),
                    chunks[0],
                );
            }

            frame.render_widget(
                BoardWidget::new(&state.tiles, Instant::now())
                    .accepting(state.round.as_ref().map(|r| r.status) == Some(Status::AwaitingInput))
                    .block(Block::default().borders(Borders::ALL).title(" Board ")),
                chunks[1],
            );

            frame.render_widget(NotificationsWidget::new(&state.notifications), chunks[2]);

            render_key_hints(frame, chunks[3]);

            if state.show_help {
                render_help_overlay(frame, area);
            }
        })?;

        Ok(())
    }

    /// Restore the terminal
    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Undo raw mode when the rest of terminal setup fails
fn restore_on_error<T>(result: io::Result<T>, restore: impl FnOnce()) -> io::Result<T> {
    if result.is_err() {
        restore();
    }
    result
}

/// Render key hints
fn render_key_hints(frame: &mut Frame, area: Rect) {
    let text = Span::styled(
        " 1-9: Tiles | Enter: Restart | n/t/s: Mode | m: Sound | +/-: Speed | h: Help | q: Quit",
        Style::default().fg(Color::DarkGray),
    );
    frame.render_widget(Paragraph::new(text), area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 46.min(area.width.saturating_sub(4));
    let height = 15.min(area.height.saturating_sub(4));
    let x = (area.width - width) / 2;
    let y = (area.height - height) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let help_text = vec![
        Line::from(Span::styled("Play", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  1-9         Select tile"),
        Line::from("  Enter/r     Start or restart"),
        Line::from(""),
        Line::from(Span::styled("Modes", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  n           Normal"),
        Line::from("  t           Time attack"),
        Line::from("  s           Survival"),
        Line::from(""),
        Line::from(Span::styled("Other", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  m           Toggle sound"),
        Line::from("  +/-         Speed up/down"),
        Line::from("  h/?         Toggle help"),
        Line::from("  q/Ctrl+c    Quit"),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}
