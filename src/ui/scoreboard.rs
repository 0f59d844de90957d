// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Score panel widget.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use soundmem::game::{RoundSnapshot, Status};

/// Widget for displaying the round's counters
pub struct ScoreboardWidget<'a> {
    round: &'a RoundSnapshot,
    block: Option<Block<'a>>,
}

impl<'a> ScoreboardWidget<'a> {
    /// Create a new score panel
    pub fn new(round: &'a RoundSnapshot) -> Self {
        Self { round, block: None }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for ScoreboardWidget<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block.take() {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(14), // Status
                Constraint::Length(2),  // Spacer
                Constraint::Length(14), // Mode
                Constraint::Length(2),  // Spacer
                Constraint::Length(10), // Level
                Constraint::Length(2),  // Spacer
                Constraint::Min(0),     // Score
            ])
            .split(rows[0]);

        let (label, style) = status_indicator(self.round.status);
        Paragraph::new(label).style(style).render(chunks[0], buf);

        Paragraph::new(self.round.mode.name())
            .style(Style::default().fg(Color::Magenta))
            .render(chunks[2], buf);

        Paragraph::new(format!("Level {}", self.round.level))
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .render(chunks[4], buf);

        let score = Line::from(vec![
            Span::styled(
                format!("Score {}", self.round.score),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  Best {}", self.round.high_score),
                Style::default().fg(Color::Yellow),
            ),
        ]);
        Paragraph::new(score).render(chunks[6], buf);

        Paragraph::new(detail_line(self.round)).render(rows[1], buf);
    }
}

/// Status label and style
fn status_indicator(status: Status) -> (&'static str, Style) {
    match status {
        Status::Idle => ("■ READY", Style::default().fg(Color::Yellow)),
        Status::Presenting => (
            "▶ WATCH",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Status::AwaitingInput => (
            "● YOUR TURN",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Status::Evaluating => ("✓ NICE", Style::default().fg(Color::Green)),
        Status::GameOver => (
            "✗ GAME OVER",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    }
}

/// Second row: combo, streak, mode counters, speed, progress
fn detail_line(round: &RoundSnapshot) -> Line<'static> {
    let dim = Style::default().fg(Color::Gray);
    let mut spans = vec![
        Span::styled(format!("Combo {} (best {})", round.combo, round.best_combo), dim),
        Span::styled(format!("  Streak {}", round.streak), dim),
    ];

    if let Some(lives) = round.lives {
        let hearts = "♥".repeat(lives as usize);
        spans.push(Span::styled(format!("  {}", hearts), Style::default().fg(Color::Red)));
    }

    if let Some(seconds) = round.time_remaining {
        let color = if seconds <= 5.0 { Color::Red } else { Color::Yellow };
        spans.push(Span::styled(
            format!("  {:>2.0}s", seconds),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    spans.push(Span::styled(format!("  x{:.2}", round.speed), Style::default().fg(Color::Magenta)));
    spans.push(Span::styled(
        format!("  {}/{}", round.progress_len, round.sequence_len),
        Style::default().fg(Color::Cyan),
    ));
    if !round.sound_enabled {
        spans.push(Span::styled("  [muted]", Style::default().fg(Color::DarkGray)));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundmem::game::GameMode;

    fn round() -> RoundSnapshot {
        RoundSnapshot {
            mode: GameMode::Survival,
            status: Status::AwaitingInput,
            level: 4,
            score: 120,
            high_score: 300,
            combo: 3,
            best_combo: 5,
            streak: 3,
            lives: Some(2),
            time_remaining: None,
            speed: 1.2,
            sequence_len: 4,
            progress_len: 1,
            sound_enabled: false,
        }
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_detail_line_survival() {
        let text = line_text(&detail_line(&round()));
        assert!(text.contains("Combo 3 (best 5)"));
        assert!(text.contains("♥♥"));
        assert!(text.contains("x1.20"));
        assert!(text.contains("1/4"));
        assert!(text.contains("[muted]"));
    }

    #[test]
    fn test_detail_line_time_attack() {
        let snapshot = RoundSnapshot {
            mode: GameMode::TimeAttack,
            lives: None,
            time_remaining: Some(27.0),
            sound_enabled: true,
            ..round()
        };
        let text = line_text(&detail_line(&snapshot));
        assert!(text.contains("27s"));
        assert!(!text.contains('♥'));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_indicator(Status::Presenting).0, "▶ WATCH");
        assert_eq!(status_indicator(Status::GameOver).0, "✗ GAME OVER");
    }

    #[test]
    fn test_render_scoreboard() {
        let snapshot = round();
        let area = Rect::new(0, 0, 80, 2);
        let mut buf = Buffer::empty(area);
        ScoreboardWidget::new(&snapshot).render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Level 4"));
        assert!(text.contains("Score 120"));
        assert!(text.contains("Survival"));
    }
}
