// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Notification feed widget.

use std::time::{Duration, Instant};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::NotificationLog;

/// Widget listing recent notifications, newest first
pub struct NotificationsWidget<'a> {
    log: &'a NotificationLog,
    max_messages: usize,
}

impl<'a> NotificationsWidget<'a> {
    /// Create a new notifications widget
    pub fn new(log: &'a NotificationLog) -> Self {
        Self {
            log,
            max_messages: 4,
        }
    }
}

impl Widget for NotificationsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title(" Events ");

        let inner = block.inner(area);
        block.render(area, buf);

        let now = Instant::now();
        let lines: Vec<Line> = self
            .log
            .messages
            .iter()
            .rev()
            .take(self.max_messages)
            .map(|msg| {
                let color = message_color(now.saturating_duration_since(msg.time));
                Line::from(Span::styled(msg.text.as_str(), Style::default().fg(color)))
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

/// Fade messages as they age
fn message_color(age: Duration) -> Color {
    if age < Duration::from_millis(500) {
        Color::White
    } else if age < Duration::from_secs(3) {
        Color::Gray
    } else {
        Color::DarkGray
    }
}
