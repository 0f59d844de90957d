// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tile board widget.

use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::TileState;

/// Tiles per row
const COLUMNS: usize = 4;

/// Tile colors, cycled by slot
const PALETTE: [Color; 8] = [
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::LightRed,
    Color::LightGreen,
];

/// Widget for displaying the board
pub struct BoardWidget<'a> {
    tiles: &'a [TileState],
    now: Instant,
    accepting: bool,
    block: Option<Block<'a>>,
}

impl<'a> BoardWidget<'a> {
    /// Create a board widget, lighting tiles as of `now`
    pub fn new(tiles: &'a [TileState], now: Instant) -> Self {
        Self {
            tiles,
            now,
            accepting: false,
            block: None,
        }
    }

    /// Whether the round is waiting for the player
    pub fn accepting(mut self, accepting: bool) -> Self {
        self.accepting = accepting;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for BoardWidget<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block.take() {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if self.tiles.is_empty() {
            Paragraph::new("No tiles configured")
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }

        let rows = self.tiles.len().div_ceil(COLUMNS);
        let row_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints((0..rows).map(|_| Constraint::Ratio(1, rows as u32)).collect::<Vec<_>>())
            .split(area);

        for (row, chunk) in self.tiles.chunks(COLUMNS).enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(
                    (0..COLUMNS)
                        .map(|_| Constraint::Ratio(1, COLUMNS as u32))
                        .collect::<Vec<_>>(),
                )
                .split(row_chunks[row]);

            for (col, tile) in chunk.iter().enumerate() {
                let slot = row * COLUMNS + col;
                render_tile(cells[col], buf, slot, tile, self.tile_style(slot, tile));
            }
        }
    }
}

impl BoardWidget<'_> {
    fn tile_style(&self, slot: usize, tile: &TileState) -> Style {
        let color = tile_color(slot);
        if tile.is_lit(self.now) {
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else if self.accepting {
            Style::default().fg(color)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }
}

/// Base color for a slot
fn tile_color(slot: usize) -> Color {
    PALETTE[slot % PALETTE.len()]
}

/// Render a single tile
fn render_tile(area: Rect, buf: &mut Buffer, slot: usize, tile: &TileState, style: Style) {
    let key = if slot < 9 {
        format!("[{}]", slot + 1)
    } else {
        String::new()
    };
    let lines = vec![Line::from(key), Line::from(tile.name.as_str())];

    Paragraph::new(lines)
        .style(style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(style))
        .render(area, buf);
}
