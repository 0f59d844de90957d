// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tone registry.
//!
//! Maps each board slot to a stable tone. The registry carries no game
//! logic; it is a lookup table handed to whatever plays the tones.

use std::fmt;

use crate::config::BoardConfig;
use crate::game::Slot;

/// Eight-tile palette: one octave of C major, C4 to C5
const MAJOR_SCALE: [(&str, f64); 8] = [
    ("C4", 261.63),
    ("D4", 293.66),
    ("E4", 329.63),
    ("F4", 349.23),
    ("G4", 392.00),
    ("A4", 440.00),
    ("B4", 493.88),
    ("C5", 523.25),
];

/// Four-button palette: C major triad plus the octave
const MAJOR_TRIAD: [(&str, f64); 4] = [
    ("C4", 261.63),
    ("E4", 329.63),
    ("G4", 392.00),
    ("C5", 523.25),
];

/// A tone bound to one slot
#[derive(Debug, Clone, PartialEq)]
pub struct Tone {
    /// Slot this tone belongs to
    pub slot: Slot,
    /// Display name (note name or "Tone N")
    pub name: String,
    /// Frequency in Hz
    pub frequency_hz: f64,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2} Hz)", self.name, self.frequency_hz)
    }
}

/// Slot to tone lookup
#[derive(Debug, Clone, PartialEq)]
pub struct ToneRegistry {
    tones: Vec<Tone>,
}

impl ToneRegistry {
    /// Build the built-in palette for a board size.
    ///
    /// Sizes 8 and 4 use the note palettes above. Other sizes walk the
    /// major scale upwards from C4, repeating an octave higher as needed.
    pub fn for_board(size: usize) -> Self {
        let named: &[(&str, f64)] = match size {
            8 => &MAJOR_SCALE,
            4 => &MAJOR_TRIAD,
            _ => &MAJOR_SCALE[..7],
        };

        let tones = (0..size)
            .map(|slot| {
                let octave = slot / named.len();
                let (name, hz) = named[slot % named.len()];
                let frequency_hz = hz * f64::powi(2.0, octave as i32);
                let name = if octave == 0 {
                    name.to_string()
                } else {
                    // Shift the octave digit of the note name
                    let letter = &name[..1];
                    let base: u32 = name[1..].parse().unwrap_or(4);
                    format!("{}{}", letter, base + octave as u32)
                };
                Tone { slot, name, frequency_hz }
            })
            .collect();

        Self { tones }
    }

    /// Registry for a configured board: explicit tones if given, else the
    /// built-in palette
    pub fn from_config(board: &BoardConfig) -> Self {
        if board.tones.is_empty() {
            Self::for_board(board.size)
        } else {
            Self::from_frequencies(&board.tones)
        }
    }

    /// Build a registry from explicit frequencies, one per slot
    pub fn from_frequencies(frequencies: &[f64]) -> Self {
        let tones = frequencies
            .iter()
            .enumerate()
            .map(|(slot, &frequency_hz)| Tone {
                slot,
                name: format!("Tone {}", slot + 1),
                frequency_hz,
            })
            .collect();
        Self { tones }
    }

    /// Look up the tone for a slot
    pub fn tone(&self, slot: Slot) -> Option<&Tone> {
        self.tones.get(slot)
    }

    /// Number of slots covered
    pub fn len(&self) -> usize {
        self.tones.len()
    }

    /// True if the registry has no tones
    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    /// Iterate over all tones in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Tone> {
        self.tones.iter()
    }
}
