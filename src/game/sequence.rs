// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequence generator.
//!
//! Draws slots uniformly from the board. Adjacent repeats are allowed and
//! not filtered out.

use rand::Rng;

use super::{Sequence, Slot};
use crate::config::Growth;

/// Produces the sequence for each level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceGenerator {
    board_size: usize,
    growth: Growth,
}

impl SequenceGenerator {
    /// Create a generator for a board of `board_size` slots
    pub fn new(board_size: usize, growth: Growth) -> Self {
        Self {
            board_size: board_size.max(1),
            growth,
        }
    }

    /// Board size
    pub fn board_size(&self) -> usize {
        self.board_size
    }

    /// Growth rule
    pub fn growth(&self) -> Growth {
        self.growth
    }

    /// Sequence for level 1 of a new round
    pub fn first<R: Rng + ?Sized>(&self, rng: &mut R) -> Sequence {
        self.extend(&Sequence::default(), 1, rng)
    }

    /// Sequence for `level`, given the previous level's sequence.
    ///
    /// Incremental growth appends one slot to `previous` (or starts a
    /// one-slot sequence if it is empty). Fresh growth ignores `previous`
    /// and draws `level + offset` slots.
    pub fn extend<R: Rng + ?Sized>(&self, previous: &Sequence, level: u32, rng: &mut R) -> Sequence {
        match self.growth {
            Growth::Incremental => previous.extended(self.draw(rng)),
            Growth::Fresh { offset } => {
                let len = level as usize + offset;
                Sequence::new((0..len).map(|_| self.draw(rng)).collect())
            }
        }
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Slot {
        rng.gen_range(0..self.board_size)
    }
}
