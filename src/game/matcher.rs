// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Input matcher.
//!
//! Checks each selection against the next expected slot. The stored
//! progress is always a prefix of the sequence: a wrong selection is
//! reported but never recorded.

use super::{Sequence, Slot};

/// Outcome of one selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Correct, more slots to go
    Partial,
    /// Correct, sequence reproduced
    Complete,
    /// Wrong slot
    Mismatch { expected: Slot },
}

/// Slots the player has confirmed so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    confirmed: Vec<Slot>,
}

impl Progress {
    /// Empty progress
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `slot` against the next expected slot of `sequence`
    pub fn select(&mut self, sequence: &Sequence, slot: Slot) -> MatchResult {
        let expected = match sequence.get(self.confirmed.len()) {
            Some(expected) => expected,
            // Already complete; anything more is out of sequence
            None => return MatchResult::Mismatch { expected: slot },
        };

        if slot != expected {
            return MatchResult::Mismatch { expected };
        }

        self.confirmed.push(slot);
        if self.confirmed.len() == sequence.len() {
            MatchResult::Complete
        } else {
            MatchResult::Partial
        }
    }

    /// Forget all confirmed slots
    pub fn clear(&mut self) {
        self.confirmed.clear();
    }

    /// Number of confirmed slots
    pub fn len(&self) -> usize {
        self.confirmed.len()
    }

    /// True if nothing is confirmed
    pub fn is_empty(&self) -> bool {
        self.confirmed.is_empty()
    }

    /// Confirmed slots
    pub fn as_slice(&self) -> &[Slot] {
        &self.confirmed
    }
}
