// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal bell tone sink.
//!
//! Used when no audio device can be opened. Terminals have no pitch, so
//! every tone rings the same bell.

use std::io::{self, Write};

use tracing::trace;

use soundmem::audio::{AudioError, ToneSink};
use soundmem::tones::Tone;

/// Rings the terminal bell for every tone
#[derive(Debug, Default, Clone, Copy)]
pub struct BellSink;

impl ToneSink for BellSink {
    fn play(&self, tone: &Tone) -> Result<(), AudioError> {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(b"\x07")
            .and_then(|_| stdout.flush())
            .map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;
        trace!(%tone, "bell");
        Ok(())
    }
}
