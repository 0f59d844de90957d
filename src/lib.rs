// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Repeat-the-sequence memory game engine.
//!
//! The machine plays a growing sequence of tiles, each with its own tone,
//! and the player reproduces it. [`game::Round`] is the synchronous state
//! machine; [`session::Session`] drives it in time on tokio.

pub mod audio;
pub mod config;
pub mod game;
pub mod playback;
pub mod session;
pub mod store;
pub mod tones;
