// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sine tone output via cpal.
//!
//! The stream lives on its own thread for as long as the sink exists.
//! Tones are mixed in the stream callback, so overlapping tones (a player
//! press during the tail of a presented one) sum instead of cutting off.

use std::f64::consts::TAU;
use std::sync::mpsc::{self, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use tracing::{debug, info, warn};

use super::{AudioError, ToneSink};
use crate::tones::Tone;

/// Tone length in seconds
pub const TONE_SECONDS: f64 = 0.5;

/// Time to reach full volume, in seconds
const ATTACK_SECONDS: f64 = 0.1;

/// Envelope peak
const PEAK_GAIN: f64 = 0.5;

/// One sine tone with a linear attack and release
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    frequency_hz: f64,
    sample_rate: f64,
    position: u64,
    length: u64,
    attack: u64,
}

impl Voice {
    /// Create a voice at `frequency_hz` for a stream at `sample_rate`
    pub fn new(frequency_hz: f64, sample_rate: u32) -> Self {
        let rate = sample_rate as f64;
        Self {
            frequency_hz,
            sample_rate: rate,
            position: 0,
            length: (rate * TONE_SECONDS) as u64,
            attack: ((rate * ATTACK_SECONDS) as u64).max(1),
        }
    }

    /// Whether the envelope has closed
    pub fn is_finished(&self) -> bool {
        self.position >= self.length
    }

    /// Total samples (per channel) this voice produces
    pub fn samples(&self) -> u64 {
        self.length
    }

    fn gain(&self) -> f64 {
        let pos = self.position as f64;
        let ramp = if self.position < self.attack {
            pos / self.attack as f64
        } else {
            (self.length - self.position) as f64 / (self.length - self.attack).max(1) as f64
        };
        ramp.clamp(0.0, 1.0) * PEAK_GAIN
    }

    /// Next mono sample; silence once finished
    pub fn next_sample(&mut self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }
        let t = self.position as f64 / self.sample_rate;
        let sample = (TAU * self.frequency_hz * t).sin() * self.gain();
        self.position += 1;
        sample as f32
    }
}

/// Sums the active voices into interleaved frames
#[derive(Debug, Clone)]
pub struct Mixer {
    sample_rate: u32,
    voices: Vec<Voice>,
}

impl Mixer {
    /// Create an empty mixer
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            voices: Vec::new(),
        }
    }

    /// Start a tone
    pub fn trigger(&mut self, frequency_hz: f64) {
        self.voices.push(Voice::new(frequency_hz, self.sample_rate));
    }

    /// Number of voices still sounding
    pub fn active(&self) -> usize {
        self.voices.len()
    }

    /// Overwrite `data` with the next frames and drop finished voices
    pub fn fill(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels.max(1)) {
            let mixed: f32 = self.voices.iter_mut().map(Voice::next_sample).sum();
            frame.fill(mixed.clamp(-1.0, 1.0));
        }
        self.voices.retain(|v| !v.is_finished());
    }
}

/// Plays each tone as a short sine on the default output device
pub struct SineSink {
    mixer: Arc<Mutex<Mixer>>,
    /// Dropping this stops the stream thread
    _stop: SyncSender<()>,
}

impl SineSink {
    /// Open the default output device.
    ///
    /// Returns `AudioError::NoDevice` when the host has no output device.
    pub fn open() -> Result<Self, AudioError> {
        let mixer = Arc::new(Mutex::new(Mixer::new(44100)));
        let (ready_tx, ready_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::sync_channel::<()>(0);

        let shared = Arc::clone(&mixer);
        thread::Builder::new()
            .name("tone-output".into())
            .spawn(move || match start_stream(shared) {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    // Blocks until the sink is dropped
                    let _ = stop_rx.recv();
                    drop(stream);
                    debug!("tone stream closed");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| AudioError::InitFailed(format!("Failed to spawn audio thread: {}", e)))?;

        ready_rx
            .recv()
            .map_err(|_| AudioError::InitFailed("Audio thread exited during setup".into()))??;

        Ok(Self {
            mixer,
            _stop: stop_tx,
        })
    }
}

impl ToneSink for SineSink {
    fn play(&self, tone: &Tone) -> Result<(), AudioError> {
        let mut mixer = self
            .mixer
            .lock()
            .map_err(|_| AudioError::PlaybackFailed("mixer lock poisoned".into()))?;
        mixer.trigger(tone.frequency_hz);
        Ok(())
    }
}

fn start_stream(mixer: Arc<Mutex<Mixer>>) -> Result<Stream, AudioError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

    let supported = device
        .default_output_config()
        .map_err(|e| AudioError::InitFailed(format!("Failed to get default config: {}", e)))?;
    let format = supported.sample_format();
    let config: StreamConfig = supported.config();

    if let Ok(mut mixer) = mixer.lock() {
        *mixer = Mixer::new(config.sample_rate.0);
    }

    let stream = match format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, mixer)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &config, mixer)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config, mixer)?,
        other => {
            return Err(AudioError::InitFailed(format!(
                "Unsupported sample format: {:?}",
                other
            )))
        }
    };

    stream
        .play()
        .map_err(|e| AudioError::StreamFailed(format!("Failed to start stream: {}", e)))?;

    info!(
        device = %device.name().unwrap_or_default(),
        sample_rate = config.sample_rate.0,
        channels = config.channels,
        "tone output opened"
    );
    Ok(stream)
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mixer: Arc<Mutex<Mixer>>,
) -> Result<Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut scratch: Vec<f32> = Vec::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                scratch.resize(data.len(), 0.0);
                match mixer.lock() {
                    Ok(mut mixer) => mixer.fill(&mut scratch, channels),
                    Err(_) => scratch.fill(0.0),
                }
                for (out, sample) in data.iter_mut().zip(&scratch) {
                    *out = T::from_sample(*sample);
                }
            },
            move |err| {
                warn!(error = %err, "audio stream error");
            },
            None,
        )
        .map_err(|e| AudioError::StreamFailed(format!("Failed to build stream: {}", e)))
}
