// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

mod ui;

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use soundmem::audio::{AudioError, SineSink, ToneSink};
use soundmem::config::GameConfig;
use soundmem::game::GameMode;
use soundmem::session::Session;
use soundmem::store::{FileStore, MemoryStore, ScoreStore};
use soundmem::tones::ToneRegistry;
use ui::{App, BellSink, UiState};

fn print_usage() {
    println!("SOUNDMEM - Repeat-the-sequence memory game");
    println!();
    println!("Usage: soundmem [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>         Load game configuration from a YAML file");
    println!("  --write-config <PATH>   Write the configuration as YAML and exit");
    println!("  --store <PATH>          Preferences file (default: platform data dir)");
    println!("  --mode <MODE>           normal, time-attack or survival (default normal)");
    println!("  --seed <N>              Seed the sequence generator");
    println!("  --log <PATH>            Write logs to a file");
    println!("  --help                  Show this help message");
}

/// Command-line options
#[derive(Debug, Default, PartialEq)]
struct Options {
    config: Option<PathBuf>,
    write_config: Option<PathBuf>,
    store: Option<PathBuf>,
    mode: GameMode,
    seed: Option<u64>,
    log: Option<PathBuf>,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} requires a value", arg))
        };

        match arg.as_str() {
            "--config" => options.config = Some(PathBuf::from(value()?)),
            "--write-config" => options.write_config = Some(PathBuf::from(value()?)),
            "--store" => options.store = Some(PathBuf::from(value()?)),
            "--log" => options.log = Some(PathBuf::from(value()?)),
            "--mode" => {
                let raw = value()?;
                options.mode = raw.parse().map_err(|e: String| anyhow!(e))?;
            }
            "--seed" => {
                let raw = value()?;
                let seed = raw
                    .parse()
                    .map_err(|_| anyhow!("Invalid seed: {}", raw))?;
                options.seed = Some(seed);
            }
            "--help" | "-h" => options.help = true,
            other => bail!("Unknown option: {}", other),
        }
    }

    Ok(options)
}

/// Send logs to a file; the terminal belongs to the UI
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {:?}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("soundmem=debug")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Open the preferences store, falling back to memory if the file is unusable
fn open_store(path: Option<&Path>) -> Box<dyn ScoreStore> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match FileStore::default_path() {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "no preferences location, scores will not be saved");
                return Box::new(MemoryStore::default());
            }
        },
    };

    match FileStore::open(&path) {
        Ok(store) => {
            info!(path = ?store.path(), "preferences store opened");
            Box::new(store)
        }
        Err(e) => {
            warn!(path = ?path, error = %e, "unreadable preferences, scores will not be saved");
            Box::new(MemoryStore::default())
        }
    }
}

/// Open the sine output, falling back to the terminal bell
fn open_sink() -> Arc<dyn ToneSink> {
    match SineSink::open() {
        Ok(sink) => Arc::new(sink),
        Err(AudioError::NoDevice) => {
            info!("no audio device, using the terminal bell");
            Arc::new(BellSink)
        }
        Err(e) => {
            warn!(error = %e, "audio output unavailable, using the terminal bell");
            Arc::new(BellSink)
        }
    }
}

/// Forward key presses from the blocking terminal reader
fn spawn_key_reader(tx: mpsc::Sender<KeyEvent>) {
    thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        if tx.blocking_send(key).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "terminal read failed");
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "terminal poll failed");
                    break;
                }
            }
        }
    });
}

async fn run_game(options: Options, config: GameConfig) -> Result<()> {
    let store = open_store(options.store.as_deref());
    let rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let registry = ToneRegistry::from_config(&config.board);
    let (session, mut events) = Session::new(&config, rng, open_sink(), store);
    let (handle, task) = session.spawn();

    let mut app = App::new(UiState::new(&registry)).context("Failed to set up terminal")?;
    let (key_tx, mut keys) = mpsc::channel(32);
    spawn_key_reader(key_tx);

    handle.start_game(options.mode).await?;
    let mut frames = tokio::time::interval(app.frame_interval());

    while app.is_running() {
        tokio::select! {
            Some(event) = events.recv() => app.apply(&event),
            Some(key) = keys.recv() => {
                let action = app.handle_key(key.code, key.modifiers);
                if let Some(control) = action.control(app.state()) {
                    handle.send(control).await?;
                }
            }
            _ = frames.tick() => app.draw()?,
        }
    }

    // Restore the terminal before anything else can print
    drop(app);

    let _ = handle.shutdown().await;
    let last = task.await.context("Game session stopped unexpectedly")?;
    info!(score = last.score, level = last.level, high_score = last.high_score, "exiting");
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if options.help {
        print_usage();
        return Ok(());
    }

    if let Some(path) = &options.log {
        init_logging(path)?;
    }

    let config = match &options.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    if let Some(path) = &options.write_config {
        config.save(path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(run_game(options, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults() {
        let options = parse_args(&[]).unwrap();
        assert_eq!(options, Options::default());
        assert_eq!(options.mode, GameMode::Normal);
    }

    #[test]
    fn test_parse_all_options() {
        let options = parse_args(&args(&[
            "--config", "game.yaml",
            "--store", "prefs.toml",
            "--mode", "time-attack",
            "--seed", "42",
            "--log", "soundmem.log",
        ]))
        .unwrap();

        assert_eq!(options.config, Some(PathBuf::from("game.yaml")));
        assert_eq!(options.store, Some(PathBuf::from("prefs.toml")));
        assert_eq!(options.mode, GameMode::TimeAttack);
        assert_eq!(options.seed, Some(42));
        assert_eq!(options.log, Some(PathBuf::from("soundmem.log")));
        assert!(!options.help);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&["--seed"])).is_err());
        assert!(parse_args(&args(&["--seed", "many"])).is_err());
        assert!(parse_args(&args(&["--mode", "arcade"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
    }

    #[test]
    fn test_parse_help() {
        assert!(parse_args(&args(&["-h"])).unwrap().help);
    }

    #[test]
    fn test_open_store_falls_back_on_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        std::fs::write(&path, "high_score = [").unwrap();

        let store = open_store(Some(path.as_path()));
        assert_eq!(store.read_high_score().unwrap(), 0);
    }
}
