// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zonemark - mark polygon zones on video frames.
//!
//! Play a video (or a directory of frames), pause on a frame, click the
//! corners of a region and close it; repeat for as many zones as needed.
//! The finished zones are written to a JSON or YAML file on exit.

mod app;
mod config;
mod io;
mod models;
mod run_loop;
mod ui;
mod util;

use anyhow::{bail, Context, Result};
use app::{RunResult, ZoneApp};
use clap::Parser;
use config::Config;
use io::input::QueuedInput;
use models::annotation::PolygonCollection;
use run_loop::{Annotator, StopReason};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Mark polygon zones on video frames
#[derive(Parser, Debug)]
#[command(name = "zonemark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory of frames or video file to annotate
    source: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Display width frames are resized to
    #[arg(long)]
    width: Option<u32>,

    /// Display height frames are resized to
    #[arg(long)]
    height: Option<u32>,

    /// Output file for the zones (.json, .yaml or .yml)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Delay between frames during playback (milliseconds)
    #[arg(long)]
    frame_delay_ms: Option<u64>,

    /// Replay a YAML list of input events without opening a window
    #[arg(long)]
    replay: Option<PathBuf>,
}

impl Cli {
    /// Load the config file (if any) and apply command line overrides.
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(source) = &self.source {
            config.source = Some(source.clone());
        }
        if let Some(width) = self.width {
            config.display.width = width;
        }
        if let Some(height) = self.height {
            config.display.height = height;
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(delay) = self.frame_delay_ms {
            config.frame_delay_ms = delay;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    let result = match &cli.replay {
        Some(script) => run_replay(&config, script)?,
        None => run_window(&config)?,
    };

    persist(&result, &config.output)
}

/// Save the zones of a finished run and turn its stop reason into the
/// process result.
fn persist(result: &RunResult, output: &Path) -> Result<()> {
    save(&result.zones, output)?;

    if result.reason == StopReason::SourceFailed {
        bail!("Frame source failed before the end of the stream; zones found so far were saved");
    }
    Ok(())
}

/// Ask for a frame source with a native dialog.
#[cfg(feature = "video-opencv")]
fn pick_source() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select a video (cancel to pick a directory of frames)")
        .add_filter("Videos", &["mp4", "avi", "mov", "mkv", "webm", "m4v"])
        .pick_file()
        .or_else(|| {
            rfd::FileDialog::new()
                .set_title("Select a directory of frames")
                .pick_folder()
        })
}

/// Ask for a frame source with a native dialog.
#[cfg(not(feature = "video-opencv"))]
fn pick_source() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select a directory of frames")
        .pick_folder()
}

/// Run the annotation window until quit, end of stream or close.
fn run_window(config: &Config) -> Result<RunResult> {
    let source = match &config.source {
        Some(source) => source.clone(),
        None => pick_source().context("No frame source given")?,
    };
    let frames = io::media::open_source(&source, config.display)?;

    let (sender, receiver) = channel();
    let keys = config.keys;
    let frame_delay = Duration::from_millis(config.frame_delay_ms);

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([
                config.display.width as f32,
                config.display.height as f32 + 32.0,
            ])
            .with_title(format!("Zonemark - {}", source.display())),
        ..Default::default()
    };

    eframe::run_native(
        "Zonemark",
        options,
        Box::new(move |cc| Ok(Box::new(ZoneApp::new(cc, frames, keys, frame_delay, sender)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    receiver
        .try_recv()
        .context("Annotation window exited without returning zones")
}

/// Run the annotation loop headless, fed from a replay script.
fn run_replay(config: &Config, script: &Path) -> Result<RunResult> {
    let Some(source) = &config.source else {
        bail!("No frame source given");
    };
    let mut frames = io::media::open_source(source, config.display)?;
    let mut input = QueuedInput::load_script(script)?;
    let mut display = ui::LogDisplay::new();

    let mut annotator = Annotator::new(config.keys);
    let reason = run_loop::run(&mut annotator, &mut frames, &mut display, &mut input);
    log::info!("Replay ended ({:?}) after {} renders", reason, display.rendered());

    Ok(RunResult {
        reason,
        zones: annotator.finish(),
    })
}

/// Persist the zones, logging them either way so a failed write loses nothing.
fn save(zones: &PolygonCollection, path: &Path) -> Result<()> {
    if zones.is_empty() {
        log::warn!("No zones were closed; writing an empty list");
    }
    let saved = io::serialization::save_zones(zones, path);
    match &saved {
        Ok(()) => log::info!("Saved {} zones to {}", zones.len(), path.display()),
        Err(e) => log::error!("{:#}", e),
    }
    for (i, zone) in zones.iter().enumerate() {
        let points: Vec<String> = zone.points().iter().map(|p| p.to_string()).collect();
        log::info!("Zone {}: {}", i + 1, points.join(", "));
    }
    saved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Point;
    use crate::models::session::{Action, Session};
    use image::{Rgba, RgbaImage};

    fn one_zone() -> PolygonCollection {
        let mut session = Session::new();
        session.perform(Action::TogglePause);
        for (x, y) in [(10, 20), (50, 20), (50, 80)] {
            session.click(Point::new(x, y));
        }
        session.perform(Action::Finalize);
        session.into_zones()
    }

    fn result(reason: StopReason) -> RunResult {
        RunResult {
            reason,
            zones: one_zone(),
        }
    }

    const ONE_ZONE_JSON: &str = "[[[10,20],[50,20],[50,80]]]";

    #[test]
    fn test_persist_saves_for_normal_stops() {
        for reason in [StopReason::Quit, StopReason::Exhausted, StopReason::InputClosed] {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("zones.json");

            persist(&result(reason), &path).unwrap();
            assert_eq!(std::fs::read_to_string(&path).unwrap(), ONE_ZONE_JSON);
        }
    }

    #[test]
    fn test_persist_source_failure_saves_then_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zones.json");

        let err = persist(&result(StopReason::SourceFailed), &path).unwrap_err();
        assert!(err.to_string().contains("Frame source failed"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), ONE_ZONE_JSON);
    }

    #[test]
    fn test_persist_save_failure_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("zones.json");

        assert!(persist(&result(StopReason::Quit), &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_save_keeps_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zones.json");
        std::fs::write(&path, "[]").unwrap();
        // A directory where the temporary file goes makes the write fail.
        std::fs::create_dir(dir.path().join(".zones.json.tmp")).unwrap();

        assert!(persist(&result(StopReason::Quit), &path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_replay_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let frames = dir.path().join("frames");
        std::fs::create_dir(&frames).unwrap();
        for i in 0..3 {
            RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]))
                .save(frames.join(format!("frame_{:03}.png", i)))
                .unwrap();
        }
        let script = dir.path().join("events.yaml");
        std::fs::write(
            &script,
            "- key: space\n- click: [10, 20]\n- click: [50, 20]\n- click: [50, 80]\n\
             - key: n\n- click: [1, 1]\n- key: space\n",
        )
        .unwrap();

        let config = Config {
            source: Some(frames),
            output: dir.path().join("zones.json"),
            ..Config::default()
        };
        let result = run_replay(&config, &script).unwrap();
        assert_eq!(result.reason, StopReason::Exhausted);

        persist(&result, &config.output).unwrap();
        assert_eq!(
            std::fs::read_to_string(&config.output).unwrap(),
            ONE_ZONE_JSON
        );
    }

    #[test]
    fn test_replay_without_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("events.yaml");
        std::fs::write(&script, "[]").unwrap();
        assert!(run_replay(&Config::default(), &script).is_err());
    }
}
