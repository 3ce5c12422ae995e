//! Builds the calibration scene from a parameter file and replays
//! interaction events read as JSON lines.
//!
//! Each line looks like `{"name": "tag1", "interaction": {"rotate": {"axis": "z", "angle": 0.3}}}`.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use argh::FromArgs;
use calibsim::{Interaction, LogObserver, Result, Scene, SceneConfig};
use serde::Deserialize;

/// Builds a scene of fiducial targets and a camera, then replays interaction events
#[derive(Debug, FromArgs)]
struct Args {
    /// path to the JSON parameter file
    #[argh(positional)]
    config: PathBuf,

    /// file of JSON-lines interaction events (defaults to stdin)
    #[argh(option, short = 'e')]
    events: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    name: String,
    interaction: Interaction,
}

fn main() {
    let _ = env_logger::try_init();
    let args: Args = argh::from_env();

    if let Err(err) = run(&args) {
        log::error!("simulate failed: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = SceneConfig::load(&args.config)?;
    let mut scene = Scene::build_with_observers(&config, vec![Box::new(LogObserver::new())])?;

    let input: Box<dyn BufRead> = match &args.events {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    for (line_number, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: WireEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(err) => {
                log::warn!("line {}: ignoring malformed event: {err}", line_number + 1);
                continue;
            }
        };
        if let Err(err) = scene.submit_by_name(&event.name, event.interaction) {
            log::warn!("line {}: {err}", line_number + 1);
            continue;
        }

        let report = scene.run_pending()?;
        for capture in &report.captures {
            for detection in &capture.detections {
                log::info!("  detected {} at {:?}", detection.name, detection.corners);
            }
            for rejection in &capture.rejections {
                log::info!("  missed {} ({:?})", rejection.name, rejection.reason);
            }
        }
    }

    scene.shutdown();
    Ok(())
}
