//! Batch reader: one JSON array of readings for a list of photographs.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use thiserror::Error;

use sevenseg::{DebugSink, DisplayReader, EngineParams};

#[derive(Parser)]
#[command(
    name = "sevenseg",
    version,
    about = "Read seven-segment thermostat displays from photographs"
)]
struct Cli {
    /// Input images, processed in order.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Dump intermediate pipeline images into one subdirectory per input,
    /// named after the input's file stem.
    #[arg(long, env = "SEVENSEG_DEBUG_DIR", value_name = "DIR")]
    debug_dir: Option<PathBuf>,

    /// Archive the display crop that produced a reading to this path.
    #[arg(long, env = "SEVENSEG_SAVE_DISPLAY", value_name = "PATH")]
    save_display: Option<PathBuf>,

    /// Segment fill ratio above which a segment counts as lit.
    #[arg(long, value_name = "RATIO")]
    flood_threshold: Option<f32>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

fn sink_for(cli: &Cli, input: &Path) -> DebugSink {
    let mut sink = match &cli.debug_dir {
        Some(dir) => {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "input".to_owned());
            DebugSink::to_dir(dir.join(stem))
        }
        None => DebugSink::disabled(),
    };
    if let Some(path) = &cli.save_display {
        sink = sink.with_display_archive(path);
    }
    sink
}

fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let mut params = EngineParams::default();
    if let Some(threshold) = cli.flood_threshold {
        params.flood_threshold = threshold;
    }
    let reader = DisplayReader::new(params);

    // An unloadable input marks the batch as failed but never aborts it;
    // its slot in the output stays null.
    let mut failed = false;
    let mut readings: Vec<Option<u32>> = Vec::with_capacity(cli.images.len());
    for input in &cli.images {
        let sink = sink_for(cli, input);
        match reader.read_path(input, &sink) {
            Ok(reading) => {
                match reading {
                    Some(value) => log::info!("{}: {value}", input.display()),
                    None => log::info!("{}: no reading", input.display()),
                }
                readings.push(reading);
            }
            Err(err) => {
                log::error!("{err}");
                failed = true;
                readings.push(None);
            }
        }
    }

    println!("{}", serde_json::to_string(&readings)?);
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = sevenseg_core::init_with_level(level);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
