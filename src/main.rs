use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use tracing_subscriber::EnvFilter;

use repcount::app_dirs::AppDirs;
use repcount::config::{Config, FileConfigStore};
use repcount::resequence::Resequencer;
use repcount::runtime::{FrameSource, JsonLinesSource, Pipeline};
use repcount::telemetry::EventLog;
use repcount::{Catalog, CatalogSource, RepTracker, SessionConfig};

/// count exercise repetitions from pose keypoint streams
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Counts exercise repetitions from a stream of pose keypoint frames using data-driven exercise definitions."
)]
struct Cli {
    /// config file to use instead of the default location
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// list the exercises of a catalog
    List {
        /// exercise document to read instead of the configured one
        #[clap(short, long)]
        catalog: Option<PathBuf>,
    },
    /// validate an exercise document and report rejected definitions
    Check {
        /// exercise document to validate
        path: PathBuf,
    },
    /// count reps from JSON-lines frames, printing events as JSON lines
    Count {
        /// exercise id, defaults to the configured exercise
        #[clap(short, long)]
        exercise: Option<String>,

        /// frames file, `-` or nothing reads stdin
        #[clap(short, long)]
        input: Option<PathBuf>,

        /// exercise document to read instead of the configured one
        #[clap(short, long)]
        catalog: Option<PathBuf>,

        /// also append events as CSV to this file
        #[clap(long)]
        csv: Option<PathBuf>,

        /// append events as CSV to the default event log
        #[clap(long, conflicts_with = "csv")]
        log: bool,

        /// minimum joint visibility for an angle to count, between 0 and 1
        #[clap(long, value_parser = parse_confidence)]
        min_confidence: Option<f64>,

        /// reps between milestone events, 0 disables them
        #[clap(long)]
        milestone_interval: Option<u32>,

        /// only print rep and milestone events
        #[clap(short, long)]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = store.load_or_create();

    match cli.command {
        Command::List { catalog } => list(&config, catalog),
        Command::Check { path } => check(path),
        Command::Count {
            exercise,
            input,
            catalog,
            csv,
            log,
            min_confidence,
            milestone_interval,
            quiet,
        } => {
            let mut config = config;
            if let Some(path) = catalog {
                config.catalog_path = Some(path);
            }
            if let Some(value) = min_confidence {
                config.min_confidence = value;
            }
            if let Some(value) = milestone_interval {
                config.milestone_interval = value;
            }
            let csv = event_log_target(log, csv, AppDirs::event_log_path())?;
            count(&config, exercise, input, csv, quiet)
        }
    }
}

/// `--log` needs somewhere to write; an explicit `--csv` path is used as given
fn event_log_target(
    log: bool,
    csv: Option<PathBuf>,
    default_log: Option<PathBuf>,
) -> Result<Option<PathBuf>> {
    if !log {
        return Ok(csv);
    }
    default_log
        .map(Some)
        .context("no home or data directory to hold the default event log")
}

fn parse_confidence(arg: &str) -> Result<f64, String> {
    let value: f64 = arg.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{arg} is not a confidence between 0 and 1"))
    }
}

fn load_catalog(config: &Config, override_path: Option<PathBuf>) -> Result<Catalog> {
    let source = match override_path {
        Some(path) => CatalogSource::Path(path),
        None => config.catalog_source(),
    };
    Catalog::load(&source).with_context(|| format!("loading exercise catalog from {source:?}"))
}

fn list(config: &Config, catalog: Option<PathBuf>) -> Result<()> {
    let catalog = load_catalog(config, catalog)?;
    let mut out = io::stdout().lock();
    for def in catalog.list() {
        writeln!(
            out,
            "{:<16} {:<16} down {:>5.1}  up {:>5.1}  {}  [{}]",
            def.id,
            def.display_name_primary,
            def.down_angle,
            def.up_angle,
            if def.is_leg_exercise { "legs" } else { "arms" },
            def.left_keypoints.iter().join(", "),
        )?;
    }
    Ok(())
}

fn check(path: PathBuf) -> Result<()> {
    let catalog = Catalog::from_path(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    println!("{} valid exercise definition(s)", catalog.len());
    for err in catalog.rejected() {
        println!("rejected {err}");
    }
    if !catalog.rejected().is_empty() {
        bail!("{} definition(s) rejected", catalog.rejected().len());
    }
    Ok(())
}

fn count(
    config: &Config,
    exercise: Option<String>,
    input: Option<PathBuf>,
    csv: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let catalog = load_catalog(config, None)?;
    let exercise = exercise.unwrap_or_else(|| config.default_exercise.clone());

    let mut tracker = RepTracker::new(catalog, SessionConfig::from(config));
    tracker
        .select_exercise(&exercise)
        .with_context(|| format!("selecting exercise `{exercise}`"))?;

    let mut source: Box<dyn FrameSource> = match input {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
            Box::new(JsonLinesSource::new(BufReader::new(file)))
        }
        _ => Box::new(JsonLinesSource::new(io::stdin().lock())),
    };

    let mut event_log = match &csv {
        Some(path) => Some(
            EventLog::append_to(path).with_context(|| format!("opening {}", path.display()))?,
        ),
        None => None,
    };

    let (mut pipeline, _controls) =
        Pipeline::new(tracker, Resequencer::new(config.max_pending_frames));
    let mut out = BufWriter::new(io::stdout().lock());
    let mut sink_error: Option<anyhow::Error> = None;

    let summary = pipeline.run(&mut source, |event| {
        if sink_error.is_some() {
            return;
        }
        if let Some(log) = event_log.as_mut() {
            if let Err(e) = log.record(event) {
                sink_error = Some(e.into());
                return;
            }
        }
        if quiet && !(event.is_rep() || event.is_milestone()) {
            return;
        }
        let written = serde_json::to_writer(&mut out, event)
            .map_err(anyhow::Error::from)
            .and_then(|_| writeln!(out).map_err(anyhow::Error::from));
        if let Err(e) = written {
            sink_error = Some(e);
        }
    })?;

    if let Some(e) = sink_error {
        return Err(e.context("writing events"));
    }
    out.flush()?;
    if let Some(log) = event_log.as_mut() {
        log.flush()?;
    }

    let count = pipeline
        .tracker()
        .active_session()
        .map(|s| s.count())
        .unwrap_or_default();
    eprintln!(
        "{exercise}: {count} rep(s) from {} frame(s), {} dropped",
        summary.frames_processed, summary.frames_dropped
    );
    Ok(())
}
