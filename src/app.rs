//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and initializes logging
//! - loads trials, expands them and fits the model (once)
//! - prints reports/plots or hands over to the TUI
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, RunArgs};
use crate::domain::{AppConfig, BufferControl, DataSource};
use crate::error::AppError;

pub mod controller;
pub mod pipeline;

/// Environment variable holding the tracing filter.
const LOG_ENV: &str = "EMUL_LOG";

/// Environment variable holding the default dataset path.
const DATA_ENV: &str = "EMUL_DATA";

/// Entry point for the `emul` binary.
pub fn run() -> Result<(), AppError> {
    // We want `emul` and `emul -d trials.csv` to behave like `emul tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_tracing(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(&config_from_args(&args)?),
        Command::Curve(args) => handle_curve(&config_from_args(&args)?),
        Command::Tui(args) => crate::tui::run(config_from_args(&args)?),
    }
}

/// Install the global `tracing` subscriber (stderr, `EMUL_LOG` filter).
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "emulsion_curves=info"
    } else {
        "emulsion_curves=warn"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // A second initialization (e.g. from tests) is harmless; ignore it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_fit(config: &AppConfig) -> Result<(), AppError> {
    let session = pipeline::initialize(config)?;
    let frame = session.frame_at(config.buffer.initial);

    println!("{}", crate::report::format_fit_summary(&session, config));
    println!(
        "{}",
        crate::plot::render_ascii_plot(&frame, config.plot_width, config.plot_height)
    );

    if let Some(path) = &config.export_curve {
        crate::io::curve::write_curve_json(path, &frame, session.model())?;
    }
    Ok(())
}

fn handle_curve(config: &AppConfig) -> Result<(), AppError> {
    let session = pipeline::initialize(config)?;
    let frame = session.frame_at(config.buffer.initial);

    print!("{}", crate::report::format_curve_table(&frame));

    if let Some(path) = &config.export_curve {
        crate::io::curve::write_curve_json(path, &frame, session.model())?;
    }
    Ok(())
}

/// Resolve CLI flags (plus `.env`) into a validated run configuration.
pub fn config_from_args(args: &RunArgs) -> Result<AppConfig, AppError> {
    let source = if args.synthetic {
        DataSource::Synthetic { seed: args.seed }
    } else {
        DataSource::Csv(resolve_data_path(args.data.clone()))
    };

    let buffer = BufferControl {
        min: args.buffer_min,
        max: args.buffer_max,
        step: args.buffer_step,
        initial: args.buffer,
    };
    validate_buffer_control(&buffer)?;

    Ok(AppConfig {
        source,
        max_iter: args.max_iter,
        tol: args.tol,
        grid_lo: args.grid_lo,
        grid_points: args.points,
        buffer,
        plot_width: args.width,
        plot_height: args.height,
        export_curve: args.export_curve.clone(),
    })
}

fn resolve_data_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    dotenvy::dotenv().ok();
    std::env::var_os(DATA_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("emulsion.csv"))
}

fn validate_buffer_control(buffer: &BufferControl) -> Result<(), AppError> {
    if !(buffer.min.is_finite() && buffer.max.is_finite() && buffer.max >= buffer.min) {
        return Err(AppError::input(format!(
            "Invalid buffer range: min={}, max={}.",
            buffer.min, buffer.max
        )));
    }
    if !(buffer.step.is_finite() && buffer.step > 0.0) {
        return Err(AppError::input(format!(
            "Buffer step must be finite and > 0 (got {}).",
            buffer.step
        )));
    }
    if !buffer.initial.is_finite() {
        return Err(AppError::input("Buffer value must be finite."));
    }
    Ok(())
}

/// Rewrite argv so `emul` defaults to `emul tui`.
///
/// Rules:
/// - `emul`                      -> `emul tui`
/// - `emul -d trials.csv ...`    -> `emul tui -d trials.csv ...`
/// - `emul --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "curve" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
