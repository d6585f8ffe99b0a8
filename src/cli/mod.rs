//! Command-line parsing for the emulsion curve tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::curve::{DEFAULT_LO, DEFAULT_POINTS};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "emul",
    version,
    about = "Likelihood of no emulsion vs K3PO4 stoichiometry and buffer volume (logistic regression)"
)]
pub struct Cli {
    /// Log fit and startup progress to stderr (overridden by `EMUL_LOG`).
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the model, print diagnostics and an ASCII plot of the curve at `--buffer`.
    Fit(RunArgs),
    /// Print the predicted curve at `--buffer` as `stoichiometry,probability` lines.
    Curve(RunArgs),
    /// Launch the interactive TUI (buffer slider + Clear + chart).
    Tui(RunArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Aggregated trials CSV (`K3PO4,buffer,tot_case,good_case`).
    ///
    /// Defaults to `EMUL_DATA` from the environment / `.env`, then `emulsion.csv`.
    #[arg(short = 'd', long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Use a seeded synthetic dataset instead of a CSV.
    #[arg(long)]
    pub synthetic: bool,

    /// Seed for `--synthetic`.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Maximum Newton iterations for the fit.
    #[arg(long, default_value_t = 100)]
    pub max_iter: usize,

    /// Convergence tolerance (infinity norm of the Newton step).
    #[arg(long, default_value_t = 1e-8)]
    pub tol: f64,

    /// Lower end of the stoichiometry grid (upper end is the max observed value).
    #[arg(long, default_value_t = DEFAULT_LO)]
    pub grid_lo: f64,

    /// Number of grid points.
    #[arg(long, default_value_t = DEFAULT_POINTS)]
    pub points: usize,

    /// Buffer volume for the curve (initial slider value in the TUI).
    #[arg(short = 'b', long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub buffer: f64,

    /// Buffer slider minimum.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub buffer_min: f64,

    /// Buffer slider maximum.
    #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
    pub buffer_max: f64,

    /// Buffer slider step.
    #[arg(long, default_value_t = 0.1)]
    pub buffer_step: f64,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the curve (labels + points + coefficients) to JSON.
    #[arg(long = "export-curve", value_name = "JSON")]
    pub export_curve: Option<PathBuf>,
}
