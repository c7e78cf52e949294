//! Command-line parsing for the PLC calibration tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/reporting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "plccal",
    version,
    about = "PLC analog-input calibration: least-squares fit of counts to engineering units"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit every record in an input file and write the calibration reports.
    Fit(FitArgs),
    /// Write an example input file to edit.
    Template(TemplateArgs),
    /// Plot a previously exported fit JSON.
    Plot(PlotArgs),
}

/// Options for fitting a batch of calibration records.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Input JSON file holding one record or a list of records.
    #[arg(short = 'i', long = "input", alias = "inputFileName", value_name = "JSON")]
    pub input: PathBuf,

    /// Output prefix; files are named `<PREFIX>_<instName>.txt/.svg/.json`.
    #[arg(short = 'o', long = "output-prefix", alias = "outputFilePrefix", value_name = "PREFIX")]
    pub output_prefix: Option<String>,

    /// Polynomial degree of the fit.
    #[arg(short = 'd', long, default_value_t = 1)]
    pub degree: usize,

    /// Replace measured counts with counts simulated from the nominal line.
    #[arg(short = 's', long)]
    pub simulate: bool,

    /// Seed for simulated counts (random when omitted).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulation noise standard deviation in counts (default: 1% of the count span).
    #[arg(long, value_name = "COUNTS")]
    pub noise: Option<f64>,

    /// Print each report and an ASCII plot to the terminal.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// ASCII plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// ASCII plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Do not write the SVG plot file.
    #[arg(long)]
    pub no_plot_file: bool,

    /// Also write the fit (coefficients, quality, fitted grid) to JSON.
    #[arg(long = "export-fit", requires = "output_prefix")]
    pub export_fit: bool,

    /// Fail records whose configured EU range is zero instead of reporting
    /// absolute error only.
    #[arg(long)]
    pub strict_range: bool,

    /// Process records one at a time and stop at the first failure.
    #[arg(long)]
    pub fail_fast: bool,
}

/// Options for writing the input template.
#[derive(Debug, Parser)]
pub struct TemplateArgs {
    /// Path of the template file to create.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,
}

/// Options for plotting a saved fit.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Fit JSON file produced by `plccal fit --export-fit`.
    #[arg(long, value_name = "JSON")]
    pub fit: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
