//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - loads and validates calibration records
//! - runs the per-record pipeline
//! - prints reports/plots and writes output files

use std::path::Path;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, FitArgs, PlotArgs, TemplateArgs};
use crate::domain::{RangePolicy, RunConfig};
use crate::error::AppError;
use crate::io::{append_text_report, build_fit_file, load_records, output_path, read_fit_json, write_fit_json};
use crate::plot::{PlotData, render_ascii_plot, write_svg_plot};
use crate::report::format_report;

use self::pipeline::RecordRun;

pub mod pipeline;

/// Pixel size of the SVG plot.
pub const SVG_SIZE: (u32, u32) = (1000, 750);

/// Entry point for the `plccal` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // The historical interface had no subcommands (`-i file.json`, `-c -o path`).
    // Clap requires a subcommand name, so we rewrite argv before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let verbose = matches!(&cli.command, Command::Fit(args) if args.verbose);
    init_tracing(verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Template(args) => handle_template(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Log to stderr. `RUST_LOG` wins over the verbosity flag.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let ingested = load_records(&config.input_path)?;

    if config.fail_fast {
        if let Some(first) = ingested.errors.first() {
            return Err(first.error.clone().into());
        }
    }

    let outcomes = pipeline::run_batch(&ingested.records, &config);

    let mut failed = ingested.errors.len();
    let mut first_error: Option<AppError> = ingested.errors.first().map(|e| e.error.clone().into());

    for outcome in outcomes {
        let result = outcome.and_then(|run| emit_outputs(&run, &config));
        if let Err(err) = result {
            if config.fail_fast {
                return Err(err);
            }
            error!("{err}");
            failed += 1;
            first_error.get_or_insert(err);
        }
    }

    info!(
        records = ingested.records_read,
        failed, "calibration run finished"
    );

    match first_error {
        Some(err) if failed > 0 => Err(AppError::new(
            err.exit_code(),
            format!("{failed} of {} record(s) failed; first: {err}", ingested.records_read),
        )),
        _ => Ok(()),
    }
}

/// Print and/or write everything produced for one record.
///
/// Without an output prefix the report goes to stdout so the run is never silent.
fn emit_outputs(run: &RecordRun, config: &RunConfig) -> Result<(), AppError> {
    let instrument = &run.record.instrument;
    let text = format_report(&run.record, &run.report);
    let plot = PlotData::from_run(&run.record, &run.fit, run.offset.as_ref());

    if config.verbose || config.output_prefix.is_none() {
        println!("{text}");
    }
    if config.verbose {
        println!("{}", render_ascii_plot(&plot, config.plot_width, config.plot_height));
    }

    let Some(prefix) = config.output_prefix.as_deref() else {
        return Ok(());
    };

    let txt = output_path(prefix, instrument, "txt");
    append_text_report(&txt, &text).map_err(|e| e.for_instrument(instrument))?;
    info!(instrument = %instrument, path = %txt.display(), "appended report");

    if config.plot_file {
        let svg = output_path(prefix, instrument, "svg");
        write_svg_plot(&svg, &plot, SVG_SIZE).map_err(|e| e.for_instrument(instrument))?;
    }
    if config.export_fit {
        let json = output_path(prefix, instrument, "json");
        write_fit_json(&json, &build_fit_file(&run.record, &run.fit)).map_err(|e| e.for_instrument(instrument))?;
    }

    Ok(())
}

fn handle_template(args: TemplateArgs) -> Result<(), AppError> {
    crate::io::write_template(&args.output)?;
    println!("Wrote template to {}", args.output.display());
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    plot_saved_fit(&args.fit, args.width, args.height)
}

fn plot_saved_fit(path: &Path, width: usize, height: usize) -> Result<(), AppError> {
    let fit_file = read_fit_json(path)?;
    let data = PlotData::from_fit_file(&fit_file);
    println!("{}    {}", data.instrument, data.date_label);
    println!("{}", render_ascii_plot(&data, width, height));
    Ok(())
}

/// Convert parsed flags into the pipeline's configuration.
///
/// A missing `--seed` is drawn from entropy and logged so a simulated run can
/// be repeated.
pub fn run_config_from_args(args: &FitArgs) -> Result<RunConfig, AppError> {
    if args.degree == 0 {
        return Err(AppError::new(2, "--degree must be at least 1"));
    }
    if let Some(noise) = args.noise {
        if !(noise.is_finite() && noise >= 0.0) {
            return Err(AppError::new(2, format!("--noise must be finite and >= 0, got {noise}")));
        }
    }

    let seed = match args.seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u64>();
            if args.simulate {
                warn!(seed, "no --seed given; rerun with this seed to reproduce the simulated counts");
            }
            seed
        }
    };

    Ok(RunConfig {
        input_path: args.input.clone(),
        output_prefix: args.output_prefix.clone().filter(|p| !p.is_empty()),
        degree: args.degree,
        simulate: args.simulate,
        seed,
        noise_std_dev: args.noise,
        verbose: args.verbose,
        plot_width: args.width,
        plot_height: args.height,
        plot_file: !args.no_plot_file,
        export_fit: args.export_fit,
        range_policy: if args.strict_range {
            RangePolicy::Strict
        } else {
            RangePolicy::AbsoluteOnly
        },
        fail_fast: args.fail_fast,
    })
}

/// Rewrite argv so the historical flag-only invocations still work.
///
/// Rules:
/// - `plccal -c -o path ...`        -> `plccal template -o path ...`
/// - `plccal -i file.json ...`      -> `plccal fit -i file.json ...`
/// - `plccal --inputFileName f ...` -> `plccal fit --inputFileName f ...`
/// - `plccal --help/--version/-h`   -> unchanged (show top-level help/version)
/// - `plccal <subcommand> ...`      -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "template" | "plot");
    if is_subcommand {
        return argv;
    }

    if !arg1.starts_with('-') {
        return argv;
    }

    // `-c` selected template mode and could appear anywhere among the flags.
    if let Some(pos) = argv.iter().skip(1).position(|a| a == "-c") {
        argv.remove(pos + 1);
        argv.insert(1, "template".to_string());
        return argv;
    }

    argv.insert(1, "fit".to_string());
    argv
}
