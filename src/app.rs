//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - runs the pipeline for the chosen subcommand
//! - prints reports and plots, and writes the optional export

use clap::Parser;
use env_logger::Env;

use crate::cli::{Cli, Command, RunArgs, SweepArgs};
use crate::error::AppError;
use crate::io::{BaselineExport, ExportFile, IhtExport, SweepExport, write_export_json};
use crate::report::{
    format_baseline_report, format_dataset_summary, format_iht_report, format_summaries, format_sweep,
};

use self::pipeline::{Evaluations, RunOutput};

pub mod pipeline;

/// Entry point for the `fes` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Command::Iht(a) | Command::Baseline(a) | Command::Compare(a) => a.verbose,
        Command::Sweep(a) => a.run.verbose,
    };
    init_logging(verbose);

    match cli.command {
        Command::Iht(args) => handle_selection(args, Evaluations { iht: true, baseline: false }),
        Command::Baseline(args) => handle_selection(args, Evaluations { iht: false, baseline: true }),
        Command::Compare(args) => handle_selection(args, Evaluations { iht: true, baseline: true }),
        Command::Sweep(args) => handle_sweep(args),
    }
}

/// `RUST_LOG` wins; otherwise `info` with `--verbose`, `warn` without.
fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    // A logger may already be installed when running under a test harness.
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}

fn handle_selection(args: RunArgs, evals: Evaluations) -> Result<(), AppError> {
    let config = crate::cli::run_config_from_args(&args)?;
    let run = pipeline::run_selection(&config, evals)?;

    println!("{}", format_dataset_summary(&run.dataset, &config.data));

    if let Some(iht) = &run.iht {
        println!("{}", format_iht_report(iht));
    }
    if let Some(baseline) = &run.baseline {
        println!("{}", format_baseline_report(baseline));
    }
    if let (Some(iht), Some(baseline)) = (&run.iht, &run.baseline) {
        println!("Comparison:");
        println!(
            "{}",
            format_summaries(&[
                baseline.noise_floor.clone(),
                iht.summary.clone(),
                baseline.top.clone(),
                baseline.explained.clone(),
            ])
        );
    }

    if args.plot {
        if let Some(iht) = &run.iht {
            println!("Loss per iteration (b = backtracked):");
            println!("{}", crate::plot::render_loss_plot(&iht.fit.history, args.width, args.height));
            println!("Weights:");
            println!(
                "{}",
                crate::plot::render_weights_plot(&run.dataset.w_true, &iht.fit.weights, args.width, args.height)
            );
        } else if let Some(baseline) = &run.baseline {
            println!("Weights (OLS):");
            println!(
                "{}",
                crate::plot::render_weights_plot(&run.dataset.w_true, &baseline.coef, args.width, args.height)
            );
        }
    }

    if let Some(path) = &args.export {
        write_export_json(path, &to_export(&run))?;
    }

    Ok(())
}

fn handle_sweep(args: SweepArgs) -> Result<(), AppError> {
    let config = crate::cli::run_config_from_args(&args.run)?;
    let run = pipeline::run_sweep(&config, args.k_min, args.k_max)?;

    println!("{}", format_dataset_summary(&run.dataset, &config.data));
    println!("{}", format_sweep(&run.sweep, &run.dataset));

    if let Some(path) = &args.run.export {
        write_export_json(path, &to_export(&run))?;
    }
    Ok(())
}

pub fn to_export(run: &RunOutput) -> ExportFile {
    let mut export = ExportFile::new(run.seed, &run.config, &run.dataset);
    export.iht = run.iht.as_ref().map(IhtExport::from);
    export.baseline = run.baseline.as_ref().map(BaselineExport::from);
    export.sweep = run.sweep.iter().map(SweepExport::from).collect();
    export
}
