//! modelcheck CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use modelcheck_cli::{Args, error_adapter::to_reportables};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting modelcheck");
    debug!(args:?; "Parsed arguments");

    match modelcheck_cli::run(&args) {
        Ok(summary) if summary.is_success() => {
            info!(checked = summary.checked; "Completed successfully");
        }
        Ok(summary) => {
            info!(
                checked = summary.checked,
                failed = summary.failed,
                with_errors = summary.with_errors;
                "Completed with errors"
            );
            process::exit(1);
        }
        Err(err) => {
            let reporter = miette::GraphicalReportHandler::new();

            for reportable in to_reportables(&err) {
                let mut writer = String::new();
                reporter
                    .render_report(&mut writer, reportable.as_ref())
                    .expect("Writing to String buffer is infallible");

                error!("{writer}");
            }

            process::exit(1);
        }
    }
}
