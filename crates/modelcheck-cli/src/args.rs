//! Command-line argument definitions for the modelcheck CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the model files, the configuration file,
//! overrides for the code scheme and report format, and logging verbosity.

use clap::Parser;

use modelcheck::diagnostics::CodeScheme;

/// Command-line arguments for the persist model validator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Model source files, each validated as its own unit
    #[arg(required = true, help = "Paths to the model files")]
    pub inputs: Vec<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Code scheme diagnostics are published under (legacy, current)
    #[arg(short, long)]
    pub scheme: Option<CodeScheme>,

    /// Report format (pretty, plain)
    #[arg(short, long, value_parser = ["pretty", "plain"])]
    pub format: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
