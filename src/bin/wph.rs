//! wph CLI Binary
//!
//! Builds a webpack configuration from a project's config modules and prints
//! it as JSON on stdout.

use anyhow::{anyhow, Context};
use clap::Parser;
use std::process;
use tracing::{error, info};
use webpack_helper::cli::{load_config, map_error, Cli, RunContext};
use webpack_helper::logging::{init_logging, LoggingConfig};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("wph starting");

    match run(&cli) {
        Ok(output) => {
            info!("Configuration printed");
            println!("{}", output);
        }
        Err(e) => {
            error!("wph failed: {:#}", e);
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let context = RunContext::new(cli)
        .map_err(|e| anyhow!(map_error(&e)))
        .context("Error initializing helper")?;
    let output = context
        .execute(cli)
        .map_err(|e| anyhow!(map_error(&e)))
        .context("Build failed")?;
    Ok(output)
}

/// Build logging configuration from CLI args, environment, and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = load_config(&cli.root, cli.config.as_deref())
        .map(|c| c.logging)
        .unwrap_or_default();

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }

    config
}
