#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod commands;
mod config;
mod errors;
mod tracing;

use crate::cli::parse;
use crate::commands::EXIT_ERROR;
use crate::config::Config;
use crate::tracing::{TracingConfig, init_tracing};

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    match run() {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("{error:?}");
            std::process::exit(EXIT_ERROR);
        }
    }
}

fn run() -> miette::Result<i32> {
    let cli = parse();
    init_tracing(&TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
    })?;

    let config = Config::load(cli.config.as_deref())?;
    ::tracing::debug!(?config, "Loaded configuration");

    let output = commands::execute(cli.command, &config)?;
    print!("{}", output.text);
    Ok(output.outcome.exit_code())
}
