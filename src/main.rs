mod cli;
mod commands;
mod config;
mod confirm;
mod engine;
mod progress;
mod resource;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity; warnings stay visible by default
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    match cli.command {
        None => commands::apply::run(&ctx, cli.apply),
        Some(Command::Apply(args)) => commands::apply::run(&ctx, args),
        Some(Command::Status(args)) => commands::status::run(&ctx, args),
        Some(Command::Validate(args)) => commands::validate::run(&ctx, &args),
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "gcpboot", &mut io::stdout());
            Ok(())
        }
    }
}
