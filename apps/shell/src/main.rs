mod args;
mod commands;

use crate::args::{Cli, Commands};
use anyhow::Result;
use clap::Parser;
use jsk_flags::JishakuFlags;
use jsk_logger::{LevelFilter, Logger, verbosity};
use std::io::IsTerminal;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _logger = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .console(true)
        .ansi(std::io::stderr().is_terminal())
        .level(verbosity(LevelFilter::WARN, cli.verbose))
        .init()?;

    let flags = JishakuFlags::new()?;
    let registry = flags.registry();
    commands::apply_overrides(registry, &cli.overrides)?;

    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::List { json } => commands::list(registry, json, &mut out)?,
        Commands::Get { name, json } => commands::get(registry, &name, json, &mut out)?,
    }

    Ok(())
}
