//! # CLI Argument Definitions
//!
//! Command-line structure of the `jsk` binary, parsed with `clap`.

use clap::{ArgAction, Parser, Subcommand};

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "jsk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Inspect jishaku flags as resolved from overrides, environment and defaults")]
pub struct Cli {
    /// Override a flag before running the command (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", global = true, value_parser = parse_assignment)]
    pub overrides: Vec<(String, String)>,

    /// Increase log verbosity on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List every flag with its current value and source
    List {
        /// Print a JSON array instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Resolve a single flag
    Get {
        /// Flag name without the environment prefix (e.g. HIDE)
        name: String,
        /// Print the value together with its source as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) =
        raw.split_once('=').ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing flag name in '{raw}'"));
    }
    Ok((name.to_owned(), value.to_owned()))
}
