//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use clap::Parser;

use crate::commands::Command;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Database to run against: a SQLite file path, sqlite://PATH, :memory:,
    /// or a postgres:// URL
    ///
    /// If not specified, uses in order:
    ///   1. .quarry.json in the current directory
    ///   2. the DATABASE_URL environment variable
    ///   3. ./quarry.sqlite
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}
