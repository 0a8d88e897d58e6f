mod execute;
mod output;

use clap::Args;
use std::path::PathBuf;

/// Run a write once per object of a JSON array file
#[derive(Args, Debug)]
#[command(after_help = "\
Each object supplies the statement's placeholders by key; a missing key binds NULL
and keys that match no placeholder are ignored.

Examples:
  quarry batch 'INSERT INTO book (isbn, title) VALUES (:isbn, :title)' --file books.json")]
pub struct BatchCmd {
    /// SQL text with :name or {name} placeholders
    pub sql: String,

    /// JSON file holding an array of objects
    #[arg(short, long)]
    pub file: PathBuf,
}
