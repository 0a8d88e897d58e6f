mod execute;
mod output;

use clap::Args;
use quarry::Value;

use crate::commands::parse_param;

/// Run a write and print the affected row count or generated keys
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  quarry exec 'DELETE FROM book WHERE id = :id' -p id=3
  quarry exec 'INSERT INTO author (name) VALUES (:name)' -p name='Ursula K. Le Guin' --keys")]
pub struct ExecCmd {
    /// SQL text with :name or {name} placeholders
    pub sql: String,

    /// Placeholder value as name=value (JSON literal or plain text), repeatable
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    pub params: Vec<(String, Value)>,

    /// Report generated keys instead of the affected row count
    #[arg(long, default_value_t = false)]
    pub keys: bool,
}
