mod execute;
mod execute_tests;
mod output;

use clap::Args;
use quarry::Value;

use crate::commands::parse_param;

/// Run a read and print the rows
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  quarry query 'SELECT * FROM book'
  quarry query 'SELECT * FROM book WHERE id = :id' -p id=1
  quarry query 'SELECT title FROM book WHERE title LIKE :t' -p t='%Dune%' -o json")]
pub struct QueryCmd {
    /// SQL text with :name or {name} placeholders
    pub sql: String,

    /// Placeholder value as name=value (JSON literal or plain text), repeatable
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    pub params: Vec<(String, Value)>,
}
