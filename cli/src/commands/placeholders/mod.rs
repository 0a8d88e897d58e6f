mod cli_tests;
mod execute;
mod output;

use clap::Args;

/// List the named placeholders of a SQL statement
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  quarry placeholders 'SELECT * FROM book WHERE id = :id'
  quarry placeholders 'UPDATE book SET title = {title} WHERE isbn = :isbn' -o json")]
pub struct PlaceholdersCmd {
    /// SQL text with :name or {name} placeholders
    pub sql: String,
}
