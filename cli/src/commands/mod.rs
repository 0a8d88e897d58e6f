//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - An `Execute` implementation producing a serializable result
//! - An `Outputable` implementation for table output

mod batch;
mod exec;
mod placeholders;
mod query;

pub use batch::BatchCmd;
pub use exec::ExecCmd;
pub use placeholders::PlaceholdersCmd;
pub use query::QueryCmd;

use std::error::Error;
use std::sync::Arc;

use clap::Subcommand;
use enum_dispatch::enum_dispatch;
use quarry::{Binder, Connection, Param, Placeholder, Value, json_as_text};

use crate::config::DatabaseConfig;
use crate::output::{OutputFormat, Outputable};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, db: &DatabaseConfig) -> Result<Self::Output, Box<dyn Error>>;
}

/// Runs a command and renders its result.
#[enum_dispatch]
pub trait CommandRunner {
    fn run(self, db: &DatabaseConfig, format: OutputFormat) -> Result<String, Box<dyn Error>>;
}

impl<T: Execute> CommandRunner for T {
    fn run(self, db: &DatabaseConfig, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(db)?;
        Ok(result.format(format))
    }
}

#[derive(Subcommand, Debug)]
#[enum_dispatch(CommandRunner)]
pub enum Command {
    /// List the named placeholders of a SQL statement and its positional form
    Placeholders(PlaceholdersCmd),

    /// Run a read and print the rows
    Query(QueryCmd),

    /// Run a write and print the affected row count or generated keys
    Exec(ExecCmd),

    /// Run a write once per object of a JSON array file
    Batch(BatchCmd),
}

/// Parse `name=value` into a named value.
///
/// The value is read as a JSON literal when it parses as one (`42`, `true`,
/// `null`, `"text"`, `{"k": 1}`), and as plain text otherwise.
pub fn parse_param(s: &str) -> Result<(String, Value), String> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid parameter '{}': expected name=value", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid parameter '{}': empty name", s));
    }
    let value = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Value::from(json),
        Err(_) => Value::Text(raw.to_string()),
    };
    Ok((name.to_string(), value))
}

/// Turn parsed `-p` arguments into query parameters.
pub fn to_params(params: Vec<(String, Value)>) -> Vec<Param<'static>> {
    params
        .into_iter()
        .map(|(name, value)| Param::new(name, value))
        .collect()
}

/// Binder for `conn`: JSON documents are stored as text on drivers that use
/// `?n` markers (SQLite) and passed through elsewhere.
pub fn binder_for(conn: &dyn Connection) -> Arc<Binder> {
    match conn.placeholder() {
        Placeholder::Question => Arc::new(Binder::new().with_converter(json_as_text)),
        Placeholder::Dollar => Arc::new(Binder::new()),
    }
}
