//! Connection boundary between the mapping layer and a database driver.
//!
//! This module provides trait definitions that abstract the few driver
//! operations the pipeline needs, so that SQLite (`rusqlite`) and PostgreSQL
//! (`postgres`) connections can be used interchangeably. Connections are always
//! created and owned by the caller; nothing here pools connections or begins
//! transactions.

use crate::error::{Error, Result};
use crate::value::Value;

/// Positional parameter syntax understood by a driver.
///
/// Both styles are numbered, so a placeholder name that appears several times
/// in the SQL text is bound once and referenced by the same number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?1`, `?2`, ... (SQLite)
    Question,
    /// `$1`, `$2`, ... (PostgreSQL)
    Dollar,
}

impl Placeholder {
    /// Render the marker for the 1-based parameter `index`.
    pub fn marker(self, index: usize) -> String {
        match self {
            Placeholder::Question => format!("?{}", index),
            Placeholder::Dollar => format!("${}", index),
        }
    }
}

/// Trait for accessing column values in a result row.
pub trait Row {
    /// Returns the number of columns in this row.
    fn len(&self) -> usize;

    /// Returns true if the row has no columns.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the column at `index`, if any.
    fn column_name(&self, index: usize) -> Option<&str>;

    /// Value of the column at `index`.
    fn value(&self, index: usize) -> Result<Value>;

    /// Index of the first column whose name matches `name` case-insensitively.
    fn index_of(&self, name: &str) -> Option<usize> {
        (0..self.len()).find(|&i| {
            self.column_name(i)
                .is_some_and(|col| col.eq_ignore_ascii_case(name))
        })
    }
}

/// Forward-only handle over an open result set.
///
/// A cursor is only reachable inside the scope passed to [`Connection::query`];
/// the driver releases it when that scope returns.
pub trait Cursor {
    /// Advance to the next row, or `None` once the result set is exhausted.
    fn next_row(&mut self) -> Result<Option<&dyn Row>>;
}

/// Scope that receives the open cursor of a query.
pub type CursorScope<'s> = dyn FnMut(&mut dyn Cursor) -> Result<()> + 's;

/// Core trait for statement execution against a caller-owned connection.
///
/// Every method is synchronous and blocks on the driver. Driver failures are
/// returned as [`Error::Driver`] without retries or translation.
pub trait Connection {
    /// Get the backend name for logging.
    fn backend_name(&self) -> &'static str;

    /// Positional parameter syntax this driver expects.
    fn placeholder(&self) -> Placeholder;

    /// Execute a statement, returning the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Execute an insert, returning the generated key(s).
    ///
    /// With a `RETURNING` clause the keys are the first column of every
    /// returned row. A statement that inserts nothing yields no keys.
    fn execute_insert(&self, sql: &str, params: &[Value]) -> Result<Vec<Value>>;

    /// Run a query and hand its cursor to `scope`.
    ///
    /// The cursor is released exactly once when `scope` returns, whether it
    /// consumed every row, stopped early, or failed.
    fn query(&self, sql: &str, params: &[Value], scope: &mut CursorScope<'_>) -> Result<()>;

    /// Execute the same statement once per parameter row, returning per-row counts.
    ///
    /// The default runs one statement per row and stops at the first failure.
    /// Whether earlier rows stay applied is up to the driver and the caller's
    /// transaction.
    fn execute_batch(&self, sql: &str, rows: &[Vec<Value>]) -> Result<Vec<u64>> {
        let mut counts = Vec::with_capacity(rows.len());
        for (index, params) in rows.iter().enumerate() {
            let count = self.execute(sql, params).map_err(|e| Error::BatchItem {
                index,
                source: Box::new(e),
            })?;
            counts.push(count);
        }
        Ok(counts)
    }
}

/// True when the statement hands rows back (`INSERT ... RETURNING id`).
#[cfg_attr(not(any(feature = "backend-sqlite", feature = "backend-postgres")), allow(dead_code))]
pub(crate) fn has_returning_clause(sql: &str) -> bool {
    sql.split(|c: char| c.is_whitespace() || c == ')' || c == '(')
        .any(|word| word.eq_ignore_ascii_case("returning"))
}

#[cfg(feature = "backend-sqlite")]
pub mod sqlite;

#[cfg(feature = "backend-postgres")]
pub mod pg;

#[cfg(feature = "backend-postgres")]
pub use pg::PgConnection;
