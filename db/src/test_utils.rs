//! Shared test utilities for unit and integration tests.
//!
//! In-memory rows and cursors for exercising parsers without a driver, plus
//! helpers that open SQLite databases with the book store fixture schema.

#[cfg(feature = "test-utils")]
use std::io::Write;

#[cfg(feature = "test-utils")]
use tempfile::NamedTempFile;

use crate::backend::{Cursor, Row};
use crate::error::{Error, Result};
use crate::fixtures;
use crate::value::Value;

/// Row backed by a list of named values.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRow {
    columns: Vec<(String, Value)>,
}

impl ValueRow {
    pub fn new<S: Into<String>>(columns: Vec<(S, Value)>) -> Self {
        Self {
            columns: columns.into_iter().map(|(name, v)| (name.into(), v)).collect(),
        }
    }
}

impl Row for ValueRow {
    fn len(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|(name, _)| name.as_str())
    }

    fn value(&self, index: usize) -> Result<Value> {
        self.columns
            .get(index)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| Error::MissingColumn {
                name: format!("#{}", index),
            })
    }
}

/// Cursor over in-memory rows.
pub struct VecCursor {
    rows: std::vec::IntoIter<ValueRow>,
    current: Option<ValueRow>,
}

impl VecCursor {
    pub fn new(rows: Vec<ValueRow>) -> Self {
        Self {
            rows: rows.into_iter(),
            current: None,
        }
    }
}

impl Cursor for VecCursor {
    fn next_row(&mut self) -> Result<Option<&dyn Row>> {
        self.current = self.rows.next();
        Ok(self.current.as_ref().map(|row| row as &dyn Row))
    }
}

/// Open an empty in-memory SQLite database.
pub fn mem_db() -> rusqlite::Connection {
    rusqlite::Connection::open_in_memory().expect("Failed to open in-memory SQLite")
}

/// Open an in-memory SQLite database with the book store schema and no rows.
pub fn bookstore_db() -> rusqlite::Connection {
    let conn = mem_db();
    conn.execute_batch(fixtures::BOOKSTORE_SCHEMA)
        .expect("Failed to create book store schema");
    conn
}

/// Create a temporary file containing the given content.
///
/// Used to create JSON item files for batch tests.
#[cfg(feature = "test-utils")]
pub fn create_temp_json_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}

/// Create a file-backed SQLite database with the book store schema.
///
/// Returns the temp file guard; the database lives as long as it does.
#[cfg(feature = "test-utils")]
pub fn bookstore_file_db() -> NamedTempFile {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    let conn = rusqlite::Connection::open(file.path()).expect("Failed to open SQLite file");
    conn.execute_batch(fixtures::BOOKSTORE_SCHEMA)
        .expect("Failed to create book store schema");
    file
}
