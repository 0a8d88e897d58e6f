//! SQLite backend implementation over `rusqlite`.
//!
//! `rusqlite::Connection` implements [`Connection`] directly. Statements are
//! prepared through the connection's statement cache, and queries run lazily
//! over the live statement, so row parsers can issue nested statements on the
//! same connection while a cursor is open.
//!
//! To run inside a transaction, pass the transaction's connection
//! (`&*tx` for a `rusqlite::Transaction`).

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{ToSql, params_from_iter};
use tracing::trace;

use super::{Connection, Cursor, CursorScope, Placeholder, Row, has_returning_clause};
use crate::error::{Error, Result};
use crate::value::Value;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use rusqlite::types::Value as Sql;

        Ok(match self {
            Value::Null => ToSqlOutput::Owned(Sql::Null),
            Value::Bool(b) => ToSqlOutput::Owned(Sql::Integer(i64::from(*b))),
            Value::Int(i) => ToSqlOutput::Owned(Sql::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Owned(Sql::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            // SQLite has no date or JSON storage class; store the text form
            Value::Date(_) | Value::Timestamp(_) | Value::Json(_) => {
                ToSqlOutput::Owned(Sql::Text(self.to_text().unwrap_or_default()))
            }
        })
    }
}

impl Row for rusqlite::Row<'_> {
    fn len(&self) -> usize {
        self.as_ref().column_count()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.as_ref().column_name(index).ok()
    }

    fn value(&self, index: usize) -> Result<Value> {
        Ok(match self.get_ref(index)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Int(i),
            ValueRef::Real(f) => Value::Float(f),
            ValueRef::Text(t) => match std::str::from_utf8(t) {
                Ok(text) => Value::Text(text.to_owned()),
                Err(e) => {
                    return Err(Error::ColumnType {
                        column: Row::column_name(self, index).unwrap_or_default().to_string(),
                        expected: "UTF-8 text",
                        found: format!("TEXT with invalid UTF-8 ({})", e),
                    });
                }
            },
            ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
        })
    }
}

/// Cursor over the live rows of a prepared statement.
struct SqliteCursor<'stmt> {
    rows: rusqlite::Rows<'stmt>,
}

impl Cursor for SqliteCursor<'_> {
    fn next_row(&mut self) -> Result<Option<&dyn Row>> {
        Ok(self.rows.next()?.map(|row| row as &dyn Row))
    }
}

impl Connection for rusqlite::Connection {
    fn backend_name(&self) -> &'static str {
        "Sqlite"
    }

    fn placeholder(&self) -> Placeholder {
        Placeholder::Question
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let mut stmt = self.prepare_cached(sql)?;
        let changed = stmt.execute(params_from_iter(params))?;
        Ok(changed as u64)
    }

    /// Without a `RETURNING` clause only the last inserted rowid is known, so a
    /// multi-row insert reports one key.
    fn execute_insert(&self, sql: &str, params: &[Value]) -> Result<Vec<Value>> {
        let mut stmt = self.prepare_cached(sql)?;
        if has_returning_clause(sql) {
            let mut rows = stmt.query(params_from_iter(params))?;
            let mut keys = Vec::new();
            while let Some(row) = rows.next()? {
                keys.push(Row::value(row, 0)?);
            }
            return Ok(keys);
        }

        // last_insert_rowid is only moved by a successful INSERT
        let before = self.last_insert_rowid();
        let changed = stmt.execute(params_from_iter(params))?;
        let after = self.last_insert_rowid();
        if changed == 0 || after == before {
            return Ok(Vec::new());
        }
        Ok(vec![Value::Int(after)])
    }

    fn query(&self, sql: &str, params: &[Value], scope: &mut CursorScope<'_>) -> Result<()> {
        let mut stmt = self.prepare_cached(sql)?;
        let rows = stmt.query(params_from_iter(params))?;
        let mut cursor = SqliteCursor { rows };
        // rows (and the statement borrow) are reset when `cursor` drops here
        scope(&mut cursor)
    }

    fn execute_batch(&self, sql: &str, rows: &[Vec<Value>]) -> Result<Vec<u64>> {
        let mut stmt = self.prepare_cached(sql)?;
        let mut counts = Vec::with_capacity(rows.len());

        for (index, params) in rows.iter().enumerate() {
            trace!(index, "executing batch item");
            let changed = stmt
                .execute(params_from_iter(params))
                .map_err(|e| Error::BatchItem {
                    index,
                    source: Box::new(e.into()),
                })?;
            counts.push(changed as u64);
        }

        Ok(counts)
    }
}
