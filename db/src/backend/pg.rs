//! PostgreSQL backend implementation over the synchronous `postgres` client.
//!
//! `postgres::Client` needs `&mut self` for every call, so [`PgConnection`]
//! keeps it behind a mutex. The lock is held only while a statement runs: query
//! results are fetched eagerly and the lock is released before the cursor scope
//! runs, which lets row parsers issue nested statements on the same connection.

use std::sync::{Mutex, MutexGuard};

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use postgres::{Client, NoTls};
use tracing::{debug, trace};

use super::{Connection, Cursor, CursorScope, Placeholder, Row, has_returning_clause};
use crate::error::{DriverError, Error, Result};
use crate::value::Value;

/// PostgreSQL connection supplied by the caller.
pub struct PgConnection {
    client: Mutex<Client>,
}

impl PgConnection {
    /// Connect without TLS.
    ///
    /// # Arguments
    /// * `params` - libpq-style connection string (e.g., "host=localhost user=postgres")
    ///   or a `postgres://` URL
    pub fn connect(params: &str) -> Result<Self> {
        debug!("Connecting to PostgreSQL");
        let client = Client::connect(params, NoTls)?;
        Ok(Self::new(client))
    }

    /// Wrap an already connected client.
    pub fn new(client: Client) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }

    /// Give the client back, e.g. to close it explicitly.
    pub fn into_inner(self) -> Result<Client> {
        self.client
            .into_inner()
            .map_err(|e| DriverError::Other(format!("PostgreSQL client lock poisoned: {}", e)).into())
    }

    fn client(&self) -> Result<MutexGuard<'_, Client>> {
        self.client
            .lock()
            .map_err(|e| DriverError::Other(format!("Failed to acquire client lock: {}", e)).into())
    }
}

fn sql_params(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            // narrow to the width the server declared for the parameter
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            Value::Text(v) => v.to_sql(ty, out),
            Value::Bytes(v) => v.to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql(ty, out),
            Value::Json(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // the variant decides; mismatches are reported by the inner `to_sql`
        true
    }

    to_sql_checked!();
}

macro_rules! get_opt {
    ($row:expr, $index:expr, $ty:ty) => {{
        let v: Option<$ty> = $row.try_get($index)?;
        v
    }};
}

impl Row for postgres::Row {
    fn len(&self) -> usize {
        self.columns().len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.columns().get(index).map(|c| c.name())
    }

    fn value(&self, index: usize) -> Result<Value> {
        let column = self.columns().get(index).ok_or_else(|| Error::MissingColumn {
            name: format!("#{}", index),
        })?;

        let value = match *column.type_() {
            Type::BOOL => get_opt!(self, index, bool).into(),
            Type::INT2 => get_opt!(self, index, i16).into(),
            Type::INT4 => get_opt!(self, index, i32).into(),
            Type::INT8 => get_opt!(self, index, i64).into(),
            Type::OID => get_opt!(self, index, u32).into(),
            Type::FLOAT4 => get_opt!(self, index, f32).into(),
            Type::FLOAT8 => get_opt!(self, index, f64).into(),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => get_opt!(self, index, String).into(),
            Type::BYTEA => get_opt!(self, index, Vec<u8>).into(),
            Type::DATE => get_opt!(self, index, NaiveDate).into(),
            Type::TIMESTAMP => get_opt!(self, index, NaiveDateTime).into(),
            Type::TIMESTAMPTZ => get_opt!(self, index, DateTime<Utc>).map(|ts| ts.naive_utc()).into(),
            Type::JSON | Type::JSONB => get_opt!(self, index, serde_json::Value)
                .map(Value::Json)
                .unwrap_or(Value::Null),
            ref other => {
                return Err(Error::ColumnType {
                    column: column.name().to_string(),
                    expected: "a supported PostgreSQL type",
                    found: other.name().to_string(),
                });
            }
        };

        Ok(value)
    }
}

/// Cursor over rows already fetched from the server.
struct PgCursor {
    rows: std::vec::IntoIter<postgres::Row>,
    current: Option<postgres::Row>,
}

impl Cursor for PgCursor {
    fn next_row(&mut self) -> Result<Option<&dyn Row>> {
        self.current = self.rows.next();
        Ok(self.current.as_ref().map(|row| row as &dyn Row))
    }
}

impl Connection for PgConnection {
    fn backend_name(&self) -> &'static str {
        "Postgres"
    }

    fn placeholder(&self) -> Placeholder {
        Placeholder::Dollar
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let mut client = self.client()?;
        Ok(client.execute(sql, &sql_params(params))?)
    }

    /// Generated keys are the first column of each row returned by a
    /// `RETURNING` clause; statements without one yield no keys.
    fn execute_insert(&self, sql: &str, params: &[Value]) -> Result<Vec<Value>> {
        let mut client = self.client()?;
        if !has_returning_clause(sql) {
            client.execute(sql, &sql_params(params))?;
            return Ok(Vec::new());
        }

        let rows = client.query(sql, &sql_params(params))?;
        rows.iter().map(|row| row.value(0)).collect()
    }

    fn query(&self, sql: &str, params: &[Value], scope: &mut CursorScope<'_>) -> Result<()> {
        let rows = {
            let mut client = self.client()?;
            client.query(sql, &sql_params(params))?
        };
        trace!(rows = rows.len(), "fetched PostgreSQL result set");

        let mut cursor = PgCursor {
            rows: rows.into_iter(),
            current: None,
        };
        scope(&mut cursor)
    }

    fn execute_batch(&self, sql: &str, rows: &[Vec<Value>]) -> Result<Vec<u64>> {
        let mut client = self.client()?;
        let stmt = client.prepare(sql)?;
        let mut counts = Vec::with_capacity(rows.len());

        for (index, params) in rows.iter().enumerate() {
            trace!(index, "executing batch item");
            let changed = client
                .execute(&stmt, &sql_params(params))
                .map_err(|e| Error::BatchItem {
                    index,
                    source: Box::new(e.into()),
                })?;
            counts.push(changed);
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_int_narrows_to_declared_width() {
        let mut out = BytesMut::new();
        Value::Int(7).to_sql(&Type::INT4, &mut out).unwrap();
        assert_eq!(&out[..], &7i32.to_be_bytes());
    }

    #[rstest]
    fn test_int_overflowing_declared_width_fails() {
        let mut out = BytesMut::new();
        assert!(Value::Int(i64::MAX).to_sql(&Type::INT2, &mut out).is_err());
    }

    #[rstest]
    fn test_null_writes_nothing() {
        let mut out = BytesMut::new();
        let is_null = Value::Null.to_sql(&Type::TEXT, &mut out).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(out.is_empty());
    }
}
