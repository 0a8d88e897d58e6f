//! Queries with named placeholders and their terminal operations.
//!
//! A [`Query`] is an immutable descriptor built from SQL text. Binding it with
//! [`Query::on`] checks that the supplied parameters cover the placeholders
//! exactly and yields a [`Bound`] request, which runs against a caller-owned
//! [`Connection`]. Nothing touches the database until a terminal operation
//! (`execute`, `execute_insert`, `fetch`, `stream`) is called.
//!
//! # Examples
//!
//! ```ignore
//! let insert = Query::new("INSERT INTO book (isbn, title) VALUES (:isbn, :title)");
//! insert
//!     .on([Param::new("isbn", "978-0441013593"), Param::new("title", "Dune")])?
//!     .execute(&conn)?;
//!
//! let titles = Query::new("SELECT title FROM book ORDER BY title")
//!     .on([])?
//!     .fetch(&parser::string("title").list(), &conn)?;
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::backend::{Connection, Placeholder};
use crate::dctor::{Batch, Dctor};
use crate::error::{DriverError, Error, Result};
use crate::param::{Binder, Param};
use crate::parser::{ResultSetParser, RowParser, RowStream};
use crate::placeholder::ParsedSql;
use crate::value::Value;

/// SQL text with named placeholders and the binder applied to its values.
#[derive(Clone)]
pub struct Query {
    sql: String,
    parsed: ParsedSql,
    binder: Arc<Binder>,
}

impl Query {
    pub fn new(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let parsed = ParsedSql::parse(&sql);
        Self {
            sql,
            parsed,
            binder: Arc::default(),
        }
    }

    /// Use `binder` to convert every value before it reaches the driver.
    pub fn with_binder(mut self, binder: Arc<Binder>) -> Self {
        self.binder = binder;
        self
    }

    /// The SQL text as written.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Distinct placeholder names in first-occurrence order.
    pub fn names(&self) -> &[String] {
        self.parsed.names()
    }

    /// The SQL text with positional markers in `style`.
    pub fn render(&self, style: Placeholder) -> String {
        self.parsed.render(style)
    }

    /// Bind parameters by name.
    ///
    /// Fails with a binding error when a name is supplied twice, matches no
    /// placeholder, or when a placeholder has no value.
    pub fn on<'a>(&self, params: impl IntoIterator<Item = Param<'a>>) -> Result<Bound<'_, 'a>> {
        let params: Vec<Param<'a>> = params.into_iter().collect();
        let slots = self.slots(params.iter().map(Param::name))?;
        Ok(Bound {
            query: self,
            params,
            slots,
        })
    }

    /// Bind the fields `dctor` extracts from `item`.
    pub fn on_item<'a, T: Sync>(&'a self, item: &'a T, dctor: &'a Dctor<T>) -> Result<Bound<'a, 'a>> {
        self.on(dctor.params(item))
    }

    /// Execute once per batch item, returning the per-item affected row counts.
    ///
    /// Field names are checked against the placeholders once, and every item is
    /// deconstructed (running connection-aware fields in declaration order)
    /// before the rows are handed to the driver. Whether items before a failing
    /// one stay applied is up to the driver and the caller's transaction.
    pub fn execute_batch<T>(&self, batch: &Batch<T>, conn: &dyn Connection) -> Result<Vec<u64>> {
        let dctor = batch.dctor();
        let slots = self.slots(dctor.names())?;
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let rows = batch
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let values = dctor
                    .deconstruct(item, conn)
                    .map_err(|e| Error::BatchItem {
                        index,
                        source: Box::new(e),
                    })?
                    .into_iter()
                    .map(|(_, v)| self.binder.convert(v))
                    .collect();
                Ok(arrange(values, &slots))
            })
            .collect::<Result<Vec<_>>>()?;

        let sql = self.render(conn.placeholder());
        debug!(
            backend = conn.backend_name(),
            items = rows.len(),
            params = slots.len(),
            "executing batch"
        );
        conn.execute_batch(&sql, &rows)
    }

    /// For each placeholder, the index of the supplied name that fills it.
    fn slots<'n>(&self, supplied: impl IntoIterator<Item = &'n str>) -> Result<Vec<usize>> {
        let supplied: Vec<&str> = supplied.into_iter().collect();

        let mut seen = HashSet::with_capacity(supplied.len());
        for name in &supplied {
            if !seen.insert(*name) {
                return Err(Error::DuplicateParam { name: name.to_string() });
            }
            if !self.names().iter().any(|n| n == name) {
                return Err(Error::UnknownParam { name: name.to_string() });
            }
        }

        self.names()
            .iter()
            .map(|name| {
                supplied
                    .iter()
                    .position(|s| s == name)
                    .ok_or_else(|| Error::MissingParam { name: name.clone() })
            })
            .collect()
    }
}

impl FromStr for Query {
    type Err = std::convert::Infallible;

    fn from_str(sql: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Query::new(sql))
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("sql", &self.sql)
            .field("names", &self.names())
            .finish()
    }
}

/// Reorder values given in supplied order into placeholder order.
fn arrange(values: Vec<Value>, slots: &[usize]) -> Vec<Value> {
    let mut values: Vec<Option<Value>> = values.into_iter().map(Some).collect();
    slots
        .iter()
        .map(|&i| values.get_mut(i).and_then(Option::take).unwrap_or(Value::Null))
        .collect()
}

/// A query whose placeholders are all bound, ready to run.
pub struct Bound<'q, 'a> {
    query: &'q Query,
    params: Vec<Param<'a>>,
    slots: Vec<usize>,
}

impl Bound<'_, '_> {
    pub fn query(&self) -> &Query {
        self.query
    }

    /// Resolve parameters in supplied order, convert them, and render the SQL
    /// for `conn`.
    fn prepare(&self, conn: &dyn Connection) -> Result<(String, Vec<Value>)> {
        let values = self
            .params
            .iter()
            .map(|p| p.resolve(conn).map(|v| self.query.binder.convert(v)))
            .collect::<Result<Vec<_>>>()?;
        let values = arrange(values, &self.slots);
        let sql = self.query.render(conn.placeholder());

        debug!(backend = conn.backend_name(), params = values.len(), "executing statement");
        trace!(sql = %sql);
        Ok((sql, values))
    }

    /// Run a statement, returning the number of affected rows.
    pub fn execute(&self, conn: &dyn Connection) -> Result<u64> {
        let (sql, values) = self.prepare(conn)?;
        conn.execute(&sql, &values)
    }

    /// Run an insert, returning the generated key(s).
    pub fn execute_insert(&self, conn: &dyn Connection) -> Result<Vec<Value>> {
        let (sql, values) = self.prepare(conn)?;
        conn.execute_insert(&sql, &values)
    }

    /// Run a read and parse the whole result set.
    ///
    /// The cursor is released before this returns.
    pub fn fetch<R>(&self, parser: &ResultSetParser<R>, conn: &dyn Connection) -> Result<R> {
        let (sql, values) = self.prepare(conn)?;
        let mut parsed = None;
        conn.query(&sql, &values, &mut |cursor| {
            parsed = Some(parser.parse(cursor, conn)?);
            Ok(())
        })?;
        parsed.ok_or_else(scope_not_run)
    }

    /// Run a read and hand a lazy row stream to `consume`.
    ///
    /// The stream borrows the open cursor and cannot escape `consume`; the
    /// cursor is released exactly once when `consume` returns, whether it
    /// drained the stream, stopped early, or failed.
    pub fn stream<T, R, F>(&self, parser: &RowParser<T>, conn: &dyn Connection, consume: F) -> Result<R>
    where
        T: 'static,
        F: FnOnce(RowStream<'_, T>) -> Result<R>,
    {
        let (sql, values) = self.prepare(conn)?;
        let mut consume = Some(consume);
        let mut result = None;
        conn.query(&sql, &values, &mut |cursor| {
            if let Some(consume) = consume.take() {
                result = Some(consume(RowStream::new(cursor, conn, parser))?);
            }
            Ok(())
        })?;
        result.ok_or_else(scope_not_run)
    }
}

fn scope_not_run() -> Error {
    DriverError::Other("driver returned without running the cursor scope".to_string()).into()
}

impl fmt::Debug for Bound<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bound")
            .field("query", self.query)
            .field("params", &self.params)
            .finish()
    }
}
