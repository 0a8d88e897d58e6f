//! Row parsers and result-set parsers.
//!
//! A [`RowParser`] turns one result row (plus the connection the row came
//! from, for nested lookups) into a value. Parsers are immutable, cheap to
//! clone, and composable with [`RowParser::map`], [`RowParser::flat_map`] and
//! [`RowParser::and`]. A [`ResultSetParser`] decides how many rows a read must
//! produce: exactly one, at most one, or any number.
//!
//! Every row parser consumes exactly one row. One-to-many structures are
//! built by issuing a nested statement on the supplied connection from inside
//! the parser, never by reading ahead on the outer cursor.
//!
//! # Examples
//!
//! ```ignore
//! let author = parser::string("name")
//!     .and(parser::get::<Option<NaiveDate>>("birth_day"))
//!     .map(|(name, birth_day)| Author { name, birth_day });
//!
//! let authors = Query::new("SELECT name, birth_day FROM author")
//!     .on([])?
//!     .fetch(&author.list(), &conn)?;
//! ```

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::backend::{Connection, Cursor, Row};
use crate::error::{Error, Result};
use crate::value::{FromValue, Value};

type ParseFn<T> = dyn Fn(&dyn Row, &dyn Connection) -> Result<T> + Send + Sync;
type ResultSetFn<R> = dyn Fn(&mut dyn Cursor, &dyn Connection) -> Result<R> + Send + Sync;

/// Maps one result row into a `T`.
pub struct RowParser<T> {
    parse: Arc<ParseFn<T>>,
}

impl<T> Clone for RowParser<T> {
    fn clone(&self) -> Self {
        Self {
            parse: Arc::clone(&self.parse),
        }
    }
}

impl<T: 'static> RowParser<T> {
    /// Parser with access to the connection the row was read from.
    ///
    /// The connection is the one executing the enclosing query and is only
    /// valid for the duration of the call.
    pub fn new<F>(parse: F) -> Self
    where
        F: Fn(&dyn Row, &dyn Connection) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            parse: Arc::new(parse),
        }
    }

    /// Parser that only looks at the row.
    pub fn from_row<F>(parse: F) -> Self
    where
        F: Fn(&dyn Row) -> Result<T> + Send + Sync + 'static,
    {
        Self::new(move |row, _conn| parse(row))
    }

    /// Parse a single row.
    pub fn parse(&self, row: &dyn Row, conn: &dyn Connection) -> Result<T> {
        (self.parse)(row, conn)
    }

    /// Transform the parsed value.
    pub fn map<U, F>(self, f: F) -> RowParser<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        RowParser::new(move |row, conn| self.parse(row, conn).map(&f))
    }

    /// Transform the parsed value with a step that may fail.
    pub fn try_map<U, F>(self, f: F) -> RowParser<U>
    where
        U: 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        RowParser::new(move |row, conn| self.parse(row, conn).and_then(&f))
    }

    /// Choose the next parser from the value this one produced; the next parser
    /// reads the same row.
    pub fn flat_map<U, F>(self, f: F) -> RowParser<U>
    where
        U: 'static,
        F: Fn(T) -> RowParser<U> + Send + Sync + 'static,
    {
        RowParser::new(move |row, conn| {
            let first = self.parse(row, conn)?;
            f(first).parse(row, conn)
        })
    }

    /// Run both parsers on the same row and pair the results.
    pub fn and<U: 'static>(self, other: RowParser<U>) -> RowParser<(T, U)> {
        RowParser::new(move |row, conn| Ok((self.parse(row, conn)?, other.parse(row, conn)?)))
    }

    /// Exactly one row; fails with [`Error::NoRows`] or [`Error::TooManyRows`].
    pub fn single(&self) -> ResultSetParser<T> {
        let parser = self.clone();
        ResultSetParser::new(move |cursor, conn| {
            let value = match cursor.next_row()? {
                Some(row) => parser.parse(row, conn)?,
                None => return Err(Error::NoRows),
            };
            if cursor.next_row()?.is_some() {
                return Err(Error::TooManyRows);
            }
            Ok(value)
        })
    }

    /// At most one row; zero rows yields `None`.
    pub fn single_opt(&self) -> ResultSetParser<Option<T>> {
        let parser = self.clone();
        ResultSetParser::new(move |cursor, conn| {
            let value = match cursor.next_row()? {
                Some(row) => parser.parse(row, conn)?,
                None => return Ok(None),
            };
            if cursor.next_row()?.is_some() {
                return Err(Error::TooManyRows);
            }
            Ok(Some(value))
        })
    }

    /// Every row, in result order.
    pub fn list(&self) -> ResultSetParser<Vec<T>> {
        let parser = self.clone();
        ResultSetParser::new(move |cursor, conn| {
            let mut values = Vec::new();
            while let Some(row) = cursor.next_row()? {
                values.push(parser.parse(row, conn)?);
            }
            Ok(values)
        })
    }
}

/// Turns a whole result set into an `R`.
///
/// The cursor is consumed eagerly and released before the read returns.
pub struct ResultSetParser<R> {
    parse: Arc<ResultSetFn<R>>,
}

impl<R> Clone for ResultSetParser<R> {
    fn clone(&self) -> Self {
        Self {
            parse: Arc::clone(&self.parse),
        }
    }
}

impl<R> ResultSetParser<R> {
    pub fn new<F>(parse: F) -> Self
    where
        F: Fn(&mut dyn Cursor, &dyn Connection) -> Result<R> + Send + Sync + 'static,
    {
        Self {
            parse: Arc::new(parse),
        }
    }

    pub fn parse(&self, cursor: &mut dyn Cursor, conn: &dyn Connection) -> Result<R> {
        (self.parse)(cursor, conn)
    }
}

/// Lazy sequence of parsed rows over an open cursor.
///
/// Only exists inside the scope given to `Bound::stream`; the cursor is
/// released when that scope returns, whether or not the stream was drained.
pub struct RowStream<'c, T> {
    cursor: &'c mut dyn Cursor,
    conn: &'c dyn Connection,
    parser: &'c RowParser<T>,
    done: bool,
}

impl<'c, T> RowStream<'c, T> {
    pub(crate) fn new(cursor: &'c mut dyn Cursor, conn: &'c dyn Connection, parser: &'c RowParser<T>) -> Self {
        Self {
            cursor,
            conn,
            parser,
            done: false,
        }
    }
}

impl<T: 'static> Iterator for RowStream<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.next_row() {
            Ok(Some(row)) => Some(self.parser.parse(row, self.conn)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Column reference by name (case-insensitive) or zero-based index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Name(String),
    Index(usize),
}

impl Column {
    fn locate(&self, row: &dyn Row) -> Result<usize> {
        match self {
            Column::Name(name) => row.index_of(name).ok_or_else(|| Error::MissingColumn { name: name.clone() }),
            Column::Index(i) if *i < row.len() => Ok(*i),
            Column::Index(i) => Err(Error::MissingColumn {
                name: format!("#{}", i),
            }),
        }
    }

    fn label(&self, row: &dyn Row, index: usize) -> String {
        match self {
            Column::Name(name) => name.clone(),
            Column::Index(_) => row
                .column_name(index)
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", index)),
        }
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::Name(name.to_string())
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::Name(name)
    }
}

impl From<usize> for Column {
    fn from(index: usize) -> Self {
        Column::Index(index)
    }
}

/// Read one column as `T`. Use `Option<T>` for nullable columns.
pub fn get<T: FromValue + 'static>(column: impl Into<Column>) -> RowParser<T> {
    let column = column.into();
    RowParser::from_row(move |row| {
        let index = column.locate(row)?;
        let value = row.value(index)?;
        T::from_value(value, &column.label(row, index))
    })
}

/// Non-null text column.
pub fn string(column: impl Into<Column>) -> RowParser<String> {
    get(column)
}

/// Non-null integer column that fits in an `i32`.
pub fn int(column: impl Into<Column>) -> RowParser<i32> {
    get(column)
}

/// Non-null integer column.
pub fn long(column: impl Into<Column>) -> RowParser<i64> {
    get(column)
}

/// Non-null numeric column as `f64`.
pub fn double(column: impl Into<Column>) -> RowParser<f64> {
    get(column)
}

/// Non-null boolean column (SQLite 0/1 accepted).
pub fn boolean(column: impl Into<Column>) -> RowParser<bool> {
    get(column)
}

/// Non-null date column (SQLite `YYYY-MM-DD` text accepted).
pub fn date(column: impl Into<Column>) -> RowParser<NaiveDate> {
    get(column)
}

/// Non-null timestamp column.
pub fn timestamp(column: impl Into<Column>) -> RowParser<NaiveDateTime> {
    get(column)
}

/// Non-null binary column.
pub fn bytes(column: impl Into<Column>) -> RowParser<Vec<u8>> {
    get(column)
}

/// Non-null JSON column (JSON text accepted).
pub fn json(column: impl Into<Column>) -> RowParser<serde_json::Value> {
    get(column)
}

/// Raw column value, NULL included.
pub fn value(column: impl Into<Column>) -> RowParser<Value> {
    get(column)
}

/// Every column of the row as `(name, value)` pairs.
pub fn columns() -> RowParser<Vec<(String, Value)>> {
    RowParser::from_row(|row| {
        (0..row.len())
            .map(|i| {
                let name = row.column_name(i).map_or_else(|| format!("#{}", i), str::to_string);
                Ok((name, row.value(i)?))
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{VecCursor, ValueRow, mem_db};
    use rstest::rstest;

    fn author_row(name: &str, birth_day: Value) -> ValueRow {
        ValueRow::new(vec![("name", Value::from(name)), ("birth_day", birth_day)])
    }

    #[derive(Debug, PartialEq)]
    struct Author {
        name: String,
        birth_day: Option<NaiveDate>,
    }

    #[rstest]
    fn test_flat_map_reads_sibling_column_with_null_date() {
        let conn = mem_db();
        let parser = string("name").flat_map(|name| {
            get::<Option<NaiveDate>>("birth_day").map(move |birth_day| Author {
                name: name.clone(),
                birth_day,
            })
        });

        let author = parser.parse(&author_row("A. Author", Value::Null), &conn).unwrap();
        assert_eq!(
            author,
            Author {
                name: "A. Author".to_string(),
                birth_day: None,
            }
        );
    }

    #[rstest]
    fn test_and_pairs_columns() {
        let conn = mem_db();
        let parser = string("name").and(date("birth_day"));
        let (name, day) = parser
            .parse(&author_row("B", Value::from("1920-01-02")), &conn)
            .unwrap();
        assert_eq!(name, "B");
        assert_eq!(day, NaiveDate::from_ymd_opt(1920, 1, 2).unwrap());
    }

    #[rstest]
    fn test_map_and_try_map() {
        let conn = mem_db();
        let row = ValueRow::new(vec![("n", Value::Int(21))]);

        let doubled = long("n").map(|n| n * 2);
        assert_eq!(doubled.parse(&row, &conn).unwrap(), 42);

        let rejected = long("n").try_map(|n| {
            if n > 10 {
                Err(Error::MissingColumn { name: "small".into() })
            } else {
                Ok(n)
            }
        });
        assert!(rejected.parse(&row, &conn).is_err());
    }

    #[rstest]
    fn test_column_by_index() {
        let conn = mem_db();
        let row = author_row("C", Value::Null);
        assert_eq!(string(0).parse(&row, &conn).unwrap(), "C");
        let err = string(5).parse(&row, &conn).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref name } if name == "#5"));
    }

    #[rstest]
    fn test_null_in_required_column_names_column_by_index() {
        let conn = mem_db();
        let row = author_row("C", Value::Null);
        let err = date(1).parse(&row, &conn).unwrap_err();
        assert_eq!(err.to_string(), "Column 'birth_day' is NULL");
    }

    #[rstest]
    fn test_missing_column_by_name() {
        let conn = mem_db();
        let err = long("id").parse(&author_row("C", Value::Null), &conn).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref name } if name == "id"));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(3)]
    fn test_list_returns_every_row(#[case] count: usize) {
        let conn = mem_db();
        let rows = (0..count)
            .map(|i| ValueRow::new(vec![("n", Value::Int(i as i64))]))
            .collect();
        let mut cursor = VecCursor::new(rows);

        let values = long("n").list().parse(&mut cursor, &conn).unwrap();
        assert_eq!(values, (0..count as i64).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_single_cardinality() {
        let conn = mem_db();
        let one = || VecCursor::new(vec![ValueRow::new(vec![("n", Value::Int(1))])]);
        let two = || {
            VecCursor::new(vec![
                ValueRow::new(vec![("n", Value::Int(1))]),
                ValueRow::new(vec![("n", Value::Int(2))]),
            ])
        };
        let parser = long("n");

        assert_eq!(parser.single().parse(&mut one(), &conn).unwrap(), 1);
        assert!(matches!(
            parser.single().parse(&mut VecCursor::new(vec![]), &conn),
            Err(Error::NoRows)
        ));
        assert!(matches!(parser.single().parse(&mut two(), &conn), Err(Error::TooManyRows)));
    }

    #[rstest]
    fn test_single_opt_cardinality() {
        let conn = mem_db();
        let parser = long("n");

        assert_eq!(
            parser.single_opt().parse(&mut VecCursor::new(vec![]), &conn).unwrap(),
            None
        );
        let mut one = VecCursor::new(vec![ValueRow::new(vec![("n", Value::Int(9))])]);
        assert_eq!(parser.single_opt().parse(&mut one, &conn).unwrap(), Some(9));
    }

    #[rstest]
    fn test_row_stream_reports_parse_errors_per_row() {
        let conn = mem_db();
        let rows = vec![
            ValueRow::new(vec![("n", Value::Int(1))]),
            ValueRow::new(vec![("n", Value::from("oops"))]),
            ValueRow::new(vec![("n", Value::Int(3))]),
        ];
        let mut cursor = VecCursor::new(rows);
        let parser = long("n");

        let results: Vec<_> = RowStream::new(&mut cursor, &conn, &parser).collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), &1);
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap(), &3);
    }

    #[rstest]
    fn test_columns_parser() {
        let conn = mem_db();
        let row = author_row("D", Value::Null);
        let cols = columns().parse(&row, &conn).unwrap();
        assert_eq!(
            cols,
            vec![
                ("name".to_string(), Value::from("D")),
                ("birth_day".to_string(), Value::Null),
            ]
        );
    }
}
