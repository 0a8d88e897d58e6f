//! Typed SQL mapping over caller-owned connections.
//!
//! Build a [`Query`] from SQL text with `:name` / `{name}` placeholders, bind
//! it with named [`Param`]s or a [`Dctor`], and map rows back into Rust values
//! with composable [`RowParser`]s. The crate never opens pools or manages
//! transactions; every operation runs on the connection it is given.

pub mod backend;
pub mod dctor;
pub mod error;
pub mod param;
pub mod parser;
pub mod placeholder;
pub mod query;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used items
pub use backend::{Connection, Cursor, Placeholder, Row};
pub use dctor::{Batch, Dctor, Field, field, field_with};
pub use error::{DriverError, Error, Result};
pub use param::{Binder, Param, ValueConverter, json_as_text};
pub use parser::{Column, ResultSetParser, RowParser, RowStream};
pub use query::{Bound, Query};
pub use value::{FromValue, Value};

#[cfg(feature = "backend-postgres")]
pub use backend::PgConnection;

#[cfg(feature = "backend-sqlite")]
pub use rusqlite;

#[cfg(feature = "backend-postgres")]
pub use postgres;
