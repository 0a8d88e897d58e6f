//! Fixtures for tests.
//!
//! Loaded at compile time using `include_str!`.
//!
//! - [`BOOKSTORE_SCHEMA`] - `author`, `book` and `book_author` tables (SQLite dialect)
//! - [`BOOKS`] - three books as a JSON array, in the shape the CLI `batch` command reads

/// Book store schema.
///
/// Dates are stored as `YYYY-MM-DD` text and `book.in_print` as 0/1, the way
/// SQLite stores them.
pub const BOOKSTORE_SCHEMA: &str = include_str!("bookstore.sql");

/// Three books with distinct ISBNs; "Foundation" has no publication date.
pub const BOOKS: &str = include_str!("books.json");
