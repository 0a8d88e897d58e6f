//! Integration tests against a live PostgreSQL server.
//!
//! These tests require a local PostgreSQL instance.
//! Run with: cargo test -p quarry --features postgres-tests
//!
//! Prerequisites:
//! 1. PostgreSQL listening on localhost
//! 2. Create test database: `createdb -U postgres quarry_test`
//!
//! Each test works in its own temporary table, so tests can run in parallel.

#![cfg(feature = "postgres-tests")]

use chrono::NaiveDate;
use quarry::parser::{get, long, string};
use quarry::{Batch, Dctor, Error, Param, PgConnection, Query, Value, field};

/// Test connection string for PostgreSQL (local instance)
const PG_CONNECTION: &str = "host=localhost user=postgres dbname=quarry_test";

fn connect() -> PgConnection {
    PgConnection::connect(PG_CONNECTION).expect("Failed to connect to PostgreSQL")
}

fn create_books(conn: &PgConnection) {
    Query::new(
        "CREATE TEMPORARY TABLE book (
            id SERIAL PRIMARY KEY,
            isbn TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            published DATE,
            pages INT4,
            meta JSONB
        )",
    )
    .on([])
    .unwrap()
    .execute(conn)
    .unwrap();
}

#[derive(Debug, Clone, PartialEq)]
struct Book {
    isbn: String,
    title: String,
    published: Option<NaiveDate>,
    pages: Option<i64>,
}

fn book_dctor() -> Dctor<Book> {
    Dctor::new(vec![
        field("isbn", |b: &Book| b.isbn.clone()),
        field("title", |b: &Book| b.title.clone()),
        field("published", |b: &Book| b.published),
        field("pages", |b: &Book| b.pages),
    ])
}

fn books() -> Vec<Book> {
    vec![
        Book {
            isbn: "978-0441013593".into(),
            title: "Dune".into(),
            published: NaiveDate::from_ymd_opt(1965, 8, 1),
            pages: Some(617),
        },
        Book {
            isbn: "978-0553293357".into(),
            title: "Foundation".into(),
            published: None,
            pages: None,
        },
    ]
}

#[test]
fn test_batch_then_select_with_dollar_placeholders() {
    let conn = connect();
    create_books(&conn);

    let insert = Query::new("INSERT INTO book (isbn, title, published, pages) VALUES (:isbn, :title, :published, :pages)");
    assert_eq!(insert.render(quarry::Placeholder::Dollar), "INSERT INTO book (isbn, title, published, pages) VALUES ($1, $2, $3, $4)");

    let counts = insert.execute_batch(&Batch::new(books(), book_dctor()), &conn).unwrap();
    assert_eq!(counts, vec![1, 1]);

    let parser = string("isbn")
        .and(string("title"))
        .and(get::<Option<NaiveDate>>("published"))
        .and(get::<Option<i64>>("pages"))
        .map(|(((isbn, title), published), pages)| Book {
            isbn,
            title,
            published,
            pages,
        });
    let loaded = Query::new("SELECT isbn, title, published, pages FROM book ORDER BY id")
        .on([])
        .unwrap()
        .fetch(&parser.list(), &conn)
        .unwrap();
    assert_eq!(loaded, books());
}

#[test]
fn test_execute_insert_uses_returning_clause() {
    let conn = connect();
    create_books(&conn);

    let keys = Query::new("INSERT INTO book (isbn, title) VALUES (:isbn, :title) RETURNING id")
        .on([Param::new("isbn", "x-1"), Param::new("title", "Untitled")])
        .unwrap()
        .execute_insert(&conn)
        .unwrap();
    assert_eq!(keys, vec![Value::Int(1)]);

    let no_keys = Query::new("INSERT INTO book (isbn, title) VALUES (:isbn, :title)")
        .on([Param::new("isbn", "x-2"), Param::new("title", "Untitled")])
        .unwrap()
        .execute_insert(&conn)
        .unwrap();
    assert!(no_keys.is_empty());
}

#[test]
fn test_json_and_cast_syntax() {
    let conn = connect();
    create_books(&conn);

    Query::new("INSERT INTO book (isbn, title, meta) VALUES (:isbn, :title, :meta)")
        .on([
            Param::new("isbn", "x-1"),
            Param::new("title", "Tagged"),
            Param::new("meta", serde_json::json!({"tags": ["sf"]})),
        ])
        .unwrap()
        .execute(&conn)
        .unwrap();

    let tag = Query::new("SELECT meta->'tags'->>0 AS tag, id::int8 AS id FROM book WHERE isbn = :isbn")
        .on([Param::new("isbn", "x-1")])
        .unwrap()
        .fetch(&string("tag").and(long("id")).single(), &conn)
        .unwrap();
    assert_eq!(tag, ("sf".to_string(), 1));
}

#[test]
fn test_nested_statement_inside_parser() {
    let conn = connect();
    create_books(&conn);
    Query::new("INSERT INTO book (isbn, title) VALUES ('a', 'A'), ('b', 'B')")
        .on([])
        .unwrap()
        .execute(&conn)
        .unwrap();

    let count_query = Query::new("SELECT COUNT(*) AS n FROM book WHERE isbn <> :isbn");
    let parser = quarry::RowParser::new(move |row, c| {
        let isbn = string("isbn").parse(row, c)?;
        let others = count_query
            .on([Param::new("isbn", isbn.as_str())])?
            .fetch(&long("n").single(), c)?;
        Ok((isbn, others))
    });

    let rows = Query::new("SELECT isbn FROM book ORDER BY isbn")
        .on([])
        .unwrap()
        .fetch(&parser.list(), &conn)
        .unwrap();
    assert_eq!(rows, vec![("a".to_string(), 1), ("b".to_string(), 1)]);
}

#[test]
fn test_driver_error_passes_through() {
    let conn = connect();
    let err = Query::new("SELECT * FROM no_such_table")
        .on([])
        .unwrap()
        .fetch(&long(0).list(), &conn)
        .unwrap_err();
    assert!(matches!(err, Error::Driver(_)));
}
