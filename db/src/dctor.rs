//! Deconstructors: decomposing domain values into named column values.
//!
//! A [`Dctor`] is the write-side counterpart of a row parser. Each [`Field`]
//! names a placeholder and extracts its value from an item, either directly
//! ([`field`]) or against the executing connection ([`field_with`]), e.g. to
//! insert a referenced row first and bind its generated key.

use std::fmt;
use std::sync::Arc;

use crate::backend::Connection;
use crate::error::Result;
use crate::param::Param;
use crate::value::Value;

type ExtractFn<T> = dyn Fn(&T) -> Value + Send + Sync;
type ResolveFn<T> = dyn Fn(&T, &dyn Connection) -> Result<Value> + Send + Sync;

enum Extract<T> {
    Value(Arc<ExtractFn<T>>),
    Deferred(Arc<ResolveFn<T>>),
}

impl<T> Clone for Extract<T> {
    fn clone(&self) -> Self {
        match self {
            Extract::Value(f) => Extract::Value(Arc::clone(f)),
            Extract::Deferred(f) => Extract::Deferred(Arc::clone(f)),
        }
    }
}

/// One named column of a deconstructor.
pub struct Field<T> {
    name: String,
    extract: Extract<T>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            extract: self.extract.clone(),
        }
    }
}

impl<T> Field<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.extract, Extract::Deferred(_))
    }
}

/// Field whose value comes straight from the item.
pub fn field<T, V, F>(name: impl Into<String>, extract: F) -> Field<T>
where
    V: Into<Value>,
    F: Fn(&T) -> V + Send + Sync + 'static,
{
    Field {
        name: name.into(),
        extract: Extract::Value(Arc::new(move |item| extract(item).into())),
    }
}

/// Field whose value is produced against the executing connection.
///
/// Resolved once per execution, before the statement runs.
pub fn field_with<T, V, F>(name: impl Into<String>, resolve: F) -> Field<T>
where
    V: Into<Value>,
    F: Fn(&T, &dyn Connection) -> Result<V> + Send + Sync + 'static,
{
    Field {
        name: name.into(),
        extract: Extract::Deferred(Arc::new(move |item, conn| resolve(item, conn).map(Into::into))),
    }
}

/// Ordered set of fields that turns an item into named parameters.
pub struct Dctor<T> {
    fields: Arc<[Field<T>]>,
}

impl<T> Clone for Dctor<T> {
    fn clone(&self) -> Self {
        Self {
            fields: Arc::clone(&self.fields),
        }
    }
}

impl<T> Dctor<T> {
    pub fn new(fields: Vec<Field<T>>) -> Self {
        Self {
            fields: fields.into(),
        }
    }

    /// Field names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(Field::name).collect()
    }

    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    /// Parameters for `item`, in declaration order.
    ///
    /// Connection-aware fields become deferred parameters borrowing `item`.
    pub fn params<'a>(&'a self, item: &'a T) -> Vec<Param<'a>>
    where
        T: Sync,
    {
        self.fields
            .iter()
            .map(|f| match &f.extract {
                Extract::Value(extract) => Param::new(f.name.clone(), extract(item)),
                Extract::Deferred(resolve) => {
                    Param::deferred(f.name.clone(), move |conn: &dyn Connection| resolve(item, conn))
                }
            })
            .collect()
    }

    /// Resolve every field of `item`, running connection-aware fields in
    /// declaration order.
    pub fn deconstruct(&self, item: &T, conn: &dyn Connection) -> Result<Vec<(String, Value)>> {
        self.fields
            .iter()
            .map(|f| {
                let value = match &f.extract {
                    Extract::Value(extract) => extract(item),
                    Extract::Deferred(resolve) => resolve(item, conn)?,
                };
                Ok((f.name.clone(), value))
            })
            .collect()
    }
}

impl<T> fmt::Debug for Dctor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dctor").field("fields", &self.names()).finish()
    }
}

/// Items paired with the deconstructor that turns each into parameters.
pub struct Batch<T> {
    items: Vec<T>,
    dctor: Dctor<T>,
}

impl<T> Batch<T> {
    pub fn new(items: Vec<T>, dctor: Dctor<T>) -> Self {
        Self { items, dctor }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn dctor(&self) -> &Dctor<T> {
        &self.dctor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mem_db;
    use rstest::rstest;

    struct Book {
        isbn: String,
        title: String,
        pages: Option<i64>,
    }

    fn book_dctor() -> Dctor<Book> {
        Dctor::new(vec![
            field("isbn", |b: &Book| b.isbn.clone()),
            field("title", |b: &Book| b.title.clone()),
            field("pages", |b: &Book| b.pages),
        ])
    }

    fn dune() -> Book {
        Book {
            isbn: "978-0441013593".into(),
            title: "Dune".into(),
            pages: None,
        }
    }

    #[rstest]
    fn test_names_in_declaration_order() {
        assert_eq!(book_dctor().names(), vec!["isbn", "title", "pages"]);
    }

    #[rstest]
    fn test_deconstruct_plain_fields() {
        let conn = mem_db();
        let values = book_dctor().deconstruct(&dune(), &conn).unwrap();
        assert_eq!(
            values,
            vec![
                ("isbn".to_string(), Value::from("978-0441013593")),
                ("title".to_string(), Value::from("Dune")),
                ("pages".to_string(), Value::Null),
            ]
        );
    }

    #[rstest]
    fn test_deferred_fields_resolve_in_declaration_order() {
        let conn = mem_db();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (first, second) = (Arc::clone(&order), Arc::clone(&order));
        let dctor = Dctor::new(vec![
            field_with("b", move |_: &Book, _: &dyn Connection| {
                first.lock().unwrap().push("b");
                Ok(1)
            }),
            field("title", |b: &Book| b.title.clone()),
            field_with("a", move |_: &Book, _: &dyn Connection| {
                second.lock().unwrap().push("a");
                Ok(2)
            }),
        ]);

        let values = dctor.deconstruct(&dune(), &conn).unwrap();
        assert_eq!(values[0], ("b".to_string(), Value::Int(1)));
        assert_eq!(values[2], ("a".to_string(), Value::Int(2)));
        assert_eq!(*order.lock().unwrap(), vec!["b", "a"]);
    }

    #[rstest]
    fn test_params_defer_connection_fields() {
        let conn = mem_db();
        let dctor = Dctor::new(vec![
            field("title", |b: &Book| b.title.clone()),
            field_with("title_len", |b: &Book, _: &dyn Connection| Ok(b.title.len() as i64)),
        ]);
        let book = dune();
        let params = dctor.params(&book);

        assert!(!params[0].is_deferred());
        assert!(params[1].is_deferred());
        assert_eq!(params[1].resolve(&conn).unwrap(), Value::Int(4));
    }

    #[rstest]
    fn test_deferred_error_propagates() {
        let conn = mem_db();
        let dctor: Dctor<Book> = Dctor::new(vec![field_with("id", |_: &Book, c: &dyn Connection| {
            c.execute("INSERT INTO missing_table VALUES (1)", &[]).map(|n| n as i64)
        })]);
        let err = dctor.deconstruct(&dune(), &conn).unwrap_err();
        assert!(err.is_driver());
    }

    #[rstest]
    fn test_batch_accessors() {
        let batch = Batch::new(vec![dune(), dune()], book_dctor());
        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
        assert_eq!(batch.dctor().names().len(), 3);
        assert_eq!(batch.items()[1].title, "Dune");

        let empty: Batch<Book> = Batch::new(Vec::new(), book_dctor());
        assert!(empty.is_empty());
        assert!(empty.into_items().is_empty());
    }
}
