//! Named parameters and the value-conversion chain applied before binding.

use std::fmt;

use crate::backend::Connection;
use crate::error::Result;
use crate::value::Value;

/// Resolver for a parameter whose value needs the connection first
/// (e.g. inserting a referenced row to obtain its generated key).
pub type Deferred<'a> = Box<dyn Fn(&dyn Connection) -> Result<Value> + Send + Sync + 'a>;

enum Source<'a> {
    Value(Value),
    Deferred(Deferred<'a>),
}

/// A name bound to a value, or to a connection-aware resolver for one.
pub struct Param<'a> {
    name: String,
    source: Source<'a>,
}

impl<'a> Param<'a> {
    /// Bind `name` to an immediate value.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            source: Source::Value(value.into()),
        }
    }

    /// Bind `name` to a value produced against the executing connection.
    ///
    /// The resolver runs once per execution, on the same connection the
    /// statement is executed on, before the statement itself.
    pub fn deferred<F, V>(name: impl Into<String>, resolve: F) -> Self
    where
        F: Fn(&dyn Connection) -> Result<V> + Send + Sync + 'a,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            source: Source::Deferred(Box::new(move |conn| resolve(conn).map(Into::into))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.source, Source::Deferred(_))
    }

    /// Produce the raw value, running the resolver if there is one.
    pub fn resolve(&self, conn: &dyn Connection) -> Result<Value> {
        match &self.source {
            Source::Value(v) => Ok(v.clone()),
            Source::Deferred(resolve) => resolve(conn),
        }
    }
}

impl fmt::Debug for Param<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Param");
        s.field("name", &self.name);
        match &self.source {
            Source::Value(v) => s.field("value", v),
            Source::Deferred(_) => s.field("value", &"<deferred>"),
        };
        s.finish()
    }
}

/// A single conversion step applied to every value before it is bound.
///
/// Returns `None` when the converter does not apply to `value`.
pub trait ValueConverter: Send + Sync {
    fn convert(&self, value: &Value) -> Option<Value>;
}

impl<F> ValueConverter for F
where
    F: Fn(&Value) -> Option<Value> + Send + Sync,
{
    fn convert(&self, value: &Value) -> Option<Value> {
        self(value)
    }
}

/// Ordered converter chain used when lowering parameters to driver values.
///
/// Converters are tried in order and the first one that changes the value
/// wins. A converter returning the value as it was counts as not applying.
/// With no converters (the default) every value is bound unchanged.
#[derive(Default)]
pub struct Binder {
    converters: Vec<Box<dyn ValueConverter>>,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a converter to the end of the chain.
    pub fn with_converter(mut self, converter: impl ValueConverter + 'static) -> Self {
        self.converters.push(Box::new(converter));
        self
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Apply the first converter that changes `value`, or return it unchanged.
    pub fn convert(&self, value: Value) -> Value {
        self.converters
            .iter()
            .find_map(|c| c.convert(&value).filter(|converted| *converted != value))
            .unwrap_or(value)
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("converters", &self.converters.len())
            .finish()
    }
}

/// Converter that stores JSON documents as their text form.
///
/// Useful for drivers without a JSON column type.
pub fn json_as_text(value: &Value) -> Option<Value> {
    match value {
        Value::Json(j) => Some(Value::Text(j.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn no_conn() -> rusqlite::Connection {
        rusqlite::Connection::open_in_memory().expect("Failed to open in-memory SQLite")
    }

    #[rstest]
    fn test_empty_binder_is_identity() {
        let binder = Binder::new();
        assert!(binder.is_empty());
        assert_eq!(binder.convert(Value::from("x")), Value::from("x"));
    }

    #[rstest]
    fn test_first_applicable_converter_wins() {
        let binder = Binder::new()
            .with_converter(|v: &Value| match v {
                Value::Bool(b) => Some(Value::Int(i64::from(*b))),
                _ => None,
            })
            .with_converter(|_: &Value| Some(Value::from("fallback")))
            .with_converter(|_: &Value| Some(Value::from("never")));

        assert_eq!(binder.len(), 3);
        assert_eq!(binder.convert(Value::Bool(true)), Value::Int(1));
        assert_eq!(binder.convert(Value::Int(5)), Value::from("fallback"));
    }

    #[rstest]
    fn test_converter_returning_same_value_is_skipped() {
        let binder = Binder::new()
            .with_converter(|v: &Value| Some(v.clone()))
            .with_converter(|_: &Value| Some(Value::from("changed")));

        assert_eq!(binder.convert(Value::Int(1)), Value::from("changed"));
    }

    #[rstest]
    fn test_unchanged_by_every_converter() {
        let binder = Binder::new()
            .with_converter(|v: &Value| Some(v.clone()))
            .with_converter(|v: &Value| v.as_str().map(|s| Value::from(s.to_string())));

        assert_eq!(binder.convert(Value::from("same")), Value::from("same"));
    }

    #[rstest]
    fn test_skips_converters_that_do_not_apply() {
        let binder = Binder::new()
            .with_converter(|_: &Value| -> Option<Value> { None })
            .with_converter(json_as_text);

        let converted = binder.convert(Value::Json(serde_json::json!({"k": [1]})));
        assert_eq!(converted, Value::Text(r#"{"k":[1]}"#.to_string()));
        assert_eq!(binder.convert(Value::Int(3)), Value::Int(3));
    }

    #[rstest]
    fn test_deferred_param_resolves_on_connection() {
        let conn = no_conn();
        let param = Param::deferred("answer", |c: &dyn Connection| {
            assert_eq!(c.backend_name(), "Sqlite");
            Ok(42)
        });

        assert!(param.is_deferred());
        assert_eq!(param.resolve(&conn).unwrap(), Value::Int(42));
    }

    #[rstest]
    fn test_immediate_param() {
        let conn = no_conn();
        let param = Param::new("title", "Dune");
        assert_eq!(param.name(), "title");
        assert!(!param.is_deferred());
        assert_eq!(param.resolve(&conn).unwrap(), Value::from("Dune"));
    }

    #[rstest]
    fn test_debug_hides_resolver() {
        let param = Param::deferred("id", |_: &dyn Connection| Ok(1));
        assert_eq!(format!("{:?}", param), r#"Param { name: "id", value: "<deferred>" }"#);
    }
}
