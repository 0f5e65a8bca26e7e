use crate::{Record, Value, truncate_long};
use std::{
    collections::{BTreeMap, HashMap},
    fmt::{self, Display},
    sync::Arc,
};

/// SQL text with its positional arguments, ready for an [`Executor`](crate::Executor).
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Query {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }
}

impl From<&str> for Query {
    fn from(value: &str) -> Self {
        Query::new(value, Vec::new())
    }
}

impl From<String> for Query {
    fn from(value: String) -> Self {
        Query::new(value, Vec::new())
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))
    }
}

/// Arguments of a hand written query.
///
/// Positional arguments are bound as they are. Maps and records are used to
/// expand `:name` placeholders, see [`expand_named_query`](crate::expand_named_query).
#[derive(Clone, Copy)]
pub enum Args<'a> {
    Positional(&'a [Value]),
    Map(&'a HashMap<String, Value>),
    Ordered(&'a BTreeMap<String, Value>),
    Record(&'a dyn Record),
}

impl<'a> Args<'a> {
    pub const NONE: Args<'static> = Args::Positional(&[]);

    pub fn record<R: Record>(record: &'a R) -> Self {
        Args::Record(record)
    }
}

impl<'a> From<&'a [Value]> for Args<'a> {
    fn from(value: &'a [Value]) -> Self {
        Args::Positional(value)
    }
}

impl<'a> From<&'a Vec<Value>> for Args<'a> {
    fn from(value: &'a Vec<Value>) -> Self {
        Args::Positional(value)
    }
}

impl<'a, const N: usize> From<&'a [Value; N]> for Args<'a> {
    fn from(value: &'a [Value; N]) -> Self {
        Args::Positional(value)
    }
}

impl<'a> From<&'a HashMap<String, Value>> for Args<'a> {
    fn from(value: &'a HashMap<String, Value>) -> Self {
        Args::Map(value)
    }
}

impl<'a> From<&'a BTreeMap<String, Value>> for Args<'a> {
    fn from(value: &'a BTreeMap<String, Value>) -> Self {
        Args::Ordered(value)
    }
}

impl<'a> From<&'a dyn Record> for Args<'a> {
    fn from(value: &'a dyn Record) -> Self {
        Args::Record(value)
    }
}

impl From<()> for Args<'static> {
    fn from(_: ()) -> Self {
        Args::NONE
    }
}

/// Builds a `[Value; N]` from heterogeneous expressions.
///
/// ```rust
/// use rowbind_core::{Value, values};
/// let keys = values![7, "north"];
/// assert_eq!(keys[1], Value::Varchar(Some("north".into())));
/// ```
#[macro_export]
macro_rules! values {
    ($($value:expr),* $(,)?) => {
        [$($crate::Value::from($value)),*]
    };
}

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted identifier when available.
    pub last_affected_id: Option<i64>,
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v.eq_ignore_ascii_case(name))
            .map(|i| &self.values()[i])
    }
}

/// Heterogeneous items emitted by `Executor::run` combining rows and modify results.
#[derive(Debug)]
pub enum QueryResult {
    Row(RowLabeled),
    Affected(RowsAffected),
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_affected_id.is_some() {
                self.last_affected_id = elem.last_affected_id;
            }
        }
    }
}

impl From<RowLabeled> for QueryResult {
    fn from(value: RowLabeled) -> Self {
        QueryResult::Row(value)
    }
}

impl From<RowsAffected> for QueryResult {
    fn from(value: RowsAffected) -> Self {
        QueryResult::Affected(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_affected_accumulate() {
        let mut total = RowsAffected::default();
        total.extend([
            RowsAffected {
                rows_affected: 2,
                last_affected_id: Some(4),
            },
            RowsAffected {
                rows_affected: 1,
                last_affected_id: None,
            },
        ]);
        assert_eq!(total.rows_affected, 3);
        assert_eq!(total.last_affected_id, Some(4));
    }

    #[test]
    fn labeled_lookup_ignores_case() {
        let row = RowLabeled::new(
            ["Id".to_string(), "name".to_string()].into(),
            [Value::Int64(Some(1)), Value::Varchar(Some("Ada".into()))].into(),
        );
        assert_eq!(row.get_column("ID"), Some(&Value::Int64(Some(1))));
        assert_eq!(row.get_column("missing"), None);
    }

    #[test]
    fn positional_args() {
        let keys = values![1, "x", Some(2.5)];
        let Args::Positional(args) = Args::from(&keys) else {
            panic!("expected positional arguments");
        };
        assert_eq!(args.len(), 3);
        assert_eq!(args[2], Value::Float64(Some(2.5)));
    }
}
