use rowbind_core::{
    ColumnMap, Dialect, IntegerAutoIncrInserter, TargetQueryInserter, TargetedAutoIncrInserter,
    Value,
};
use std::fmt::Write;

/// How the id assigned to an autoincrement column is read back after an insert.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoIncrStrategy {
    /// `last_insert_rowid` reported with the statement result.
    #[default]
    Integer,
    /// `RETURNING` clause appended to the insert.
    Returning,
    /// Follow-up `SELECT last_insert_rowid()`, or the column's generated id query.
    Query,
}

#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteDialect {
    pub strategy: AutoIncrStrategy,
}

impl SqliteDialect {
    pub const LAST_INSERT_ROWID: &'static str = "SELECT last_insert_rowid();";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: AutoIncrStrategy) -> Self {
        Self { strategy }
    }
}

impl Dialect for SqliteDialect {
    fn as_dyn(&self) -> &dyn Dialect {
        self
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn write_column_type(
        &self,
        out: &mut String,
        value: &Value,
        max_size: Option<u32>,
        _auto_increment: bool,
    ) {
        match value {
            Value::Boolean(..)
            | Value::Int8(..)
            | Value::Int16(..)
            | Value::Int32(..)
            | Value::Int64(..)
            | Value::UInt8(..)
            | Value::UInt16(..)
            | Value::UInt32(..)
            | Value::UInt64(..) => out.push_str("INTEGER"),
            Value::Float32(..) | Value::Float64(..) => out.push_str("REAL"),
            Value::Varchar(..) => match max_size {
                Some(size) => {
                    let _ = write!(out, "VARCHAR({size})");
                }
                None => out.push_str("TEXT"),
            },
            Value::Blob(..) => out.push_str("BLOB"),
            Value::Decimal(..)
            | Value::Date(..)
            | Value::Time(..)
            | Value::Timestamp(..)
            | Value::TimestampWithTimezone(..)
            | Value::Uuid(..)
            | Value::Null => out.push_str("TEXT"),
        }
    }

    fn write_auto_incr(&self, out: &mut String) {
        out.push_str("AUTOINCREMENT");
    }

    fn auto_incr_bind_value(&self) -> &str {
        "NULL"
    }

    fn write_auto_incr_insert_suffix(&self, out: &mut String, column: &ColumnMap) {
        if self.strategy == AutoIncrStrategy::Returning {
            out.push_str(" RETURNING ");
            self.write_identifier_quoted(out, column.column_name());
        }
    }

    fn write_truncate_clause(&self, out: &mut String) {
        out.push_str("DELETE FROM");
    }

    fn integer_auto_incr(&self) -> Option<&dyn IntegerAutoIncrInserter> {
        if self.strategy == AutoIncrStrategy::Integer {
            Some(self)
        } else {
            None
        }
    }

    fn targeted_auto_incr(&self) -> Option<&dyn TargetedAutoIncrInserter> {
        if self.strategy == AutoIncrStrategy::Returning {
            Some(self)
        } else {
            None
        }
    }

    fn query_auto_incr(&self) -> Option<&dyn TargetQueryInserter> {
        if self.strategy == AutoIncrStrategy::Query {
            Some(self)
        } else {
            None
        }
    }
}

impl IntegerAutoIncrInserter for SqliteDialect {}

impl TargetedAutoIncrInserter for SqliteDialect {}

impl TargetQueryInserter for SqliteDialect {
    fn id_query<'c>(&self, column: &'c ColumnMap) -> Option<&'c str> {
        Some(
            column
                .generated_id_query()
                .unwrap_or(Self::LAST_INSERT_ROWID),
        )
    }
}
