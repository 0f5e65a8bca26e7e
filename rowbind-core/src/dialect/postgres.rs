use crate::{ColumnMap, Dialect, GenericDialect, TargetedAutoIncrInserter, Value};
use std::fmt::Write;

/// Postgres rendering: `$n` bind variables, serial columns and ids read back
/// through `RETURNING`.
#[derive(Default, Debug, Clone, Copy)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn as_dyn(&self) -> &dyn Dialect {
        self
    }

    fn name(&self) -> &'static str {
        "postgres"
    }

    fn write_bind_var(&self, out: &mut String, index: usize) {
        let _ = write!(out, "${}", index + 1);
    }

    fn write_column_type(
        &self,
        out: &mut String,
        value: &Value,
        max_size: Option<u32>,
        auto_increment: bool,
    ) {
        match value {
            Value::Int8(..)
            | Value::Int16(..)
            | Value::Int32(..)
            | Value::UInt8(..)
            | Value::UInt16(..)
                if auto_increment =>
            {
                out.push_str("SERIAL")
            }
            Value::Int64(..) | Value::UInt32(..) | Value::UInt64(..) if auto_increment => {
                out.push_str("BIGSERIAL")
            }
            Value::Blob(..) => out.push_str("BYTEA"),
            Value::TimestampWithTimezone(..) => out.push_str("TIMESTAMPTZ"),
            _ => GenericDialect.write_column_type(out, value, max_size, auto_increment),
        }
    }

    fn auto_incr_bind_value(&self) -> &str {
        "DEFAULT"
    }

    fn write_auto_incr_insert_suffix(&self, out: &mut String, column: &ColumnMap) {
        out.push_str(" RETURNING ");
        self.write_identifier_quoted(out, column.column_name());
    }

    fn targeted_auto_incr(&self) -> Option<&dyn TargetedAutoIncrInserter> {
        Some(self)
    }
}

impl TargetedAutoIncrInserter for PostgresDialect {}
