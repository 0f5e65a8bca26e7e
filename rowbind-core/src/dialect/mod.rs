mod generic;
mod mysql;
mod postgres;

pub use generic::*;
pub use mysql::*;
pub use postgres::*;

use crate::{ColumnMap, IndexMap, RowLabeled, RowsAffected, TableMap, Value, separated_by};
use std::fmt::Write;

/// Vendor specific SQL rendering.
///
/// Every piece of SQL produced by this crate goes through a dialect: identifier
/// quoting, bind variables, column types and the statements used for schema
/// management and transactions. Implementors override the few methods where
/// their database differs from the defaults.
pub trait Dialect: Send + Sync {
    fn as_dyn(&self) -> &dyn Dialect;

    fn name(&self) -> &'static str;

    /// Statement terminator.
    fn write_query_suffix(&self, out: &mut String) {
        out.push(';');
    }

    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', r#""""#);
        out.push('"');
    }

    fn write_table_name(&self, out: &mut String, schema: Option<&str>, table: &str) {
        if let Some(schema) = schema.filter(|v| !v.is_empty()) {
            self.write_identifier_quoted(out, schema);
            out.push('.');
        }
        self.write_identifier_quoted(out, table);
    }

    /// Positional bind variable, `index` is zero based.
    fn write_bind_var(&self, out: &mut String, _index: usize) {
        out.push('?');
    }

    fn write_column_type(
        &self,
        out: &mut String,
        value: &Value,
        max_size: Option<u32>,
        _auto_increment: bool,
    ) {
        match value {
            Value::Boolean(..) => out.push_str("BOOLEAN"),
            Value::Int8(..) | Value::Int16(..) | Value::UInt8(..) => out.push_str("SMALLINT"),
            Value::Int32(..) | Value::UInt16(..) => out.push_str("INTEGER"),
            Value::Int64(..) | Value::UInt32(..) | Value::UInt64(..) => out.push_str("BIGINT"),
            Value::Float32(..) => out.push_str("REAL"),
            Value::Float64(..) => out.push_str("DOUBLE PRECISION"),
            Value::Decimal(..) => out.push_str("NUMERIC"),
            Value::Varchar(..) => match max_size {
                Some(size) => {
                    let _ = write!(out, "VARCHAR({size})");
                }
                None => out.push_str("TEXT"),
            },
            Value::Blob(..) => out.push_str("BLOB"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Time(..) => out.push_str("TIME"),
            Value::Timestamp(..) => out.push_str("TIMESTAMP"),
            Value::TimestampWithTimezone(..) => out.push_str("TIMESTAMP WITH TIME ZONE"),
            Value::Uuid(..) => out.push_str("UUID"),
            Value::Null => out.push_str("TEXT"),
        }
    }

    /// Clause appended to the definition of an autoincrement column.
    fn write_auto_incr(&self, _out: &mut String) {}

    /// Literal bound to autoincrement columns in inserts. Empty means the
    /// column is left out of the insert and the database assigns the value.
    fn auto_incr_bind_value(&self) -> &str {
        ""
    }

    /// Written after an insert that has an autoincrement column, before the terminator.
    fn write_auto_incr_insert_suffix(&self, _out: &mut String, _column: &ColumnMap) {}

    fn write_create_table_suffix(&self, _out: &mut String) {}

    fn write_create_index_suffix(&self, _out: &mut String) {}

    fn write_drop_index_suffix(&self, _out: &mut String, _table: &TableMap) {}

    fn write_truncate_clause(&self, out: &mut String) {
        out.push_str("TRUNCATE");
    }

    fn write_if_schema_not_exists(&self, out: &mut String, command: &str, _schema: &str) {
        out.push_str(command);
        out.push_str(" IF NOT EXISTS");
    }

    fn write_if_table_exists(
        &self,
        out: &mut String,
        command: &str,
        _schema: Option<&str>,
        _table: &str,
    ) {
        out.push_str(command);
        out.push_str(" IF EXISTS");
    }

    fn write_if_table_not_exists(
        &self,
        out: &mut String,
        command: &str,
        _schema: Option<&str>,
        _table: &str,
    ) {
        out.push_str(command);
        out.push_str(" IF NOT EXISTS");
    }

    fn write_transaction_begin(&self, out: &mut String) {
        out.push_str("BEGIN");
        self.write_query_suffix(out);
    }

    fn write_transaction_commit(&self, out: &mut String) {
        out.push_str("COMMIT");
        self.write_query_suffix(out);
    }

    fn write_transaction_rollback(&self, out: &mut String) {
        out.push_str("ROLLBACK");
        self.write_query_suffix(out);
    }

    fn write_savepoint(&self, out: &mut String, name: &str) {
        out.push_str("SAVEPOINT ");
        self.write_identifier_quoted(out, name);
        self.write_query_suffix(out);
    }

    fn write_rollback_to_savepoint(&self, out: &mut String, name: &str) {
        out.push_str("ROLLBACK TO SAVEPOINT ");
        self.write_identifier_quoted(out, name);
        self.write_query_suffix(out);
    }

    /// Autoincrement values are reported by the runner as the last inserted id.
    fn integer_auto_incr(&self) -> Option<&dyn IntegerAutoIncrInserter> {
        None
    }

    /// Autoincrement values are returned as a row by the insert itself.
    fn targeted_auto_incr(&self) -> Option<&dyn TargetedAutoIncrInserter> {
        None
    }

    /// Autoincrement values are read with a second query after the insert.
    fn query_auto_incr(&self) -> Option<&dyn TargetQueryInserter> {
        None
    }

    fn write_create_schema(&self, out: &mut String, schema: &str, if_not_exists: bool) {
        if if_not_exists {
            self.write_if_schema_not_exists(out, "CREATE SCHEMA", schema);
        } else {
            out.push_str("CREATE SCHEMA");
        }
        out.push(' ');
        self.write_identifier_quoted(out, schema);
        self.write_query_suffix(out);
    }

    fn write_create_table(&self, out: &mut String, table: &TableMap, if_not_exists: bool) {
        if if_not_exists {
            self.write_if_table_not_exists(
                out,
                "CREATE TABLE",
                table.schema_name(),
                table.table_name(),
            );
        } else {
            out.push_str("CREATE TABLE");
        }
        out.push(' ');
        self.write_table_name(out, table.schema_name(), table.table_name());
        out.push_str(" (\n");
        let single_key = table.keys.len() == 1;
        separated_by(
            out,
            table.columns().iter().filter(|c| !c.is_transient()),
            |out, column| {
                out.push_str("    ");
                self.write_identifier_quoted(out, column.column_name());
                out.push(' ');
                self.write_column_type(
                    out,
                    column.storage_value(),
                    column.max_size(),
                    column.is_auto_increment(),
                );
                if column.is_primary_key() || column.is_not_null() {
                    out.push_str(" NOT NULL");
                }
                if let Some(default) = column.default_value() {
                    out.push_str(" DEFAULT ");
                    out.push_str(default);
                }
                if column.is_primary_key() && single_key {
                    out.push_str(" PRIMARY KEY");
                }
                if column.is_unique() {
                    out.push_str(" UNIQUE");
                }
                if column.is_auto_increment() {
                    let len = out.len();
                    out.push(' ');
                    self.write_auto_incr(out);
                    if out.len() == len + 1 {
                        out.truncate(len);
                    }
                }
            },
            ",\n",
        );
        if table.keys.len() > 1 {
            out.push_str(",\n    PRIMARY KEY (");
            separated_by(
                out,
                table.keys(),
                |out, column| self.write_identifier_quoted(out, column.column_name()),
                ", ",
            );
            out.push(')');
        }
        for group in table.unique_together() {
            out.push_str(",\n    UNIQUE (");
            separated_by(
                out,
                group,
                |out, column| self.write_identifier_quoted(out, column),
                ", ",
            );
            out.push(')');
        }
        out.push_str("\n)");
        self.write_create_table_suffix(out);
        self.write_query_suffix(out);
    }

    fn write_drop_table(&self, out: &mut String, table: &TableMap, if_exists: bool) {
        if if_exists {
            self.write_if_table_exists(out, "DROP TABLE", table.schema_name(), table.table_name());
        } else {
            out.push_str("DROP TABLE");
        }
        out.push(' ');
        self.write_table_name(out, table.schema_name(), table.table_name());
        self.write_query_suffix(out);
    }

    fn write_truncate_table(&self, out: &mut String, table: &TableMap) {
        self.write_truncate_clause(out);
        out.push(' ');
        self.write_table_name(out, table.schema_name(), table.table_name());
        self.write_query_suffix(out);
    }

    fn write_create_index(&self, out: &mut String, table: &TableMap, index: &IndexMap) {
        out.push_str("CREATE ");
        if index.is_unique() {
            out.push_str("UNIQUE ");
        }
        out.push_str("INDEX ");
        self.write_identifier_quoted(out, index.name());
        out.push_str(" ON ");
        self.write_table_name(out, table.schema_name(), table.table_name());
        if let Some(index_type) = index.index_type() {
            out.push_str(" USING ");
            out.push_str(index_type);
        }
        out.push_str(" (");
        separated_by(
            out,
            index.columns(),
            |out, column| self.write_identifier_quoted(out, column),
            ", ",
        );
        out.push(')');
        self.write_create_index_suffix(out);
        self.write_query_suffix(out);
    }

    fn write_drop_index(&self, out: &mut String, table: &TableMap, index: &IndexMap) {
        out.push_str("DROP INDEX ");
        self.write_identifier_quoted(out, index.name());
        self.write_drop_index_suffix(out, table);
        self.write_query_suffix(out);
    }
}

pub trait IntegerAutoIncrInserter: Sync {
    fn inserted_id(&self, result: &RowsAffected) -> Option<i64> {
        result.last_affected_id
    }
}

pub trait TargetedAutoIncrInserter: Sync {
    fn inserted_value(&self, row: RowLabeled) -> Option<Value> {
        row.values.into_vec().into_iter().next()
    }
}

pub trait TargetQueryInserter: Sync {
    fn id_query<'c>(&self, column: &'c ColumnMap) -> Option<&'c str> {
        column.generated_id_query()
    }
}
