use crate::{Dialect, IntegerAutoIncrInserter, TableMap, Value};
use std::fmt::Write;

/// MySQL rendering: backtick quoting and `AUTO_INCREMENT` columns whose value
/// is reported by the runner as the last inserted id.
#[derive(Debug, Clone)]
pub struct MySqlDialect {
    pub engine: String,
    pub encoding: String,
}

impl Default for MySqlDialect {
    fn default() -> Self {
        Self {
            engine: "InnoDB".into(),
            encoding: "utf8mb4".into(),
        }
    }
}

impl Dialect for MySqlDialect {
    fn as_dyn(&self) -> &dyn Dialect {
        self
    }

    fn name(&self) -> &'static str {
        "mysql"
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(out, value, '`', "``");
        out.push('`');
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
            Value::Int8(..) => out.push_str("TINYINT"),
            Value::Int16(..) => out.push_str("SMALLINT"),
            Value::Int32(..) => out.push_str("INT"),
            Value::Int64(..) => out.push_str("BIGINT"),
            Value::UInt8(..) => out.push_str("TINYINT UNSIGNED"),
            Value::UInt16(..) => out.push_str("SMALLINT UNSIGNED"),
            Value::UInt32(..) => out.push_str("INT UNSIGNED"),
            Value::UInt64(..) => out.push_str("BIGINT UNSIGNED"),
            Value::Float32(..) => out.push_str("FLOAT"),
            Value::Float64(..) => out.push_str("DOUBLE"),
            Value::Decimal(..) => out.push_str("DECIMAL(38,10)"),
            Value::Varchar(..) => {
                let size = max_size.unwrap_or(255);
                if size < 256 {
                    let _ = write!(out, "VARCHAR({size})");
                } else {
                    out.push_str("TEXT");
                }
            }
            Value::Blob(..) => out.push_str("MEDIUMBLOB"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Time(..) => out.push_str("TIME"),
            Value::Timestamp(..) | Value::TimestampWithTimezone(..) => out.push_str("DATETIME"),
            Value::Uuid(..) => out.push_str("CHAR(36)"),
            Value::Null => out.push_str("TEXT"),
        }
    }

    fn write_auto_incr(&self, out: &mut String) {
        out.push_str("AUTO_INCREMENT");
    }

    fn auto_incr_bind_value(&self) -> &str {
        "NULL"
    }

    fn write_create_table_suffix(&self, out: &mut String) {
        let _ = write!(out, " ENGINE={} CHARSET={}", self.engine, self.encoding);
    }

    fn write_drop_index_suffix(&self, out: &mut String, table: &TableMap) {
        out.push_str(" ON ");
        self.write_table_name(out, table.schema_name(), table.table_name());
    }

    fn integer_auto_incr(&self) -> Option<&dyn IntegerAutoIncrInserter> {
        Some(self)
    }
}

impl IntegerAutoIncrInserter for MySqlDialect {}
