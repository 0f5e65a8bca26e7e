use crate::{
    Context, Dialect, Error, Query, Record, Result, TableMap, TypeConverter, Value, separated_by,
};

/// The CRUD statements compiled for every table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanKind {
    Insert,
    Get,
    Update,
    Delete,
}

impl PlanKind {
    pub const COUNT: usize = 4;
}

/// Compiled statement of a table operation, shared by every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindPlan {
    pub query: String,
    /// Fields supplying the bind arguments, in placeholder order. For the get
    /// plan these are the projected fields instead.
    pub arg_fields: Vec<&'static str>,
    pub key_fields: Vec<&'static str>,
    pub auto_incr_idx: Option<usize>,
    pub auto_incr_field_name: Option<&'static str>,
}

/// A plan resolved against one record.
#[derive(Debug, Clone, PartialEq)]
pub struct BindInstance {
    pub query: String,
    pub args: Vec<Value>,
    pub keys: Vec<Value>,
    pub auto_incr_idx: Option<usize>,
    pub auto_incr_field_name: Option<&'static str>,
}

enum Slot<'a> {
    Bind,
    Literal(&'a str),
}

impl BindPlan {
    fn empty() -> Self {
        Self {
            query: String::new(),
            arg_fields: Vec::new(),
            key_fields: Vec::new(),
            auto_incr_idx: None,
            auto_incr_field_name: None,
        }
    }

    pub(crate) fn compile(kind: PlanKind, table: &TableMap, dialect: &dyn Dialect) -> Self {
        match kind {
            PlanKind::Insert => Self::compile_insert(table, dialect),
            PlanKind::Get => Self::compile_get(table, dialect),
            PlanKind::Update => Self::compile_update(table, dialect),
            PlanKind::Delete => Self::compile_delete(table, dialect),
        }
    }

    fn compile_insert(table: &TableMap, dialect: &dyn Dialect) -> Self {
        let mut plan = Self::empty();
        let mut entries = Vec::with_capacity(table.columns.len());
        for (i, column) in table.columns.iter().enumerate() {
            if column.transient {
                continue;
            }
            if column.auto_increment {
                plan.auto_incr_idx = Some(i);
                plan.auto_incr_field_name = Some(column.field_name);
                let literal = dialect.auto_incr_bind_value();
                if !literal.is_empty() {
                    entries.push((column, Slot::Literal(literal)));
                }
            } else if let Some(default) = column.default_value.as_deref() {
                entries.push((column, Slot::Literal(default)));
            } else {
                plan.arg_fields.push(column.field_name);
                entries.push((column, Slot::Bind));
            }
        }
        let out = &mut plan.query;
        out.push_str("INSERT INTO ");
        dialect.write_table_name(out, table.schema_name(), table.table_name());
        if entries.is_empty() {
            out.push_str(" DEFAULT VALUES");
        } else {
            out.push_str(" (");
            separated_by(
                out,
                &entries,
                |out, (column, _)| dialect.write_identifier_quoted(out, &column.column_name),
                ", ",
            );
            out.push_str(") VALUES (");
            let mut index = 0;
            separated_by(
                out,
                &entries,
                |out, (_, slot)| match slot {
                    Slot::Bind => {
                        dialect.write_bind_var(out, index);
                        index += 1;
                    }
                    Slot::Literal(v) => out.push_str(v),
                },
                ", ",
            );
            out.push(')');
        }
        if let Some(i) = plan.auto_incr_idx {
            dialect.write_auto_incr_insert_suffix(out, &table.columns[i]);
        }
        dialect.write_query_suffix(out);
        plan
    }

    fn compile_get(table: &TableMap, dialect: &dyn Dialect) -> Self {
        let mut plan = Self::empty();
        let out = &mut plan.query;
        out.push_str("SELECT ");
        separated_by(
            out,
            table.columns.iter().filter(|c| !c.transient),
            |out, column| {
                dialect.write_identifier_quoted(out, &column.column_name);
                plan.arg_fields.push(column.field_name);
            },
            ", ",
        );
        out.push_str(" FROM ");
        dialect.write_table_name(out, table.schema_name(), table.table_name());
        Self::write_where(out, table, dialect, 0, &mut plan.key_fields);
        dialect.write_query_suffix(out);
        plan
    }

    fn compile_update(table: &TableMap, dialect: &dyn Dialect) -> Self {
        let mut plan = Self::empty();
        let out = &mut plan.query;
        out.push_str("UPDATE ");
        dialect.write_table_name(out, table.schema_name(), table.table_name());
        out.push_str(" SET ");
        let mut index = 0;
        separated_by(
            out,
            table
                .columns
                .iter()
                .filter(|c| !c.transient && !c.auto_increment),
            |out, column| {
                dialect.write_identifier_quoted(out, &column.column_name);
                out.push_str(" = ");
                dialect.write_bind_var(out, index);
                index += 1;
                plan.arg_fields.push(column.field_name);
            },
            ", ",
        );
        Self::write_where(out, table, dialect, index, &mut plan.key_fields);
        plan.arg_fields.extend(plan.key_fields.iter().copied());
        dialect.write_query_suffix(out);
        plan
    }

    fn compile_delete(table: &TableMap, dialect: &dyn Dialect) -> Self {
        let mut plan = Self::empty();
        let out = &mut plan.query;
        out.push_str("DELETE FROM ");
        dialect.write_table_name(out, table.schema_name(), table.table_name());
        Self::write_where(out, table, dialect, 0, &mut plan.key_fields);
        plan.arg_fields.extend(plan.key_fields.iter().copied());
        dialect.write_query_suffix(out);
        plan
    }

    fn write_where(
        out: &mut String,
        table: &TableMap,
        dialect: &dyn Dialect,
        mut index: usize,
        key_fields: &mut Vec<&'static str>,
    ) {
        out.push_str(" WHERE ");
        separated_by(
            out,
            table.keys(),
            |out, column| {
                dialect.write_identifier_quoted(out, &column.column_name);
                out.push_str(" = ");
                dialect.write_bind_var(out, index);
                index += 1;
                key_fields.push(column.field_name);
            },
            " AND ",
        );
    }

    /// Number of columns assigned by the update plan.
    pub fn set_count(&self) -> usize {
        self.arg_fields.len() - self.key_fields.len()
    }

    /// Reads the bound fields from `record`, passing each value through the
    /// outbound conversion when a converter is installed.
    pub fn create_bind_instance(
        &self,
        record: &dyn Record,
        converter: Option<&dyn TypeConverter>,
    ) -> Result<BindInstance> {
        let resolve = |field: &&'static str| -> Result<Value> {
            let value = record.get_field(field).ok_or_else(|| {
                Error::msg(format!(
                    "Field `{}` is not present on {}",
                    field,
                    record.type_name()
                ))
            })?;
            match converter {
                Some(converter) => converter
                    .to_storage(value)
                    .with_context(|| format!("While converting field `{}`", field)),
                None => Ok(value),
            }
        };
        Ok(BindInstance {
            query: self.query.clone(),
            args: self.arg_fields.iter().map(resolve).collect::<Result<_>>()?,
            keys: self.key_fields.iter().map(resolve).collect::<Result<_>>()?,
            auto_incr_idx: self.auto_incr_idx,
            auto_incr_field_name: self.auto_incr_field_name,
        })
    }
}

impl BindInstance {
    pub fn into_query(self) -> Query {
        Query::new(self.query, self.args)
    }
}
