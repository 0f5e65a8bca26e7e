use crate::{BindPlan, ColumnMap, ConfigError, Dialect, IndexMap, PlanKind, Result};
use std::{
    any::TypeId,
    sync::{Arc, OnceLock},
};

/// Schema of a registered record type.
///
/// Bind plans are compiled on first use and cached for the lifetime of the
/// table. Any mutation through the builder methods discards the cached plans.
#[derive(Debug)]
pub struct TableMap {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) table_name: String,
    pub(crate) schema_name: Option<String>,
    pub(crate) columns: Vec<ColumnMap>,
    pub(crate) keys: Vec<usize>,
    pub(crate) indexes: Vec<IndexMap>,
    pub(crate) unique_together: Vec<Vec<String>>,
    plans: [OnceLock<Arc<BindPlan>>; PlanKind::COUNT],
}

impl TableMap {
    pub(crate) fn new(
        type_id: TypeId,
        type_name: &'static str,
        table_name: String,
        schema_name: Option<String>,
        columns: Vec<ColumnMap>,
    ) -> Self {
        let keys = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.primary_key)
            .map(|(i, _)| i)
            .collect();
        Self {
            type_id,
            type_name,
            table_name,
            schema_name,
            columns,
            keys,
            indexes: Vec::new(),
            unique_together: Vec::new(),
            plans: Default::default(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }
    pub fn columns(&self) -> &[ColumnMap] {
        &self.columns
    }
    pub fn keys(&self) -> impl Iterator<Item = &ColumnMap> {
        self.keys.iter().map(|&i| &self.columns[i])
    }
    pub fn has_keys(&self) -> bool {
        !self.keys.is_empty()
    }
    pub fn indexes(&self) -> &[IndexMap] {
        &self.indexes
    }
    pub fn unique_together(&self) -> &[Vec<String>] {
        &self.unique_together
    }

    /// Column by field name or column name.
    pub fn column(&self, name: &str) -> Option<&ColumnMap> {
        self.position(name).map(|i| &self.columns[i])
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnMap> {
        let i = self.position(name)?;
        self.invalidate_plans();
        Some(&mut self.columns[i])
    }

    pub(crate) fn column_by_field(&self, field: &str) -> Option<&ColumnMap> {
        self.columns.iter().find(|c| c.field_name == field)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.field_name == name)
            .or_else(|| self.columns.iter().position(|c| c.column_name == name))
    }

    fn resolve(&self, name: &str) -> Result<usize> {
        self.position(name).ok_or_else(|| {
            ConfigError::msg(format!(
                "Table {} has no column or field named `{}`",
                self.table_name, name
            ))
        })
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.table_name = name.into();
        self.invalidate_plans();
        self
    }

    pub fn set_schema_name(&mut self, schema: impl Into<String>) -> &mut Self {
        self.schema_name = Some(schema.into());
        self.invalidate_plans();
        self
    }

    /// Marks the given fields as primary key, replacing any previous key.
    ///
    /// An autoincrement key must consist of exactly one integer field.
    pub fn set_keys(&mut self, auto_increment: bool, fields: &[&str]) -> Result<&mut Self> {
        if fields.is_empty() {
            return Err(ConfigError::msg(format!(
                "Table {}: set_keys requires at least one field",
                self.table_name
            )));
        }
        if auto_increment && fields.len() != 1 {
            return Err(ConfigError::msg(format!(
                "Table {}: an autoincrement key must have exactly one field, got {}",
                self.table_name,
                fields.len()
            )));
        }
        let keys = fields
            .iter()
            .map(|v| self.resolve(v))
            .collect::<Result<Vec<_>>>()?;
        if auto_increment {
            let column = &self.columns[keys[0]];
            if !column.storage.is_integer() {
                return Err(ConfigError::msg(format!(
                    "Table {}: autoincrement field `{}` is not an integer",
                    self.table_name, column.field_name
                )));
            }
        }
        for column in &mut self.columns {
            column.primary_key = false;
            column.auto_increment = false;
        }
        for &i in &keys {
            self.columns[i].primary_key = true;
            self.columns[i].auto_increment = auto_increment;
        }
        self.keys = keys;
        self.invalidate_plans();
        Ok(self)
    }

    /// Declares a group of columns whose combined values must be unique.
    pub fn set_unique_together(&mut self, fields: &[&str]) -> Result<&mut Self> {
        if fields.len() < 2 {
            return Err(ConfigError::msg(format!(
                "Table {}: set_unique_together needs at least two columns",
                self.table_name
            )));
        }
        let group = fields
            .iter()
            .map(|v| Ok(self.columns[self.resolve(v)?].column_name.clone()))
            .collect::<Result<Vec<_>>>()?;
        let mut sorted = group.clone();
        sorted.sort();
        if self.unique_together.iter().any(|existing| {
            let mut existing = existing.clone();
            existing.sort();
            existing == sorted
        }) {
            return Err(ConfigError::msg(format!(
                "Table {}: unique group {:?} is already declared",
                self.table_name, group
            )));
        }
        self.unique_together.push(group);
        self.invalidate_plans();
        Ok(self)
    }

    /// Declares a secondary index, configure it through the returned `IndexMap`.
    pub fn add_index(&mut self, name: impl Into<String>, fields: &[&str]) -> Result<&mut IndexMap> {
        let name = name.into();
        if fields.is_empty() {
            return Err(ConfigError::msg(format!(
                "Table {}: index {} has no columns",
                self.table_name, name
            )));
        }
        let columns = fields
            .iter()
            .map(|v| Ok(self.columns[self.resolve(v)?].column_name.clone()))
            .collect::<Result<Vec<_>>>()?;
        self.indexes.push(IndexMap {
            name,
            unique: false,
            index_type: None,
            columns,
        });
        let last = self.indexes.len() - 1;
        Ok(&mut self.indexes[last])
    }

    pub fn index(&self, name: &str) -> Option<&IndexMap> {
        self.indexes.iter().find(|v| v.name == name)
    }

    /// The compiled plan for `kind`, compiling it on first request.
    pub fn plan(&self, kind: PlanKind, dialect: &dyn Dialect) -> Arc<BindPlan> {
        self.plans[kind as usize]
            .get_or_init(|| {
                let plan = BindPlan::compile(kind, self, dialect);
                log::debug!(
                    "Compiled {:?} plan for {}: {}",
                    kind,
                    self.table_name,
                    plan.query
                );
                Arc::new(plan)
            })
            .clone()
    }

    pub(crate) fn invalidate_plans(&mut self) {
        self.plans = Default::default();
    }
}
