use crate::{ColumnTag, ConfigError, FieldDef, Result, Value};

/// Mapping between a record field and a table column.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub(crate) column_name: String,
    pub(crate) field_name: &'static str,
    pub(crate) transient: bool,
    pub(crate) unique: bool,
    pub(crate) max_size: Option<u32>,
    pub(crate) default_value: Option<String>,
    pub(crate) generated_id_query: Option<String>,
    pub(crate) primary_key: bool,
    pub(crate) auto_increment: bool,
    pub(crate) not_null: bool,
    pub(crate) nullable: bool,
    pub(crate) value: Value,
    pub(crate) storage: Value,
}

impl ColumnMap {
    pub(crate) fn from_field(field: &'static FieldDef) -> Self {
        Self {
            column_name: field.column_name().to_string(),
            field_name: field.name,
            transient: field.transient,
            unique: false,
            max_size: field.size,
            default_value: field.default.map(Into::into),
            generated_id_query: None,
            primary_key: field.primary_key,
            auto_increment: field.auto_increment,
            not_null: field.not_null,
            nullable: field.nullable,
            value: field.value.clone(),
            storage: field.value.clone(),
        }
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }
    pub fn field_name(&self) -> &'static str {
        self.field_name
    }
    pub fn is_transient(&self) -> bool {
        self.transient
    }
    pub fn is_unique(&self) -> bool {
        self.unique
    }
    pub fn max_size(&self) -> Option<u32> {
        self.max_size
    }
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }
    pub fn generated_id_query(&self) -> Option<&str> {
        self.generated_id_query.as_deref()
    }
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }
    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }
    pub fn is_not_null(&self) -> bool {
        self.not_null
    }
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
    /// Typed null of the field as declared on the record.
    pub fn value(&self) -> &Value {
        &self.value
    }
    /// Typed null of the representation stored in the database.
    pub fn storage_value(&self) -> &Value {
        &self.storage
    }

    pub fn rename(&mut self, name: impl Into<String>) -> &mut Self {
        self.column_name = name.into();
        self
    }
    pub fn set_transient(&mut self, transient: bool) -> &mut Self {
        self.transient = transient;
        self
    }
    pub fn set_unique(&mut self, unique: bool) -> &mut Self {
        self.unique = unique;
        self
    }
    pub fn set_max_size(&mut self, size: u32) -> &mut Self {
        self.max_size = Some(size);
        self
    }
    pub fn set_not_null(&mut self, not_null: bool) -> &mut Self {
        self.not_null = not_null;
        self
    }
    pub fn set_default(&mut self, literal: impl Into<String>) -> &mut Self {
        self.default_value = Some(literal.into());
        self
    }
    /// Query returning the id generated by the last insert, used by dialects
    /// that read autoincrement values with a second statement.
    pub fn set_generated_id_query(&mut self, query: impl Into<String>) -> &mut Self {
        self.generated_id_query = Some(query.into());
        self
    }

    /// Applies a tag string to an already registered column.
    ///
    /// Key options change the table key and must go through `TableMap::set_keys`.
    pub fn apply_tag(&mut self, tag: &str) -> Result<&mut Self> {
        let tag = ColumnTag::parse(tag)?;
        if tag.primary_key || tag.auto_increment {
            return Err(ConfigError::msg(format!(
                "Column {}: primary key options cannot be applied to a registered column, use set_keys",
                self.column_name
            )));
        }
        if let Some(name) = tag.name {
            self.column_name = name;
        }
        self.transient = tag.transient;
        if tag.size.is_some() {
            self.max_size = tag.size;
        }
        if tag.default.is_some() {
            self.default_value = tag.default;
        }
        self.not_null |= tag.not_null;
        Ok(self)
    }
}
