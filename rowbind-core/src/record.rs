use crate::{Result, Value};
use std::any::{self, TypeId};

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Column,
    /// Nested record whose fields are spliced into the outer one.
    Embedded(fn() -> &'static [FieldDef]),
}

/// Static description of a record field, usually produced by `#[derive(Record)]`.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Typed null describing the Rust type of the field.
    pub value: Value,
    pub nullable: bool,
    pub column: Option<&'static str>,
    pub transient: bool,
    pub size: Option<u32>,
    pub default: Option<&'static str>,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub not_null: bool,
}

impl FieldDef {
    pub fn new(name: &'static str, value: Value) -> Self {
        Self {
            name,
            kind: FieldKind::Column,
            value,
            nullable: false,
            column: None,
            transient: false,
            size: None,
            default: None,
            primary_key: false,
            auto_increment: false,
            not_null: false,
        }
    }

    pub fn embedded(name: &'static str, fields: fn() -> &'static [FieldDef]) -> Self {
        Self {
            kind: FieldKind::Embedded(fields),
            ..Self::new(name, Value::Null)
        }
    }

    /// Column name declared by the tag, or the field name.
    pub fn column_name(&self) -> &'static str {
        self.column.unwrap_or(self.name)
    }
}

/// A plain data type that can be stored as a table row.
///
/// Fields are addressed by name. Embedded records are searched after the outer
/// fields, so an outer field shadows an embedded one with the same name.
pub trait Record: Send + Sync + 'static {
    fn fields() -> &'static [FieldDef]
    where
        Self: Sized;
    /// Same as [`Record::fields`], callable through `dyn Record`.
    fn field_defs(&self) -> &'static [FieldDef];
    fn get_field(&self, name: &str) -> Option<Value>;
    /// Returns `false` when the record has no field called `name`.
    fn set_field(&mut self, name: &str, value: Value) -> Result<bool>;
    fn as_dyn(&self) -> &dyn Record;
    fn as_dyn_mut(&mut self) -> &mut dyn Record;
    fn record_type(&self) -> TypeId {
        TypeId::of::<Self>()
    }
    fn type_name(&self) -> &'static str {
        any::type_name::<Self>()
    }
}

/// Field list with embedded records spliced in place.
pub fn flatten_fields(fields: &'static [FieldDef]) -> Vec<&'static FieldDef> {
    let mut result: Vec<&'static FieldDef> = Vec::with_capacity(fields.len());
    for field in fields {
        match field.kind {
            FieldKind::Embedded(inner) => {
                for nested in flatten_fields(inner()) {
                    if !result
                        .iter()
                        .any(|v| !v.transient && v.name == nested.name)
                    {
                        result.push(nested);
                    }
                }
            }
            FieldKind::Column => {
                match result
                    .iter()
                    .position(|v| !v.transient && v.name == field.name)
                {
                    Some(i) => result[i] = field,
                    None => result.push(field),
                }
            }
        }
    }
    result
}
