use crate::{
    ColumnMap, ConfigError, Dialect, FieldKind, MissingKeys, Record, Result, TableMap,
    TableNotFound, TypeConverter, flatten_fields, short_type_name,
};
use std::{any::TypeId, collections::HashMap};

/// Registry of the record types known to a database handle, together with the
/// dialect used to render their SQL and the optional type converter.
///
/// Registration needs `&mut Mapper` and usually happens once at startup, the
/// rest of the API only reads from it.
pub struct Mapper {
    dialect: Box<dyn Dialect>,
    converter: Option<Box<dyn TypeConverter>>,
    tables: Vec<TableMap>,
    by_type: HashMap<TypeId, usize>,
}

impl Mapper {
    pub fn new(dialect: impl Dialect + 'static) -> Self {
        Self {
            dialect: Box::new(dialect),
            converter: None,
            tables: Vec::new(),
            by_type: HashMap::new(),
        }
    }

    /// Install a converter, must happen before registering tables.
    pub fn with_type_converter(mut self, converter: impl TypeConverter + 'static) -> Self {
        self.converter = Some(Box::new(converter));
        self
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_dyn()
    }

    pub fn type_converter(&self) -> Option<&dyn TypeConverter> {
        self.converter.as_deref()
    }

    /// Register `T` using its type name as table name.
    pub fn add_table<T: Record>(&mut self) -> Result<&mut TableMap> {
        let name = short_type_name(std::any::type_name::<T>()).to_string();
        self.register::<T>(None, name)
    }

    pub fn add_table_with_name<T: Record>(
        &mut self,
        name: impl Into<String>,
    ) -> Result<&mut TableMap> {
        self.register::<T>(None, name.into())
    }

    pub fn add_table_with_name_and_schema<T: Record>(
        &mut self,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<&mut TableMap> {
        self.register::<T>(Some(schema.into()), name.into())
    }

    fn register<T: Record>(
        &mut self,
        schema: Option<String>,
        name: String,
    ) -> Result<&mut TableMap> {
        let type_id = TypeId::of::<T>();
        if let Some(&i) = self.by_type.get(&type_id) {
            let table = &mut self.tables[i];
            log::debug!("Renaming table {} to {}", table.table_name(), name);
            table.set_name(name);
            if let Some(schema) = schema {
                table.set_schema_name(schema);
            }
            return Ok(table);
        }
        let type_name = std::any::type_name::<T>();
        let mut columns = Vec::new();
        for field in flatten_fields(T::fields()) {
            if matches!(field.kind, FieldKind::Embedded(..)) {
                continue;
            }
            let mut column = ColumnMap::from_field(field);
            if let Some(scanner) = self
                .converter
                .as_ref()
                .and_then(|c| c.from_storage(&field.value))
            {
                column.storage = scanner.holder().clone();
            }
            if column.auto_increment && !column.storage.is_integer() {
                return Err(ConfigError::msg(format!(
                    "Field `{}` of {} is autoincrement but its type is not an integer",
                    field.name, type_name
                )));
            }
            columns.push(column);
        }
        if columns.iter().filter(|c| c.auto_increment).count() > 1 {
            return Err(ConfigError::msg(format!(
                "Type {} declares more than one autoincrement field",
                type_name
            )));
        }
        log::debug!(
            "Registered {} as table {} with {} columns",
            type_name,
            name,
            columns.len()
        );
        let table = TableMap::new(type_id, type_name, name, schema, columns);
        self.by_type.insert(type_id, self.tables.len());
        self.tables.push(table);
        let last = self.tables.len() - 1;
        Ok(&mut self.tables[last])
    }

    pub fn tables(&self) -> &[TableMap] {
        &self.tables
    }

    pub fn table<T: Record>(&self) -> Option<&TableMap> {
        self.table_by_type_id(TypeId::of::<T>())
    }

    pub fn table_mut<T: Record>(&mut self) -> Option<&mut TableMap> {
        let i = *self.by_type.get(&TypeId::of::<T>())?;
        Some(&mut self.tables[i])
    }

    pub fn table_by_type_id(&self, type_id: TypeId) -> Option<&TableMap> {
        self.by_type.get(&type_id).map(|&i| &self.tables[i])
    }

    /// Table registered for the record type, optionally requiring a primary key.
    pub fn table_for(
        &self,
        type_id: TypeId,
        type_name: &str,
        require_key: bool,
    ) -> Result<&TableMap> {
        let table = self.table_by_type_id(type_id).ok_or_else(|| {
            TableNotFound {
                type_name: type_name.to_string(),
            }
        })?;
        if require_key && !table.has_keys() {
            return Err(MissingKeys {
                table_name: table.table_name().to_string(),
            }
            .into());
        }
        Ok(table)
    }
}
