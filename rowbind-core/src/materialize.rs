use crate::{
    Context, FieldDef, FieldsNotFound, Mapper, Record, Result, RowLabeled, TypeConverter, Value,
    flatten_fields,
};
use std::any::TypeId;

/// Assignment of result columns to the fields of a destination record type.
#[derive(Debug, Clone)]
pub struct RowMapping {
    fields: Vec<Option<&'static FieldDef>>,
    missing: Option<FieldsNotFound>,
}

impl RowMapping {
    /// Matches every column label against the fields of the destination.
    ///
    /// Names are compared ignoring ASCII case. A field answers to the column
    /// name of its registered table when the type is registered, otherwise to
    /// its tag column name or field name. Transient fields never match.
    pub fn resolve(
        mapper: &Mapper,
        fields: &'static [FieldDef],
        type_id: TypeId,
        type_name: &str,
        labels: &[String],
    ) -> Self {
        let table = mapper.table_by_type_id(type_id);
        let candidates = flatten_fields(fields)
            .into_iter()
            .filter_map(|field| match table.and_then(|t| t.column_by_field(field.name)) {
                Some(column) if column.is_transient() => None,
                Some(column) => Some((column.column_name(), field)),
                None if field.transient => None,
                None => Some((field.column_name(), field)),
            })
            .collect::<Vec<_>>();
        let mut covered = vec![false; candidates.len()];
        let mut missing_columns = Vec::new();
        let fields = labels
            .iter()
            .map(|label| {
                match candidates
                    .iter()
                    .position(|(name, _)| name.eq_ignore_ascii_case(label))
                {
                    Some(i) => {
                        covered[i] = true;
                        Some(candidates[i].1)
                    }
                    None => {
                        missing_columns.push(label.clone());
                        None
                    }
                }
            })
            .collect();
        let unmapped_fields = candidates
            .iter()
            .zip(covered)
            .filter(|(_, covered)| !covered)
            .map(|((_, field), _)| field.name.to_string())
            .collect::<Vec<_>>();
        let missing = if missing_columns.is_empty() && unmapped_fields.is_empty() {
            None
        } else {
            let missing = FieldsNotFound {
                type_name: type_name.to_string(),
                missing_columns,
                unmapped_fields,
            };
            log::debug!("{}", missing);
            Some(missing)
        };
        Self { fields, missing }
    }

    /// The partial mapping diagnostic, when some column or field was left out.
    pub fn missing(&self) -> Option<&FieldsNotFound> {
        self.missing.as_ref()
    }

    pub fn into_missing(self) -> Option<FieldsNotFound> {
        self.missing
    }

    /// Writes the mapped columns of `row` into `record`, columns without a
    /// field are skipped.
    pub fn scan(
        &self,
        record: &mut dyn Record,
        row: RowLabeled,
        converter: Option<&dyn TypeConverter>,
    ) -> Result<()> {
        for (field, value) in self.fields.iter().zip(row.values.into_vec()) {
            let Some(field) = field else {
                continue;
            };
            scan_field(record, field.name, &field.value, value, converter)?;
        }
        Ok(())
    }
}

/// Stores one scanned value into the field `name`, passing through the custom
/// scanner the converter provides for the field type.
pub fn scan_field(
    record: &mut dyn Record,
    name: &str,
    sample: &Value,
    value: Value,
    converter: Option<&dyn TypeConverter>,
) -> Result<()> {
    let value = match converter.and_then(|c| c.from_storage(sample)) {
        Some(scanner) => scanner
            .bind(value)
            .with_context(|| format!("While converting column for field `{}`", name))?,
        None => value,
    };
    record
        .set_field(name, value)
        .with_context(|| format!("Could not assign field `{}` of {}", name, record.type_name()))?;
    Ok(())
}
