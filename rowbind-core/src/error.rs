use crate::Error;
use std::fmt::{self, Display};

/// Programming or registration mistake: bad tags, unknown fields, unsupported
/// autoincrement combinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

/// The record type was never registered with the mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNotFound {
    pub type_name: String,
}

/// The operation needs a primary key but the table has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKeys {
    pub table_name: String,
}

/// The query returned no row where one was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoRows;

/// The query returned more than one row where at most one was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultipleRows;

/// Commit or rollback on a transaction that was already finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionFinished;

/// Partial mapping between a result set and a destination type.
///
/// This condition is non fatal: rows are still materialized using the columns
/// that did match. `missing_columns` lists result columns without a destination
/// field, `unmapped_fields` lists persisted fields that no column populated.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldsNotFound {
    pub type_name: String,
    pub missing_columns: Vec<String>,
    pub unmapped_fields: Vec<String>,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Display for TableNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No table found for type {}", self.type_name)
    }
}

impl Display for MissingKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Table {} has no primary key, call set_keys during registration",
            self.table_name
        )
    }
}

impl Display for NoRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("The query returned no rows")
    }
}

impl Display for MultipleRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Expected at most one row but the query returned more")
    }
}

impl Display for TransactionFinished {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("The transaction has already been committed or rolled back")
    }
}

impl Display for FieldsNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Partial mapping for type {}", self.type_name)?;
        if !self.missing_columns.is_empty() {
            write!(f, ", no fields for columns {:?}", self.missing_columns)?;
        }
        if !self.unmapped_fields.is_empty() {
            write!(f, ", no columns for fields {:?}", self.unmapped_fields)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for TableNotFound {}
impl std::error::Error for MissingKeys {}
impl std::error::Error for NoRows {}
impl std::error::Error for MultipleRows {}
impl std::error::Error for TransactionFinished {}
impl std::error::Error for FieldsNotFound {}

impl ConfigError {
    pub fn msg(message: impl Into<String>) -> Error {
        Error::new(Self(message.into()))
    }
}

/// True when the error only reports a partial mapping and the results can still be used.
pub fn is_non_fatal(error: &Error) -> bool {
    error.downcast_ref::<FieldsNotFound>().is_some()
}

pub fn is_no_rows(error: &Error) -> bool {
    error.downcast_ref::<NoRows>().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn conditions_survive_context() {
        let error = Error::new(NoRows).context("While running select_one");
        assert!(is_no_rows(&error));
        assert!(!is_non_fatal(&error));
        let error: Result<(), Error> = Err(Error::new(FieldsNotFound {
            type_name: "Invoice".into(),
            missing_columns: vec!["total".into()],
            unmapped_fields: vec![],
        }));
        let error = error.context("While selecting").unwrap_err();
        assert!(is_non_fatal(&error));
    }

    #[test]
    fn fields_not_found_message() {
        let error = FieldsNotFound {
            type_name: "Invoice".into(),
            missing_columns: vec!["total".into()],
            unmapped_fields: vec!["id".into(), "number".into()],
        };
        assert_eq!(
            error.to_string(),
            r#"Partial mapping for type Invoice, no fields for columns ["total"], no columns for fields ["id", "number"]"#
        );
    }
}
