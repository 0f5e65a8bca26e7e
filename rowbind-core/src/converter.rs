use crate::{Result, Value};
use std::fmt::{self, Debug};

/// Optional hook transforming values on their way to and from the database.
///
/// `to_storage` runs on every bound field value before an insert or update.
/// `from_storage` is asked, for a given field type, whether scanned values need
/// a custom holder; the holder also becomes the column type used for DDL.
pub trait TypeConverter: Send + Sync {
    fn to_storage(&self, value: Value) -> Result<Value> {
        Ok(value)
    }
    fn from_storage(&self, _target: &Value) -> Option<CustomScanner> {
        None
    }
}

type Binder = Box<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// Temporary holder for a scanned value plus the step turning it into the
/// field value.
pub struct CustomScanner {
    holder: Value,
    binder: Binder,
}

impl CustomScanner {
    pub fn new(
        holder: Value,
        binder: impl Fn(Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            holder,
            binder: Box::new(binder),
        }
    }
    /// Typed null of the storage representation.
    pub fn holder(&self) -> &Value {
        &self.holder
    }
    pub fn bind(&self, scanned: Value) -> Result<Value> {
        (self.binder)(scanned)
    }
}

impl Debug for CustomScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomScanner")
            .field("holder", &self.holder)
            .finish_non_exhaustive()
    }
}
