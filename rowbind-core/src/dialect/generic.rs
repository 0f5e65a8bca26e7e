use crate::Dialect;

/// ANSI flavored dialect with `?` bind variables.
///
/// It exposes no autoincrement capability, inserting a record with an
/// autoincrement key fails with a configuration error.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericDialect;

impl Dialect for GenericDialect {
    fn as_dyn(&self) -> &dyn Dialect {
        self
    }

    fn name(&self) -> &'static str {
        "generic"
    }
}
