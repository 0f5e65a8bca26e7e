/// Secondary index over table columns, declared at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap {
    pub(crate) name: String,
    pub(crate) unique: bool,
    /// Dialect specific index method, `btree` or `hash` for example.
    pub(crate) index_type: Option<String>,
    pub(crate) columns: Vec<String>,
}

impl IndexMap {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn is_unique(&self) -> bool {
        self.unique
    }
    pub fn index_type(&self) -> Option<&str> {
        self.index_type.as_deref()
    }
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
    pub fn rename(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }
    pub fn set_unique(&mut self, unique: bool) -> &mut Self {
        self.unique = unique;
        self
    }
    pub fn set_index_type(&mut self, index_type: impl Into<String>) -> &mut Self {
        self.index_type = Some(index_type.into());
        self
    }
}
