use std::collections::HashMap;

use super::{DataAccessError, DataSource};
use crate::array::NestedList;

/// A [`DataSource`] backed by a map held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    variables: HashMap<String, NestedList>,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, replacing any previous variable with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<NestedList>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Add a variable and return `self`, for chaining.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<NestedList>) -> Self {
        self.insert(name, value);
        self
    }
}

impl DataSource for InMemoryDataSource {
    fn read(&self, name: &str) -> Result<NestedList, DataAccessError> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| DataAccessError::UnknownVariable {
                name: name.to_owned(),
            })
    }
}
