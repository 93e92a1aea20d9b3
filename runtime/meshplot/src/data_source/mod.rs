//! Where the arrays come from.
//!
//! [`DataSource`] is the seam between the mesh builder and the storage layer.
//! Two implementations are provided out of the box:
//!
//! - [`InMemoryDataSource`], a plain name-to-array map;
//! - [`VariableFile`], a data file loaded from disk.
pub use file::{VariableFile, VariableFileError};
pub use memory::InMemoryDataSource;

use crate::array::{InconsistentShapeError, NestedList};
use std::sync::Arc;

mod file;
mod memory;

/// Read named numeric variables.
///
/// Implementations shared across request handlers must be `Send + Sync`.
/// Reads for distinct names are independent of each other.
pub trait DataSource {
    /// Read the variable called `name`, converted into a [`NestedList`].
    fn read(&self, name: &str) -> Result<NestedList, DataAccessError>;
}

impl<T> DataSource for &T
where
    T: DataSource + ?Sized,
{
    fn read(&self, name: &str) -> Result<NestedList, DataAccessError> {
        (**self).read(name)
    }
}

impl<T> DataSource for Box<T>
where
    T: DataSource + ?Sized,
{
    fn read(&self, name: &str) -> Result<NestedList, DataAccessError> {
        (**self).read(name)
    }
}

impl<T> DataSource for Arc<T>
where
    T: DataSource + ?Sized,
{
    fn read(&self, name: &str) -> Result<NestedList, DataAccessError> {
        (**self).read(name)
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
/// The error returned by [`DataSource::read`].
pub enum DataAccessError {
    #[error("There is no variable named `{name}` in the data source")]
    UnknownVariable { name: String },
    #[error("The variable `{name}` has an inconsistent shape")]
    ShapeMismatch {
        name: String,
        #[source]
        source: InconsistentShapeError,
    },
    /// The underlying storage failed to produce the variable.
    #[error("Failed to load the variable `{name}` from storage")]
    Storage {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DataAccessError {
    /// The name of the variable that couldn't be read.
    pub fn variable_name(&self) -> &str {
        match self {
            DataAccessError::UnknownVariable { name }
            | DataAccessError::ShapeMismatch { name, .. }
            | DataAccessError::Storage { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DataAccessError, DataSource, InMemoryDataSource};
    use crate::array::NestedList;
    use std::error::Error as _;
    use std::sync::Arc;

    /// A source whose backend is always unavailable.
    struct Offline;

    impl DataSource for Offline {
        fn read(&self, name: &str) -> Result<NestedList, DataAccessError> {
            Err(DataAccessError::Storage {
                name: name.to_owned(),
                source: "connection refused".into(),
            })
        }
    }

    #[test]
    fn storage_failures_keep_their_source() {
        let err = Offline.read("temp").unwrap_err();
        assert_eq!(err.variable_name(), "temp");
        insta::assert_snapshot!(err.to_string(), @"Failed to load the variable `temp` from storage");
        assert_eq!(err.source().unwrap().to_string(), "connection refused");
    }

    #[test]
    fn smart_pointers_are_data_sources() {
        let source = InMemoryDataSource::new().with_variable("psi", 1.5);
        let expected = NestedList::from(1.5);

        let boxed: Box<dyn DataSource> = Box::new(source.clone());
        assert_eq!(boxed.read("psi").unwrap(), expected);
        let shared = Arc::new(source);
        assert_eq!(shared.read("psi").unwrap(), expected);
    }
}
