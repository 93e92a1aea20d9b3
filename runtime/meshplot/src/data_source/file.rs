use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{DataAccessError, DataSource};
use crate::array::{NestedList, Variable};

#[derive(serde::Deserialize)]
struct VariableFileContents {
    variables: BTreeMap<String, Variable>,
    #[serde(default)]
    attributes: BTreeMap<String, BTreeMap<String, String>>,
}

/// A simulation output file, loaded from disk.
///
/// The file is a JSON document with two top-level keys:
///
/// - `variables`, mapping each variable name to its `shape` and its flat,
///   row-major `data`;
/// - `attributes` (optional), mapping plot names to string key-value pairs,
///   e.g. the keys required by [`PlotConfig::from_attributes`](crate::PlotConfig::from_attributes).
///
/// ```json
/// {
///   "variables": {
///     "coords": { "shape": [3, 2], "data": [0, 0, 1, 0, 0, 1] },
///     "conn": { "shape": [1, 3], "data": [0, 1, 2] },
///     "temp": { "shape": [3], "data": [300.0, 301.5, 299.2] }
///   },
///   "attributes": {
///     "temp": {
///       "nodes": "coords", "connectivity": "conn", "color": "temp",
///       "xlabel": "X", "ylabel": "Y", "title": "Mesh"
///     }
///   }
/// }
/// ```
///
/// The whole file is parsed by [`VariableFile::open`]; reads are served from memory.
#[derive(Debug)]
pub struct VariableFile {
    path: PathBuf,
    variables: BTreeMap<String, Variable>,
    attributes: BTreeMap<String, BTreeMap<String, String>>,
}

impl VariableFile {
    /// Open and parse the data file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VariableFileError> {
        let path = path.as_ref();
        let raw = fs_err::read(path).map_err(|source| VariableFileError::Io {
            path: path.to_owned(),
            source,
        })?;
        let contents: VariableFileContents =
            serde_json::from_slice(&raw).map_err(|source| VariableFileError::Parse {
                path: path.to_owned(),
                source,
            })?;
        tracing::debug!(
            data_file.path = %path.display(),
            data_file.n_variables = contents.variables.len(),
            data_file.n_plots = contents.attributes.len(),
            "Opened data file"
        );
        Ok(Self {
            path: path.to_owned(),
            variables: contents.variables,
            attributes: contents.attributes,
        })
    }

    /// The location this file was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The names of the variables stored in this file, in lexicographic order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// The names of the plots that carry attributes in this file, in lexicographic order.
    pub fn plot_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// The attributes attached to `plot`, if any.
    pub fn plot_attributes(&self, plot: &str) -> Option<&BTreeMap<String, String>> {
        self.attributes.get(plot)
    }
}

impl DataSource for VariableFile {
    fn read(&self, name: &str) -> Result<NestedList, DataAccessError> {
        let variable = self
            .variables
            .get(name)
            .ok_or_else(|| DataAccessError::UnknownVariable {
                name: name.to_owned(),
            })?;
        variable
            .clone()
            .into_nested()
            .map_err(|source| DataAccessError::ShapeMismatch {
                name: name.to_owned(),
                source,
            })
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
/// The error returned by [`VariableFile::open`].
pub enum VariableFileError {
    #[error("Failed to read the data file at `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("The data file at `{}` is not well-formed", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
