use std::collections::BTreeMap;

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Eq)]
/// Everything we need to know to render a mesh plot.
///
/// `nodes`, `connectivity` and `color` are the names of the variables to be read
/// from the data source. `xlabel`, `ylabel` and `title` are displayed as-is.
///
/// All six fields are required: a plot configuration can't be built, either via
/// `serde` or via [`PlotConfig::from_attributes`], if any of them is missing.
pub struct PlotConfig {
    /// The variable holding the coordinates of the mesh nodes.
    pub nodes: String,
    /// The variable holding the node indices that make up each mesh element.
    pub connectivity: String,
    /// The variable holding the scalar field used to color the mesh.
    pub color: String,
    pub xlabel: String,
    pub ylabel: String,
    pub title: String,
}

impl PlotConfig {
    /// The keys that must be present in an attribute mapping, in the order
    /// they are checked by [`PlotConfig::from_attributes`].
    pub const REQUIRED_KEYS: [&'static str; 6] =
        ["nodes", "connectivity", "color", "xlabel", "ylabel", "title"];

    /// Build a [`PlotConfig`] out of an untyped attribute mapping, e.g. the
    /// attributes stored next to the variables in a data file.
    ///
    /// Unknown keys are ignored.
    /// It returns an error for the first required key that can't be found.
    pub fn from_attributes(
        attributes: &BTreeMap<String, String>,
    ) -> Result<Self, ConfigurationError> {
        let lookup = |key: &'static str| {
            attributes
                .get(key)
                .cloned()
                .ok_or(ConfigurationError::MissingKey { key })
        };
        // Struct fields are evaluated in source order, matching `REQUIRED_KEYS`.
        Ok(Self {
            nodes: lookup("nodes")?,
            connectivity: lookup("connectivity")?,
            color: lookup("color")?,
            xlabel: lookup("xlabel")?,
            ylabel: lookup("ylabel")?,
            title: lookup("title")?,
        })
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
/// The error returned by [`PlotConfig::from_attributes`] when the attribute
/// mapping is incomplete.
pub enum ConfigurationError {
    #[error("The plot configuration is missing the required `{key}` key")]
    MissingKey { key: &'static str },
}
