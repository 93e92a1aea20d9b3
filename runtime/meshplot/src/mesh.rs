use std::collections::BTreeMap;

use crate::array::NestedList;
use crate::body::{EncodedResponse, Msgpack, MsgpackSerializationError};
use crate::data_source::{DataAccessError, DataSource};
use crate::plot_config::{ConfigurationError, PlotConfig};

/// The body of a mesh response, before encoding.
///
/// Fields are encoded in declaration order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MeshPayload {
    pub connectivity: NestedList,
    pub nodes: NestedList,
    pub color: NestedList,
    pub xlabel: String,
    pub ylabel: String,
    pub title: String,
}

/// Read the arrays referenced by `plot_config` and encode them, together with
/// the plot labels, as a MessagePack mesh payload.
///
/// `data_source` is read exactly three times, in order: nodes, connectivity,
/// color. The first failing read aborts the remaining ones.
///
/// `variable` is the name the plot was requested under. It's recorded for
/// diagnostics but it doesn't influence which arrays are read.
#[tracing::instrument(
    name = "Build mesh response",
    skip(plot_config, data_source),
    fields(plot.title = %plot_config.title)
)]
pub fn build_mesh_response<D>(
    plot_config: &PlotConfig,
    data_source: &D,
    variable: &str,
) -> Result<EncodedResponse, MeshResponseError>
where
    D: DataSource + ?Sized,
{
    let PlotConfig {
        nodes: nodes_variable,
        connectivity: connectivity_variable,
        color: color_variable,
        xlabel,
        ylabel,
        title,
    } = plot_config;

    let read = |name: &str| {
        data_source
            .read(name)
            .map_err(|source| MeshResponseError::DataAccess {
                variable: name.to_owned(),
                source,
            })
    };
    let nodes = read(nodes_variable.as_str())?;
    let connectivity = read(connectivity_variable.as_str())?;
    let color = read(color_variable.as_str())?;

    let payload = MeshPayload {
        connectivity,
        nodes,
        color,
        xlabel: xlabel.clone(),
        ylabel: ylabel.clone(),
        title: title.clone(),
    };
    let body = Msgpack::new(&payload)?;
    Ok(body.into())
}

/// Like [`build_mesh_response`], but starting from an untyped attribute mapping.
///
/// The mapping is validated before touching `data_source`: if a required key is
/// missing, no read is performed.
pub fn build_mesh_response_from_attributes<D>(
    attributes: &BTreeMap<String, String>,
    data_source: &D,
    variable: &str,
) -> Result<EncodedResponse, MeshResponseError>
where
    D: DataSource + ?Sized,
{
    let plot_config = PlotConfig::from_attributes(attributes)?;
    build_mesh_response(&plot_config, data_source, variable)
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
/// The error returned by [`build_mesh_response`] and [`build_mesh_response_from_attributes`].
pub enum MeshResponseError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("Failed to read `{variable}` from the data source")]
    DataAccess {
        variable: String,
        #[source]
        source: DataAccessError,
    },
    #[error("Failed to encode the mesh payload as MessagePack")]
    Serialization(#[from] MsgpackSerializationError),
}
