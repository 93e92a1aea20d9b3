//! # meshplot
//!
//! Build mesh plots out of the variables stored in a simulation data file and
//! encode them as MessagePack, ready to be shipped to a browser client.
//!
//! The entrypoint is [`build_mesh_response`]: given a [`PlotConfig`] and a
//! [`DataSource`], it reads the node coordinates, the connectivity and the
//! color field, assembles a [`MeshPayload`] and returns an [`EncodedResponse`]
//! whose content type is `application/msgpack`.
//!
//! ```rust
//! use meshplot::{build_mesh_response, InMemoryDataSource, NestedList, PlotConfig};
//!
//! let data_source = InMemoryDataSource::new()
//!     .with_variable("coords", NestedList::from(vec![vec![0, 0], vec![1, 0], vec![0, 1]]))
//!     .with_variable("conn", NestedList::from(vec![vec![0, 1, 2]]))
//!     .with_variable("temp", NestedList::from(vec![300.0, 301.5, 299.2]));
//! // `variable` is informational: the arrays to read come from `plot_config`.
//! let plot_config = PlotConfig {
//!     nodes: "coords".into(),
//!     connectivity: "conn".into(),
//!     color: "temp".into(),
//!     xlabel: "X".into(),
//!     ylabel: "Y".into(),
//!     title: "Mesh".into(),
//! };
//!
//! let response = build_mesh_response(&plot_config, &data_source, "temp").unwrap();
//! assert_eq!(response.content_type, "application/msgpack");
//! ```
pub use array::{InconsistentShapeError, NestedList, Number, Variable};
pub use body::{APPLICATION_MSGPACK, EncodedResponse, Msgpack, MsgpackSerializationError};
pub use data_source::{
    DataAccessError, DataSource, InMemoryDataSource, VariableFile, VariableFileError,
};
pub use mesh::{
    MeshPayload, MeshResponseError, build_mesh_response, build_mesh_response_from_attributes,
};
pub use plot_config::{ConfigurationError, PlotConfig};

pub mod array;
pub mod body;
pub mod data_source;
mod mesh;
mod plot_config;
