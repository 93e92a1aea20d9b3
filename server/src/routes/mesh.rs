use http::StatusCode;
use meshplot::{MeshResponseError, build_mesh_response, build_mesh_response_from_attributes};
use tokio::task::JoinError;

use crate::response::{IntoResponse, Response, plain_text};
use crate::state::{ApplicationState, PlotDefinition};
use crate::telemetry::spawn_blocking_with_tracing;

/// Respond with the mesh plot registered as `variable`, encoded as MessagePack.
///
/// Plots from the application configuration win over those described in the
/// data file. Unknown plots get a `404 Not Found`.
pub async fn get(
    application_state: &ApplicationState,
    variable: String,
) -> Result<Response, GetMeshError> {
    let Some(plot) = application_state.plot(&variable) else {
        return Ok(plain_text(
            StatusCode::NOT_FOUND,
            format!("There is no mesh plot named `{variable}`"),
        ));
    };
    let data_file = application_state.data_file();
    // Reshaping and encoding the arrays is CPU-bound.
    let encoded = spawn_blocking_with_tracing(move || match plot {
        PlotDefinition::Configured(plot_config) => {
            build_mesh_response(&plot_config, &*data_file, &variable)
        }
        PlotDefinition::Attributes(attributes) => {
            build_mesh_response_from_attributes(&attributes, &*data_file, &variable)
        }
    })
    .await??;
    Ok(encoded.into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum GetMeshError {
    #[error("Failed to build the mesh plot")]
    Build(#[from] MeshResponseError),
    #[error("The task building the mesh plot did not complete")]
    Join(#[from] JoinError),
}

impl IntoResponse for GetMeshError {
    fn into_response(self) -> Response {
        plain_text(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong while building the mesh plot",
        )
    }
}
