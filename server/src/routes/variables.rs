use http::StatusCode;

use crate::response::{IntoResponse, Response, json, plain_text};
use crate::state::ApplicationState;

/// List the names of the plots that can be requested from the mesh endpoint,
/// as a JSON array of strings in lexicographic order.
pub fn get(application_state: &ApplicationState) -> Result<Response, ListPlotsError> {
    Ok(json(&application_state.plot_names())?)
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to serialize the list of plots")]
pub struct ListPlotsError(#[from] serde_json::Error);

impl IntoResponse for ListPlotsError {
    fn into_response(self) -> Response {
        plain_text(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong while listing the mesh plots",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ListPlotsError;
    use crate::response::IntoResponse;
    use http::StatusCode;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn failures_are_reported_as_plain_text() {
        let source = serde_json::from_str::<u8>("not json").unwrap_err();
        let response = ListPlotsError(source).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()["content-type"],
            "text/plain; charset=utf-8"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        insta::assert_snapshot!(String::from_utf8_lossy(&body), @"Something went wrong while listing the mesh plots");
    }
}
