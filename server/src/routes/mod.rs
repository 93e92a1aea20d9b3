//! Request routing.
//!
//! | Method | Path                       | Handler            |
//! |--------|----------------------------|--------------------|
//! | `GET`  | `/api/ping`                | [`ping::get`]      |
//! | `GET`  | `/api/v1/variables`        | [`variables::get`] |
//! | `GET`  | `/api/v1/mesh/{variable}`  | [`mesh::get`]      |
//!
//! Unknown paths get a `404 Not Found`, known paths with any method other
//! than `GET` get a `405 Method Not Allowed`.
use std::sync::Arc;

use http::request::Parts;
use http::{Method, StatusCode};
use percent_encoding::percent_decode_str;
use tracing::{Instrument, Span};

use crate::response::{IntoResponse, Response, method_not_allowed, plain_text};
use crate::server::{Server, ServerHandle};
use crate::state::ApplicationState;
use crate::telemetry::{self, HTTP_ROUTE};

pub mod mesh;
pub mod ping;
pub mod variables;

/// Every route exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Ping,
    Variables,
    Mesh,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::Ping, Endpoint::Variables, Endpoint::Mesh];

    /// The path pattern the endpoint is registered under.
    pub fn path_pattern(self) -> &'static str {
        match self {
            Endpoint::Ping => "/api/ping",
            Endpoint::Variables => "/api/v1/variables",
            Endpoint::Mesh => "/api/v1/mesh/{variable}",
        }
    }
}

/// The state handed to [`route_request`] for every incoming request.
#[derive(Clone)]
pub struct ServerState {
    router: Arc<matchit::Router<Endpoint>>,
    application_state: ApplicationState,
}

impl ServerState {
    pub fn new(application_state: ApplicationState) -> Self {
        Self {
            router: Arc::new(build_router()),
            application_state,
        }
    }
}

/// Start serving the API on the listeners registered with `server`.
pub fn run(server: Server, application_state: ApplicationState) -> ServerHandle {
    server.serve(route_request, ServerState::new(application_state))
}

fn build_router() -> matchit::Router<Endpoint> {
    let mut router = matchit::Router::new();
    for endpoint in Endpoint::ALL {
        // The patterns are static and don't overlap, checked by
        // `every_endpoint_is_routable` below.
        router.insert(endpoint.path_pattern(), endpoint).unwrap();
    }
    router
}

async fn route_request(
    request: http::Request<hyper::body::Incoming>,
    server_state: ServerState,
) -> Response {
    // None of our endpoints reads the request body.
    let (request_head, _) = request.into_parts();
    let root_span = telemetry::root_span(&request_head);
    let response = dispatch(&request_head, &server_state, &root_span)
        .instrument(root_span.clone())
        .await;
    telemetry::response_logger(&response, &root_span);
    response
}

async fn dispatch(request_head: &Parts, server_state: &ServerState, root_span: &Span) -> Response {
    let Ok(matched) = server_state.router.at(request_head.uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let endpoint = *matched.value;
    root_span.record(HTTP_ROUTE, endpoint.path_pattern());

    if request_head.method != Method::GET {
        return method_not_allowed("GET");
    }

    let application_state = &server_state.application_state;
    match endpoint {
        Endpoint::Ping => ping::get().into_response(),
        Endpoint::Variables => respond(variables::get(application_state), root_span),
        Endpoint::Mesh => {
            let raw_variable = matched.params.get("variable").unwrap_or_default();
            let variable = match percent_decode_str(raw_variable).decode_utf8() {
                Ok(variable) => variable.into_owned(),
                Err(e) => {
                    tracing::debug!(error.message = %e, "Invalid path parameter");
                    return plain_text(
                        StatusCode::BAD_REQUEST,
                        "The `variable` path parameter is not valid UTF-8 once percent-decoded",
                    );
                }
            };
            respond(mesh::get(application_state, variable).await, root_span)
        }
    }
}

/// Log handler failures and turn them into a response.
fn respond<R, E>(outcome: Result<R, E>, root_span: &Span) -> Response
where
    R: IntoResponse,
    E: std::error::Error + IntoResponse,
{
    match outcome {
        Ok(response) => response.into_response(),
        Err(e) => {
            telemetry::error_logger(&e, root_span);
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Endpoint, build_router};

    #[test]
    fn every_endpoint_is_routable() {
        let router = build_router();
        assert_eq!(*router.at("/api/ping").unwrap().value, Endpoint::Ping);
        assert_eq!(
            *router.at("/api/v1/variables").unwrap().value,
            Endpoint::Variables
        );

        let matched = router.at("/api/v1/mesh/temperature").unwrap();
        assert_eq!(*matched.value, Endpoint::Mesh);
        assert_eq!(matched.params.get("variable"), Some("temperature"));
    }

    #[test]
    fn unknown_paths_do_not_match() {
        let router = build_router();
        assert!(router.at("/api/v1/mesh").is_err());
        assert!(router.at("/api/v1/mesh/a/b").is_err());
        assert!(router.at("/").is_err());
    }
}
