use crate::helpers::TestApi;
use reqwest::{Method, StatusCode};

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let api = TestApi::spawn().await;

    for path in ["/", "/api/v1/mesh", "/api/v1/mesh/temperature/extra"] {
        let response = api.request(Method::GET, path).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn only_get_is_allowed() {
    let api = TestApi::spawn().await;

    for path in ["/api/ping", "/api/v1/variables", "/api/v1/mesh/temperature"] {
        let response = api.request(Method::POST, path).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{path}");
        assert_eq!(response.headers()["allow"], "GET");
    }
}
