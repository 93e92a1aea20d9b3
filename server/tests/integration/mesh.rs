use crate::helpers::TestApi;
use reqwest::StatusCode;
use serde_json::json;

async fn decode(response: reqwest::Response) -> serde_json::Value {
    let body = response.bytes().await.unwrap();
    rmp_serde::from_slice(&body).expect("The body is not valid MessagePack")
}

#[tokio::test]
async fn configured_plots_are_encoded_as_msgpack() {
    let api = TestApi::spawn().await;

    let response = api.get_mesh("temperature").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/msgpack");
    assert_eq!(
        decode(response).await,
        json!({
            "connectivity": [[0, 1, 2]],
            "nodes": [[0, 0], [1, 0], [0, 1]],
            "color": [300.0, 301.5, 299.2],
            "xlabel": "X",
            "ylabel": "Y",
            "title": "Mesh",
        })
    );
}

#[tokio::test]
async fn plots_fall_back_to_data_file_attributes() {
    let api = TestApi::spawn().await;

    let response = api.get_mesh("psi").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        decode(response).await,
        json!({
            "connectivity": [[0, 1, 2]],
            "nodes": [[0, 0], [1, 0], [0, 1]],
            "color": [0.25, -1.5, 3],
            "xlabel": "R",
            "ylabel": "Z",
            "title": "Flux",
        })
    );
}

#[tokio::test]
async fn path_parameters_are_percent_decoded() {
    let api = TestApi::spawn().await;

    let response = api.get_mesh("temp%65rature").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = api.get_mesh("%FF").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_plots_are_not_found() {
    let api = TestApi::spawn().await;

    let response = api.get_mesh("coords").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    insta::assert_snapshot!(response.text().await.unwrap(), @"There is no mesh plot named `coords`");
}

#[tokio::test]
async fn incomplete_plot_attributes_are_a_server_error() {
    let api = TestApi::spawn().await;

    let response = api.get_mesh("broken").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn missing_arrays_are_a_server_error() {
    let api = TestApi::spawn().await;

    let response = api.get_mesh("dangling").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    // The failure details stay in the logs.
    let body = response.text().await.unwrap();
    assert!(!body.contains("pressure"));
}
