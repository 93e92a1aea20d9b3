use crate::helpers::TestApi;
use reqwest::StatusCode;

#[tokio::test]
async fn configured_and_stored_plots_are_listed() {
    let api = TestApi::spawn().await;

    let response = api.get_variables().await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");
    let names: Vec<String> = response.json().await.unwrap();
    assert_eq!(names, vec!["broken", "dangling", "psi", "temperature"]);
}
