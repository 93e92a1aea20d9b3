use crate::helpers::TestApi;
use meshplot_server::server::ShutdownMode;
use reqwest::StatusCode;
use std::time::Duration;

#[tokio::test]
async fn graceful_shutdown_stops_accepting_connections() {
    let api = TestApi::spawn().await;
    assert_eq!(api.get_ping().await.status(), StatusCode::OK);

    let server_handle = api.server_handle.clone();
    tokio::time::timeout(
        Duration::from_secs(10),
        server_handle.shutdown(ShutdownMode::Graceful {
            timeout: Duration::from_secs(5),
        }),
    )
    .await
    .expect("The server didn't shut down in time");

    // Awaiting the handle resolves once the server is gone.
    tokio::time::timeout(Duration::from_secs(5), api.server_handle.clone())
        .await
        .expect("The server handle didn't resolve after shutdown");

    let outcome = reqwest::Client::new()
        .get(format!("{}/api/ping", api.api_address))
        .send()
        .await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn forced_shutdown_completes_immediately() {
    let api = TestApi::spawn().await;
    assert_eq!(api.get_ping().await.status(), StatusCode::OK);

    tokio::time::timeout(
        Duration::from_secs(5),
        api.server_handle.clone().shutdown(ShutdownMode::Forced),
    )
    .await
    .expect("The server didn't shut down in time");
}
