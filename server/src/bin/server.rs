use anyhow::Context;
use meshplot_server::{
    configuration::{ApplicationProfile, Config},
    routes::run,
    server::{Server, ServerHandle, ShutdownMode},
    state::ApplicationState,
    telemetry::{get_subscriber, init_telemetry},
};
use std::time::Duration;
use tracing_log_error::log_error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("info".into(), std::io::stdout);
    init_telemetry(subscriber)?;

    // We isolate all the server setup and launch logic in a separate function
    // to have a single point for logging fatal errors that cause the application to exit.
    if let Err(e) = _main().await {
        log_error!(*e, "The application is exiting due to an error");
    }

    Ok(())
}

async fn _main() -> anyhow::Result<()> {
    let config = Config::load(Some(ApplicationProfile::Dev))?;
    let application_state =
        ApplicationState::new(&config.app).context("Failed to build the application state")?;

    let tcp_listener = config
        .server
        .listener()
        .await
        .context("Failed to bind the server TCP listener")?;
    let address = tcp_listener
        .local_addr()
        .context("The server TCP listener doesn't have a local socket address")?;
    let server_builder = Server::new().listen(tcp_listener);
    let shutdown_timeout = config.server.graceful_shutdown_timeout;

    tracing::info!("Starting to listen for incoming requests at {}", address);
    let server_handle = run(server_builder, application_state);
    graceful_shutdown(server_handle.clone(), shutdown_timeout);
    server_handle.await;
    Ok(())
}

fn graceful_shutdown(server_handle: ServerHandle, timeout: Duration) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_error!(e, "Failed to listen for the Ctrl+C signal");
            return;
        }
        tracing::info!("Received Ctrl+C, shutting down gracefully");
        server_handle
            .shutdown(ShutdownMode::Graceful { timeout })
            .await;
    });
}
