//! Logging setup and the per-request root span.
//!
//! Field names follow [OpenTelemetry's semantic convention](https://opentelemetry.io/docs/specs/semconv/)
//! whenever possible.
use anyhow::Context;
use http::request::Parts;
use http::{Method, Version};
use tokio::task::JoinHandle;
use tracing::{Span, Subscriber, Value};
use tracing_log::LogTracer;
use tracing_log_error::fields::{
    ERROR_DETAILS, ERROR_MESSAGE, ERROR_SOURCE_CHAIN, error_details, error_message,
    error_source_chain,
};
use tracing_log_error::log_error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use crate::response::Response;

/// The field name for the HTTP method of the incoming request (if canonical).
pub const HTTP_REQUEST_METHOD: &str = "http.request.method";
/// The field name for the HTTP status code of the outgoing response.
pub const HTTP_RESPONSE_STATUS_CODE: &str = "http.response.status_code";
/// The field name for the path pattern matched by the incoming request.
///
/// It stays empty if no route matched.
pub const HTTP_ROUTE: &str = "http.route";
/// The version of the network protocol used by the incoming request.
pub const NETWORK_PROTOCOL_VERSION: &str = "network.protocol.version";
/// The path targeted by the incoming request.
pub const URL_PATH: &str = "url.path";
/// The query string of the incoming request.
pub const URL_QUERY: &str = "url.query";
/// The user agent header for the incoming request.
pub const USER_AGENT_ORIGINAL: &str = "user_agent.original";

/// Compose multiple layers into a `tracing` subscriber.
///
/// `env_filter` is only used if the `RUST_LOG` environment variable is not set.
pub fn get_subscriber<Sink>(env_filter: String, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(sink)
        .finish()
}

/// Register a subscriber as global default to process span data.
///
/// It should only be called once!
pub fn init_telemetry(subscriber: impl Subscriber + Send + Sync) -> Result<(), anyhow::Error> {
    LogTracer::init().context("Failed to redirect `log` records to `tracing`")?;
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set a global `tracing` subscriber")?;
    Ok(())
}

/// Construct a new root span for the given request.
pub fn root_span(request_head: &Parts) -> Span {
    // We use the `{ <expr> }` syntax to tell `tracing` that it should
    // interpret those identifiers as expressions rather than string literals.
    tracing::info_span!(
        "HTTP request",
        { HTTP_REQUEST_METHOD } = http_request_method(request_head),
        { NETWORK_PROTOCOL_VERSION } = network_protocol_version(request_head),
        { URL_QUERY } = url_query(request_head),
        { URL_PATH } = url_path(request_head),
        { USER_AGENT_ORIGINAL } = user_agent_original(request_head),
        // Populated after routing and after the handler has run.
        // `tracing` requires all fields to be declared when the span is created.
        { HTTP_ROUTE } = tracing::field::Empty,
        { HTTP_RESPONSE_STATUS_CODE } = tracing::field::Empty,
        { ERROR_MESSAGE } = tracing::field::Empty,
        { ERROR_DETAILS } = tracing::field::Empty,
        { ERROR_SOURCE_CHAIN } = tracing::field::Empty,
    )
}

/// Enrich the root span with information extracted from the outgoing response.
pub fn response_logger(response: &Response, root_span: &Span) {
    root_span.record(HTTP_RESPONSE_STATUS_CODE, response.status().as_u16());
}

/// Log error details.
///
/// It emits an error event and attaches information about the error to the root span.
/// If multiple errors are observed for the same request, only the details of the last one
/// are attached to the root span.
pub fn error_logger<E>(e: &E, root_span: &Span)
where
    E: std::error::Error,
{
    log_error!(e, "An error occurred during request handling");
    root_span.record(ERROR_MESSAGE, error_message(e));
    root_span.record(ERROR_DETAILS, error_details(e));
    root_span.record(ERROR_SOURCE_CHAIN, error_source_chain(e));
}

/// Spawn a blocking task without losing the current `tracing` span.
///
/// `tracing`'s span context is thread-local, so it must be re-attached
/// explicitly on the thread that runs the blocking workload.
pub fn spawn_blocking_with_tracing<F, R>(f: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let current_span = Span::current();
    tokio::task::spawn_blocking(move || current_span.in_scope(f))
}

fn http_request_method(request_head: &Parts) -> impl Value + use<> {
    match request_head.method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::TRACE => "TRACE",
        Method::PATCH => "PATCH",
        Method::CONNECT => "CONNECT",
        Method::HEAD => "HEAD",
        Method::DELETE => "DELETE",
        Method::OPTIONS => "OPTIONS",
        _ => "_OTHER",
    }
}

fn network_protocol_version(request_head: &Parts) -> impl Value + use<> {
    match request_head.version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_11 => "1.1",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "_OTHER",
    }
}

fn url_path(request_head: &Parts) -> impl Value + '_ {
    request_head.uri.path()
}

fn url_query(request_head: &Parts) -> impl Value + '_ {
    request_head.uri.query().unwrap_or_default()
}

fn user_agent_original(request_head: &Parts) -> impl Value + '_ {
    request_head
        .headers
        .get(http::header::USER_AGENT)
        .map(|h| h.to_str().unwrap_or_default())
        .unwrap_or_default()
}
