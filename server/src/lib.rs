//! The HTTP API exposing mesh plots.
//!
//! - [`configuration`] assembles the hierarchical configuration;
//! - [`state`] holds the plot table and the data file shared by all requests;
//! - [`routes`] maps incoming requests to handlers;
//! - [`server`] accepts TCP connections and drives them with `hyper`;
//! - [`telemetry`] sets up `tracing` and the per-request root span.
pub mod configuration;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;
