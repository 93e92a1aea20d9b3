//! Hierarchical configuration: YAML files under `configuration/`, overridden by
//! `APP_`-prefixed environment variables.
pub use profile::ApplicationProfile;
pub use schema::{AppConfig, Config, DataConfig, ServerConfig};

mod profile;
mod schema;
