use crate::configuration::ApplicationProfile;
use crate::server::IncomingStream;
use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use meshplot::PlotConfig;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize, Debug, Clone)]
/// The top-level configuration object, determining the schema
/// we expect to see in the configuration files stored under `server/configuration`.
///
/// It bundles together the app configuration ([`AppConfig`]), visible to request
/// handlers via the application state, and the HTTP server configuration
/// ([`ServerConfig`]), only used inside the `main` entrypoint.
///
/// Check out [`Config::load`]'s documentation for more details on how configuration
/// values are populated.
pub struct Config {
    pub server: ServerConfig,
    #[serde(flatten)]
    pub app: AppConfig,
}

impl Config {
    /// Retrieve the application configuration by merging multiple configuration sources.
    ///
    /// # Application profiles
    ///
    /// Values for different profiles live in different files.
    /// The primary mechanism to specify the desired application profile is the `APP_PROFILE`
    /// environment variable.
    /// `default_profile` is used if the environment variable is not set.
    ///
    /// # Hierarchy
    ///
    /// The configuration sources are:
    ///
    /// 1. `base.yml` - The default configuration values, common to all profiles.
    /// 2. `<profile>.yml` - Configuration values specific to the desired profile.
    /// 3. Environment variables - Configuration values specific to the current environment.
    ///
    /// The configuration sources are listed in priority order, i.e.
    /// the last source in the list will override any previous source.
    ///
    /// # Environment variables
    ///
    /// All config-related environment variables must be prefixed with `APP_`.
    /// After the prefix, concatenate the names of the fields that must
    /// be traversed to reach the value you want to override, separated by `__`.
    ///
    /// E.g. `APP_SERVER__PORT` for [`ServerConfig::port`] or `APP_DATA__PATH` for
    /// [`DataConfig::path`].
    /// Fields of [`AppConfig`] are reached without an extra `APP__` segment.
    pub fn load(default_profile: Option<ApplicationProfile>) -> Result<Config, anyhow::Error> {
        let application_profile = ApplicationProfile::load(default_profile)
            .context("Failed to load the desired application profile")?;

        let configuration_dir = manifest_dir().join("configuration");
        let base_filepath = configuration_dir.join("base.yml");
        let profile_filename = format!("{}.yml", application_profile.as_str());
        let profile_filepath = configuration_dir.join(profile_filename);

        let figment = Figment::new()
            .merge(Yaml::file(base_filepath))
            .merge(Yaml::file(profile_filepath))
            .merge(Env::prefixed("APP_").split("__").ignore(&["PROFILE"]));

        let configuration: Config = figment
            .extract()
            .context("Failed to load hierarchical configuration")?;
        Ok(configuration)
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
/// Configuration for the HTTP server used to expose the API.
pub struct ServerConfig {
    /// The port that the server must listen on.
    ///
    /// Set the `APP_SERVER__PORT` environment variable to override its value.
    #[serde(deserialize_with = "serde_aux::field_attributes::deserialize_number_from_string")]
    pub port: u16,
    /// The network interface that the server must be bound to.
    ///
    /// E.g. `0.0.0.0` for listening to incoming requests from
    /// all sources.
    ///
    /// Set the `APP_SERVER__IP` environment variable to override its value.
    pub ip: std::net::IpAddr,
    /// The timeout for graceful shutdown of the server.
    ///
    /// E.g. `1 minute` for a 1 minute timeout.
    ///
    /// Set the `APP_SERVER__GRACEFUL_SHUTDOWN_TIMEOUT` environment variable to override its value.
    #[serde(with = "humantime_serde")]
    pub graceful_shutdown_timeout: std::time::Duration,
}

impl ServerConfig {
    /// Bind a TCP listener according to the specified parameters.
    pub async fn listener(&self) -> Result<IncomingStream, std::io::Error> {
        let addr = SocketAddr::new(self.ip, self.port);
        IncomingStream::bind(addr).await
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
/// The configuration values used by request handlers.
pub struct AppConfig {
    pub data: DataConfig,
    /// Mesh plots, keyed by the name they're requested under.
    ///
    /// They take precedence over the plot attributes stored in the data file.
    #[serde(default)]
    pub plots: BTreeMap<String, PlotConfig>,
}

#[derive(serde::Deserialize, Debug, Clone)]
/// Where simulation data is loaded from.
pub struct DataConfig {
    /// The path to the JSON data file.
    ///
    /// Relative paths are resolved against the directory of the `server` crate.
    ///
    /// Set the `APP_DATA__PATH` environment variable to override its value.
    pub path: PathBuf,
}

impl DataConfig {
    /// The location of the data file, as an absolute path if [`DataConfig::path`] is relative.
    pub fn resolved_path(&self) -> PathBuf {
        if self.path.is_relative() {
            manifest_dir().join(&self.path)
        } else {
            self.path.clone()
        }
    }
}

fn manifest_dir() -> &'static Path {
    let manifest_dir = env!(
        "CARGO_MANIFEST_DIR",
        "`CARGO_MANIFEST_DIR` was not set. Are you using a custom build system?"
    );
    Path::new(manifest_dir)
}
