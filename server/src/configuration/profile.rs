use anyhow::Context;
use std::env::VarError;

/// The application profile, i.e. the type of environment the application is running in.
/// See [`Config::load`] for more details on how it influences the way configuration
/// is loaded.
///
/// [`Config::load`]: crate::configuration::Config::load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationProfile {
    /// Local development profile.
    ///
    /// The corresponding configuration file is `dev.yml`.
    Dev,
    /// The profile used by the integration test suite.
    ///
    /// The corresponding configuration file is `test.yml`.
    /// It binds to a random port and registers a few extra plots that exercise
    /// failure modes.
    Test,
    /// Production profile.
    ///
    /// The corresponding configuration file is `prod.yml`.
    /// It's committed to the repository, so it must only contain non-sensitive values.
    /// Everything else should be injected at runtime via environment variables.
    Prod,
}

impl ApplicationProfile {
    /// Load the application profile from the `APP_PROFILE` environment variable.
    ///
    /// `default_profile` is used if the variable is not set.
    pub fn load(
        default_profile: Option<ApplicationProfile>,
    ) -> Result<ApplicationProfile, anyhow::Error> {
        static PROFILE_ENV_VAR: &str = "APP_PROFILE";

        match (std::env::var(PROFILE_ENV_VAR), default_profile) {
            (Ok(raw_value), _) => raw_value.parse().with_context(|| {
                format!("Failed to parse the `{PROFILE_ENV_VAR}` environment variable")
            }),
            (Err(VarError::NotPresent), Some(default_profile)) => Ok(default_profile),
            (Err(e), _) => Err(anyhow::anyhow!(e).context(format!(
                "Failed to read the `{PROFILE_ENV_VAR}` environment variable"
            ))),
        }
    }

    /// Return the profile as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationProfile::Dev => "dev",
            ApplicationProfile::Test => "test",
            ApplicationProfile::Prod => "prod",
        }
    }
}

impl std::str::FromStr for ApplicationProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(ApplicationProfile::Dev),
            "test" => Ok(ApplicationProfile::Test),
            "prod" | "production" => Ok(ApplicationProfile::Prod),
            s => Err(anyhow::anyhow!(
                "`{}` is not a valid application profile.\nValid options are `dev`, `test` and `prod`.",
                s
            )),
        }
    }
}
