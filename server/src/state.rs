use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use anyhow::Context;
use meshplot::{PlotConfig, VariableFile};

use crate::configuration::AppConfig;

/// The state shared by all request handlers.
///
/// It's cheap to clone.
#[derive(Debug, Clone)]
pub struct ApplicationState {
    plots: Arc<BTreeMap<String, PlotConfig>>,
    data_file: Arc<VariableFile>,
}

/// How a mesh plot is described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotDefinition {
    /// A plot listed in the application configuration.
    Configured(PlotConfig),
    /// A plot described by the attributes stored in the data file.
    ///
    /// They are not validated until the plot is requested.
    Attributes(BTreeMap<String, String>),
}

impl ApplicationState {
    /// Load the data file and index the configured plots.
    pub fn new(config: &AppConfig) -> Result<Self, anyhow::Error> {
        let data_file = VariableFile::open(config.data.resolved_path())
            .context("Failed to open the simulation data file")?;
        tracing::info!(
            data_file.path = %data_file.path().display(),
            n_configured_plots = config.plots.len(),
            "Loaded the simulation data"
        );
        Ok(Self {
            plots: Arc::new(config.plots.clone()),
            data_file: Arc::new(data_file),
        })
    }

    /// Look up the plot named `name`.
    ///
    /// Plots from the application configuration shadow plots with the same name
    /// described in the data file.
    pub fn plot(&self, name: &str) -> Option<PlotDefinition> {
        if let Some(plot_config) = self.plots.get(name) {
            return Some(PlotDefinition::Configured(plot_config.clone()));
        }
        self.data_file
            .plot_attributes(name)
            .cloned()
            .map(PlotDefinition::Attributes)
    }

    /// The names of all known plots, sorted and without duplicates.
    pub fn plot_names(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self
            .plots
            .keys()
            .map(String::as_str)
            .chain(self.data_file.plot_names())
            .collect();
        names.into_iter().collect()
    }

    /// The data file backing every plot.
    pub fn data_file(&self) -> Arc<VariableFile> {
        self.data_file.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{ApplicationState, PlotDefinition};
    use crate::configuration::{AppConfig, DataConfig};
    use meshplot::PlotConfig;
    use std::collections::BTreeMap;
    use std::io::Write;

    const DOCUMENT: &str = r#"{
        "variables": {
            "coords": { "shape": [3, 2], "data": [0, 0, 1, 0, 0, 1] }
        },
        "attributes": {
            "psi": { "nodes": "coords" },
            "temp": { "nodes": "coords" }
        }
    }"#;

    fn plot_config(title: &str) -> PlotConfig {
        PlotConfig {
            nodes: "coords".into(),
            connectivity: "conn".into(),
            color: "temp".into(),
            xlabel: "X".into(),
            ylabel: "Y".into(),
            title: title.into(),
        }
    }

    fn state(document: &tempfile::NamedTempFile) -> ApplicationState {
        let mut plots = BTreeMap::new();
        plots.insert("temp".to_string(), plot_config("Configured"));
        plots.insert("alpha".to_string(), plot_config("Alpha"));
        let config = AppConfig {
            data: DataConfig {
                path: document.path().to_owned(),
            },
            plots,
        };
        ApplicationState::new(&config).unwrap()
    }

    fn document() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();
        file
    }

    #[test]
    fn configured_plots_shadow_data_file_attributes() {
        let document = document();
        let state = state(&document);

        assert_eq!(
            state.plot("temp"),
            Some(PlotDefinition::Configured(plot_config("Configured")))
        );
        let Some(PlotDefinition::Attributes(attributes)) = state.plot("psi") else {
            panic!("Expected `psi` to be described by the data file");
        };
        assert_eq!(attributes["nodes"], "coords");
        assert_eq!(state.plot("coords"), None);
    }

    #[test]
    fn plot_names_are_sorted_and_deduplicated() {
        let document = document();
        let state = state(&document);
        assert_eq!(state.plot_names(), vec!["alpha", "psi", "temp"]);
    }

    #[test]
    fn a_missing_data_file_is_a_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            data: DataConfig {
                path: dir.path().join("missing.json"),
            },
            plots: BTreeMap::new(),
        };
        let err = ApplicationState::new(&config).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Failed to open the simulation data file");
    }
}
