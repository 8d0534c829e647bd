//! Code for loading program settings.
use crate::get_qernel_config_dir;
use crate::graph::GraphBuilder;
use crate::log::DEFAULT_LOG_LEVEL;
use anyhow::{Context, Result, ensure};
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "settings.toml";

const DEFAULT_SETTINGS_FILE_HEADER: &str = "# This file contains the program settings for qernel
# Uncomment a line to override the default value
";

/// Default log level for program
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_max_iterations() -> u32 {
    crate::graph::DEFAULT_MAX_ITERATIONS
}

fn default_cache_enabled() -> bool {
    true
}

fn default_balance_tolerance() -> f64 {
    crate::graph::DEFAULT_BALANCE_TOLERANCE
}

/// Get the path to where the settings file will be read from
pub fn get_settings_file_path() -> PathBuf {
    let mut path = get_qernel_config_dir();
    path.push(SETTINGS_FILE_NAME);

    path
}

/// Program settings from config file
#[derive(Debug, DocumentedFields, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// The default program log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// The maximum number of sweeps in one calculation pass
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Whether to memoise derived values and cache lazy attributes
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,
    /// The largest difference tolerated when checking slots are balanced
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_iterations: default_max_iterations(),
            cache_enabled: default_cache_enabled(),
            balance_tolerance: default_balance_tolerance(),
        }
    }
}

impl Settings {
    /// Read the contents of the settings file.
    ///
    /// If the file is not present, default values for settings will be used
    pub fn load() -> Result<Settings> {
        Self::load_from_path(&get_settings_file_path())
    }

    /// Read from the specified path, returning defaults if there is no file
    fn load_from_path(file_path: &Path) -> Result<Settings> {
        if !file_path.is_file() {
            return Ok(Settings::default());
        }

        let contents = fs::read_to_string(file_path)
            .with_context(|| format!("Could not read {}", file_path.display()))?;
        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Could not parse {}", file_path.display()))?;
        ensure!(
            settings.max_iterations > 0,
            "max_iterations must be greater than zero"
        );
        ensure!(
            settings.balance_tolerance >= 0.0,
            "balance_tolerance must not be negative"
        );

        Ok(settings)
    }

    /// Apply the calculation settings to a graph under construction
    pub fn configure(&self, builder: &mut GraphBuilder) {
        builder
            .max_iterations(self.max_iterations)
            .cache_enabled(self.cache_enabled)
            .balance_tolerance(self.balance_tolerance);
    }

    /// The contents of the default settings file
    pub fn default_file_contents() -> String {
        let settings_raw =
            toml::to_string(&Settings::default()).expect("Could not convert settings to TOML");

        // Iterate through the generated TOML, commenting out lines and adding docs
        let mut out = DEFAULT_SETTINGS_FILE_HEADER.to_string();
        for line in settings_raw.lines() {
            if let Some(last) = line.find('=') {
                let field = line[..last].trim();

                // All fields have doc comments
                if let Ok(docs) = Settings::get_field_docs(field) {
                    for doc_line in docs.lines() {
                        out.push_str("\n# # ");
                        out.push_str(doc_line.trim());
                        out.push('\n');
                    }
                }

                out.push_str("# ");
                out.push_str(line.trim());
                out.push('\n');
            }
        }

        out
    }
}
