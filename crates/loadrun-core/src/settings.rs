//! Launcher settings.
//!
//! Settings describe where plans, properties and outputs live and how the
//! engine is started. Sources, lowest precedence first:
//! - Hardcoded defaults
//! - File named by `LOADRUN_CONFIG`
//! - `./config/loadrun.{yaml,toml,json}`
//! - `LOADRUN_*` environment variables (`__` separates nested keys)

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::catalog::HeapProfile;

/// Root settings structure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,

    #[serde(default)]
    pub engine: EngineSettings,

    #[serde(default)]
    pub heap: HeapSettings,

    /// Credentials properties file preferred by basic test types.
    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,
}

fn default_credentials_file() -> String {
    "credentials.properties".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            paths: PathSettings::default(),
            engine: EngineSettings::default(),
            heap: HeapSettings::default(),
            credentials_file: default_credentials_file(),
        }
    }
}

impl Settings {
    /// Loads settings from every source and validates them.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::set_defaults(Config::builder())?;

        if let Ok(config_path) = std::env::var("LOADRUN_CONFIG") {
            builder = builder.add_source(File::with_name(&config_path).required(false));
        }

        builder = builder
            .add_source(File::with_name("./config/loadrun").required(false))
            // Example: LOADRUN_PATHS__RESULTS_DIR=/tmp/results
            .add_source(
                Environment::with_prefix("LOADRUN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads defaults overlaid with a single settings file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Self::set_defaults(Config::builder())?
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn set_defaults(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let engine = EngineSettings::default();
        let heap = HeapSettings::default();
        builder
            .set_default("paths.test_plans_dir", "test-plans")?
            .set_default("paths.config_dir", "config")?
            .set_default("paths.results_dir", "results")?
            .set_default("paths.logs_dir", "logs")?
            .set_default("paths.reports_dir", "reports")?
            .set_default("engine.binary", engine.binary)?
            .set_default("engine.results_extension", engine.results_extension)?
            .set_default("engine.log_prefix", engine.log_prefix)?
            .set_default("engine.heap_env_var", engine.heap_env_var)?
            .set_default("heap.small", heap.small)?
            .set_default("heap.medium", heap.medium)?
            .set_default("heap.large", heap.large)?
            .set_default("credentials_file", default_credentials_file())
    }

    /// Validates settings values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.binary.trim().is_empty() {
            return Err(ConfigError::Message(
                "engine.binary must not be empty".to_string(),
            ));
        }

        if self.engine.results_extension.trim().is_empty() {
            return Err(ConfigError::Message(
                "engine.results_extension must not be empty".to_string(),
            ));
        }

        if self.engine.heap_env_var.trim().is_empty() {
            return Err(ConfigError::Message(
                "engine.heap_env_var must not be empty".to_string(),
            ));
        }

        for profile in [HeapProfile::Small, HeapProfile::Medium, HeapProfile::Large] {
            if self.heap.args_for(profile).trim().is_empty() {
                return Err(ConfigError::Message(format!(
                    "heap.{profile} must not be empty"
                )));
            }
        }

        Ok(())
    }
}

/// Filesystem layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathSettings {
    pub test_plans_dir: PathBuf,
    /// Directory holding environment and credentials properties files
    pub config_dir: PathBuf,
    pub results_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            test_plans_dir: PathBuf::from("test-plans"),
            config_dir: PathBuf::from("config"),
            results_dir: PathBuf::from("results"),
            logs_dir: PathBuf::from("logs"),
            reports_dir: PathBuf::from("reports"),
        }
    }
}

/// How the load-test engine is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineSettings {
    /// Engine executable, resolved through `PATH` when not absolute
    pub binary: String,

    /// Extension of the results file (without the dot)
    pub results_extension: String,

    /// Prefix of the engine log file name
    pub log_prefix: String,

    /// Child-process environment variable receiving the heap arguments
    pub heap_env_var: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            binary: default_engine_binary(),
            results_extension: "jtl".to_string(),
            log_prefix: "jmeter".to_string(),
            heap_env_var: "HEAP".to_string(),
        }
    }
}

/// `$JMETER_HOME/bin/jmeter` when `JMETER_HOME` is set, else `jmeter` from `PATH`.
fn default_engine_binary() -> String {
    match std::env::var_os("JMETER_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home)
            .join("bin")
            .join("jmeter")
            .to_string_lossy()
            .into_owned(),
        _ => "jmeter".to_string(),
    }
}

/// JVM heap arguments per profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeapSettings {
    pub small: String,
    pub medium: String,
    pub large: String,
}

impl Default for HeapSettings {
    fn default() -> Self {
        Self {
            small: "-Xms512m -Xmx1g".to_string(),
            medium: "-Xms1g -Xmx2g".to_string(),
            large: "-Xms2g -Xmx4g".to_string(),
        }
    }
}

impl HeapSettings {
    pub fn args_for(&self, profile: HeapProfile) -> &str {
        match profile {
            HeapProfile::Small => &self.small,
            HeapProfile::Medium => &self.medium,
            HeapProfile::Large => &self.large,
        }
    }
}
