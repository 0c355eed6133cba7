//! Properties-file selection.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::catalog::{TestCategory, TestTypeDescriptor};
use crate::console;
use crate::settings::Settings;

/// Chooses the properties file handed to the engine.
#[derive(Debug, Clone, Copy)]
pub struct ProfileResolver<'a> {
    settings: &'a Settings,
}

impl<'a> ProfileResolver<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Resolves the properties file for a run.
    ///
    /// An explicit file that exists always wins. A missing explicit file, or a
    /// missing derived default, is only a warning: the run then proceeds with
    /// the next candidate or with no properties file at all.
    pub fn resolve(
        &self,
        descriptor: &TestTypeDescriptor,
        environment: &str,
        explicit: Option<&Path>,
    ) -> Option<PathBuf> {
        if let Some(path) = explicit {
            if path.is_file() {
                debug!(path = %path.display(), "using explicit properties file");
                return Some(path.to_path_buf());
            }
            console::warn(format!(
                "Properties file not found: {}, falling back to defaults",
                path.display()
            ));
        }

        let derived = self.derive_default(descriptor, environment);
        if derived.is_file() {
            debug!(path = %derived.display(), "using derived properties file");
            Some(derived)
        } else {
            console::warn(format!(
                "Properties file not found: {}, running without one",
                derived.display()
            ));
            None
        }
    }

    /// Default properties file for a test type and environment.
    ///
    /// Basic test types prefer the credentials file when it is present.
    pub fn derive_default(&self, descriptor: &TestTypeDescriptor, environment: &str) -> PathBuf {
        let config_dir = &self.settings.paths.config_dir;

        if descriptor.category == TestCategory::Basic {
            let credentials = config_dir.join(&self.settings.credentials_file);
            if credentials.is_file() {
                return credentials;
            }
        }

        let prefix = descriptor.category.properties_prefix().unwrap_or_default();
        config_dir.join(format!("{prefix}{environment}.properties"))
    }
}
