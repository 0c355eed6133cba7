use std::num::NonZeroU32;
use std::path::PathBuf;

use crate::catalog::TestSelection;
use crate::error::{LoadrunError, LoadrunResult};

/// Environment used when none is given.
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Environments listed in the usage text. Other names are accepted as-is.
pub const KNOWN_ENVIRONMENTS: [&str; 3] = ["dev", "staging", "production"];

/// Resolved inputs for one invocation. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    pub selection: TestSelection,
    pub environment: String,
    pub generate_report: bool,
    pub distributed: bool,
    /// Remote worker hosts, in the order given.
    pub hosts: Vec<String>,
    pub users: Option<NonZeroU32>,
    /// Run length override in seconds.
    pub duration_secs: Option<NonZeroU32>,
    /// Explicit properties file; falls back to the derived one if missing.
    pub properties: Option<PathBuf>,
}

impl RunConfiguration {
    pub fn new(selection: TestSelection) -> Self {
        Self {
            selection,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            generate_report: false,
            distributed: false,
            hosts: Vec::new(),
            users: None,
            duration_secs: None,
            properties: None,
        }
    }

    /// Rejects combinations that cannot be launched.
    pub fn validate(&self) -> LoadrunResult<()> {
        if self.distributed && self.hosts.is_empty() {
            return Err(LoadrunError::configuration(
                "distributed mode requires --hosts with at least one host",
            ));
        }
        Ok(())
    }
}

/// Splits a comma-separated host list, dropping blanks.
pub fn parse_host_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .collect()
}
