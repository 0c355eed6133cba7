//! Output locations for a run.
//!
//! Every artifact name is the lower-cased plan stem plus the invocation's
//! [`RunStamp`], so a batch shares one stamp but never shares a file.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::catalog::TestTypeDescriptor;
use crate::settings::Settings;
use crate::stamp::RunStamp;

/// Filesystem targets for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub test_plan: PathBuf,
    /// Properties file passed to the engine, if one resolved.
    pub properties: Option<PathBuf>,
    pub results: PathBuf,
    pub log: PathBuf,
    /// Set only when report generation was requested.
    pub report_dir: Option<PathBuf>,
}

impl ResolvedPaths {
    /// Location of a descriptor's test plan.
    pub fn test_plan_for(descriptor: &TestTypeDescriptor, settings: &Settings) -> PathBuf {
        settings.paths.test_plans_dir.join(descriptor.plan_file)
    }

    /// Derives every output path from the plan name and the shared stamp.
    pub fn derive(
        descriptor: &TestTypeDescriptor,
        settings: &Settings,
        stamp: &RunStamp,
        properties: Option<PathBuf>,
        with_report: bool,
    ) -> Self {
        let name = descriptor.test_name();
        let engine = &settings.engine;

        let results = settings.paths.results_dir.join(format!(
            "{name}-{stamp}.{}",
            engine.results_extension
        ));
        let log = settings
            .paths
            .logs_dir
            .join(format!("{}-{name}-{stamp}.log", engine.log_prefix));
        let report_dir =
            with_report.then(|| settings.paths.reports_dir.join(format!("{name}-{stamp}")));

        Self {
            test_plan: Self::test_plan_for(descriptor, settings),
            properties,
            results,
            log,
            report_dir,
        }
    }

    /// Report entry page, when a report was requested.
    pub fn report_index(&self) -> Option<PathBuf> {
        self.report_dir.as_ref().map(|dir| dir.join("index.html"))
    }

    /// Creates the parent directories of every output.
    ///
    /// The report directory itself is left for the engine to create; it
    /// refuses to write into an existing non-empty folder.
    pub fn prepare_output_dirs(&self) -> io::Result<()> {
        let outputs = [Some(&self.results), Some(&self.log), self.report_dir.as_ref()];
        for parent in outputs.into_iter().flatten().filter_map(|p| p.parent()) {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
