//! Single and batch execution.
//!
//! Runs are strictly sequential: each engine invocation blocks until the child
//! exits. A batch never stops early; it records every outcome and succeeds only
//! if every attempted run succeeded. Missing plans in a batch are skipped.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::catalog::{self, TestSelection, TestTypeDescriptor};
use crate::command::CommandBuilder;
use crate::console;
use crate::error::{LoadrunError, LoadrunResult};
use crate::launcher::{Launcher, ReportOpener};
use crate::paths::ResolvedPaths;
use crate::profile::ProfileResolver;
use crate::run_config::RunConfiguration;
use crate::settings::Settings;
use crate::stamp::RunStamp;

/// Result of one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub test_type: &'static str,
    pub exit_code: i32,
    pub paths: ResolvedPaths,
}

impl RunOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// One step of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEntry {
    Ran(RunOutcome),
    /// Engine could not be started for this type.
    LaunchFailed {
        test_type: &'static str,
        reason: String,
    },
    /// Test plan absent; not counted as a failure.
    Skipped {
        test_type: &'static str,
        plan: PathBuf,
    },
}

impl BatchEntry {
    pub fn test_type(&self) -> &'static str {
        match self {
            Self::Ran(outcome) => outcome.test_type,
            Self::LaunchFailed { test_type, .. } | Self::Skipped { test_type, .. } => test_type,
        }
    }

    fn status(&self) -> &'static str {
        match self {
            Self::Ran(outcome) if outcome.succeeded() => "PASS",
            Self::Ran(_) | Self::LaunchFailed { .. } => "FAIL",
            Self::Skipped { .. } => "SKIP",
        }
    }

    fn failed(&self) -> bool {
        self.status() == "FAIL"
    }
}

/// Ordered record of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &RunOutcome> {
        self.entries.iter().filter_map(|entry| match entry {
            BatchEntry::Ran(outcome) => Some(outcome),
            _ => None,
        })
    }

    pub fn attempted(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| !matches!(entry, BatchEntry::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|entry| entry.failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.entries.len() - self.attempted()
    }

    /// True iff no attempted run failed. Skips do not count against the batch.
    pub fn succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// One line per entry, for the closing summary.
    pub fn summary_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| {
                let detail = match entry {
                    BatchEntry::Ran(outcome) => format!("exit code {}", outcome.exit_code),
                    BatchEntry::LaunchFailed { reason, .. } => reason.clone(),
                    BatchEntry::Skipped { plan, .. } => {
                        format!("test plan not found: {}", plan.display())
                    }
                };
                format!("  {:<10} {:<4}  {detail}", entry.test_type(), entry.status())
            })
            .collect()
    }
}

/// Drives engine invocations for one process lifetime.
pub struct Runner<'a, L, O> {
    settings: &'a Settings,
    stamp: RunStamp,
    launcher: L,
    opener: O,
}

impl<'a, L: Launcher, O: ReportOpener> Runner<'a, L, O> {
    /// `stamp` is shared by every run this runner performs.
    pub fn new(settings: &'a Settings, stamp: RunStamp, launcher: L, opener: O) -> Self {
        Self {
            settings,
            stamp,
            launcher,
            opener,
        }
    }

    pub fn stamp(&self) -> &RunStamp {
        &self.stamp
    }

    /// Executes whatever the configuration selects.
    ///
    /// Returns an error carrying the process exit status when the invocation
    /// did not succeed.
    pub fn execute(&self, config: &RunConfiguration) -> LoadrunResult<()> {
        config.validate()?;

        match config.selection {
            TestSelection::Single(descriptor) => {
                let outcome = self.run(descriptor, config)?;
                if outcome.succeeded() {
                    Ok(())
                } else {
                    Err(LoadrunError::ExternalProcess {
                        code: outcome.exit_code,
                    })
                }
            }
            TestSelection::All => {
                let report = self.run_all(config)?;
                self.print_summary(&report);
                if report.succeeded() {
                    Ok(())
                } else {
                    Err(LoadrunError::BatchFailed {
                        failed: report.failed(),
                        attempted: report.attempted(),
                    })
                }
            }
        }
    }

    /// Runs one test type.
    ///
    /// A missing plan or an unlaunchable command is an error; an engine that
    /// starts and exits non-zero is a failed [`RunOutcome`].
    pub fn run(
        &self,
        descriptor: &'static TestTypeDescriptor,
        config: &RunConfiguration,
    ) -> LoadrunResult<RunOutcome> {
        let plan = ResolvedPaths::test_plan_for(descriptor, self.settings);
        if !plan.is_file() {
            return Err(LoadrunError::missing("test plan", plan));
        }

        if config.users.is_some() && !descriptor.category.split_policy().is_supported() {
            console::warn(format!(
                "--users is not applied to {} tests; the plan's own user count is used",
                descriptor.name
            ));
        }

        let properties = ProfileResolver::new(self.settings).resolve(
            descriptor,
            &config.environment,
            config.properties.as_deref(),
        );
        let paths = ResolvedPaths::derive(
            descriptor,
            self.settings,
            &self.stamp,
            properties,
            config.generate_report,
        );
        let command = CommandBuilder::new(self.settings).build(descriptor, &paths, config)?;
        paths.prepare_output_dirs()?;

        console::info(format!(
            "Running {} test ({}) against {}",
            descriptor.name, descriptor.plan_file, config.environment
        ));
        match &paths.properties {
            Some(props) => console::info(format!("Properties: {}", props.display())),
            None => console::info("Properties: none"),
        }
        if config.distributed {
            console::info(format!("Remote hosts: {}", config.hosts.join(",")));
        }
        console::info(format!("Results: {}", paths.results.display()));
        console::info(format!("Log: {}", paths.log.display()));
        debug!(heap = %descriptor.heap, command = %command, "launching engine");

        let exit_code = self.launcher.launch(&command)?;
        info!(test_type = descriptor.name, exit_code, "engine exited");

        let outcome = RunOutcome {
            test_type: descriptor.name,
            exit_code,
            paths,
        };

        if outcome.succeeded() {
            console::success(format!("{} test completed successfully", descriptor.name));
            self.open_report(&outcome.paths);
        } else {
            console::error(format!(
                "{} test failed with exit code {exit_code}",
                descriptor.name
            ));
        }

        Ok(outcome)
    }

    /// Runs the basic batch in order, continuing past failures.
    pub fn run_all(&self, config: &RunConfiguration) -> LoadrunResult<BatchReport> {
        config.validate()?;

        let mut report = BatchReport::default();
        for descriptor in catalog::batch_sequence() {
            let plan = ResolvedPaths::test_plan_for(descriptor, self.settings);
            if !plan.is_file() {
                console::warn(format!(
                    "Skipping {} test: test plan not found: {}",
                    descriptor.name,
                    plan.display()
                ));
                report.entries.push(BatchEntry::Skipped {
                    test_type: descriptor.name,
                    plan,
                });
                continue;
            }

            let entry = match self.run(descriptor, config) {
                Ok(outcome) => BatchEntry::Ran(outcome),
                Err(err) => {
                    console::error(format!("{} test could not run: {err}", descriptor.name));
                    BatchEntry::LaunchFailed {
                        test_type: descriptor.name,
                        reason: err.to_string(),
                    }
                }
            };
            report.entries.push(entry);
        }

        Ok(report)
    }

    fn open_report(&self, paths: &ResolvedPaths) {
        let (Some(dir), Some(index)) = (&paths.report_dir, paths.report_index()) else {
            return;
        };

        console::info(format!("Report generated at {}", dir.display()));
        if let Err(err) = self.opener.open(&index) {
            console::info(format!(
                "Could not open report automatically ({err}); open {} manually",
                index.display()
            ));
        }
    }

    fn print_summary(&self, report: &BatchReport) {
        console::info(format!(
            "Batch summary ({} attempted, {} failed, {} skipped):",
            report.attempted(),
            report.failed(),
            report.skipped()
        ));
        for line in report.summary_lines() {
            println!("{line}");
        }

        if report.succeeded() {
            console::success("All attempted tests passed");
        } else {
            console::error(format!(
                "{} of {} attempted tests failed",
                report.failed(),
                report.attempted()
            ));
        }
    }
}
