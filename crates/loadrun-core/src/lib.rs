//! Orchestration core for driving Apache JMeter test runs.
//!
//! A run flows one way: a [`RunConfiguration`] selects a catalog entry, the
//! [`ProfileResolver`] picks a properties file, [`ResolvedPaths`] stamps the
//! outputs, the [`CommandBuilder`] assembles the engine invocation and the
//! [`Runner`] launches it and aggregates exit codes.

pub mod catalog;
pub mod command;
pub mod console;
pub mod error;
pub mod launcher;
pub mod paths;
pub mod profile;
pub mod run_config;
pub mod runner;
pub mod settings;
pub mod split;
pub mod stamp;

pub use catalog::{HeapProfile, TestCategory, TestSelection, TestTypeDescriptor};
pub use command::{CommandBuilder, CommandLine, EngineArg};
pub use error::{LoadrunError, LoadrunResult};
pub use launcher::{Launcher, ProcessLauncher, ReportOpener, SystemOpener};
pub use paths::ResolvedPaths;
pub use profile::ProfileResolver;
pub use run_config::{RunConfiguration, DEFAULT_ENVIRONMENT};
pub use runner::{BatchEntry, BatchReport, RunOutcome, Runner};
pub use settings::Settings;
pub use split::{PhaseShare, PhaseUsers, SplitPolicy};
pub use stamp::RunStamp;
