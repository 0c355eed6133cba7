//! Runner tests against a recording launcher.
//!
//! No test here spawns the real engine; the fake launcher records every
//! command and answers with scripted exit codes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use loadrun_core::catalog::{self, TestSelection};
use loadrun_core::{
    BatchEntry, CommandLine, EngineArg, Launcher, LoadrunError, LoadrunResult, ReportOpener,
    RunConfiguration, RunStamp, Runner, Settings,
};
use tempfile::TempDir;

/// Records commands; exits with the scripted code for a plan, else 0.
#[derive(Default)]
struct RecordingLauncher {
    exit_codes: HashMap<&'static str, i32>,
    launched: RefCell<Vec<CommandLine>>,
}

impl RecordingLauncher {
    fn failing(plan_file: &'static str, code: i32) -> Self {
        Self {
            exit_codes: HashMap::from([(plan_file, code)]),
            ..Self::default()
        }
    }

    fn launched_plans(&self) -> Vec<String> {
        self.launched
            .borrow()
            .iter()
            .map(|command| plan_of(command).file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }
}

fn plan_of(command: &CommandLine) -> PathBuf {
    command
        .engine_args()
        .iter()
        .find_map(|arg| match arg {
            EngineArg::TestPlan(path) => Some(path.clone()),
            _ => None,
        })
        .expect("command has a test plan")
}

fn results_of(command: &CommandLine) -> PathBuf {
    command
        .engine_args()
        .iter()
        .find_map(|arg| match arg {
            EngineArg::Results(path) => Some(path.clone()),
            _ => None,
        })
        .expect("command has a results path")
}

impl Launcher for RecordingLauncher {
    fn launch(&self, command: &CommandLine) -> LoadrunResult<i32> {
        let plan = plan_of(command);
        let name = plan.file_name().unwrap().to_string_lossy();
        let code = self.exit_codes.get(&*name).copied().unwrap_or(0);
        self.launched.borrow_mut().push(command.clone());
        Ok(code)
    }
}

#[derive(Default)]
struct RecordingOpener {
    fail: bool,
    opened: RefCell<Vec<PathBuf>>,
}

impl ReportOpener for RecordingOpener {
    fn open(&self, index: &Path) -> io::Result<()> {
        self.opened.borrow_mut().push(index.to_path_buf());
        if self.fail {
            Err(io::Error::new(io::ErrorKind::NotFound, "no opener"))
        } else {
            Ok(())
        }
    }
}

struct Workspace {
    root: TempDir,
    settings: Settings,
}

impl Workspace {
    /// Creates plan files for the given test types.
    fn with_plans(types: &[&str]) -> Self {
        let root = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.test_plans_dir = root.path().join("test-plans");
        settings.paths.config_dir = root.path().join("config");
        settings.paths.results_dir = root.path().join("results");
        settings.paths.logs_dir = root.path().join("logs");
        settings.paths.reports_dir = root.path().join("reports");

        fs::create_dir_all(&settings.paths.test_plans_dir).unwrap();
        fs::create_dir_all(&settings.paths.config_dir).unwrap();
        for name in types {
            let descriptor = catalog::resolve(name).unwrap();
            fs::write(
                settings.paths.test_plans_dir.join(descriptor.plan_file),
                "<jmeterTestPlan/>",
            )
            .unwrap();
        }

        Self { root, settings }
    }

    fn config(&self, token: &str) -> RunConfiguration {
        RunConfiguration::new(catalog::select(token).unwrap())
    }
}

fn stamp() -> RunStamp {
    RunStamp::from_datetime(
        NaiveDate::from_ymd_opt(2026, 5, 20)
            .unwrap()
            .and_hms_opt(22, 15, 9)
            .unwrap(),
    )
}

#[test]
fn test_single_run_success() {
    let ws = Workspace::with_plans(&["load"]);
    let launcher = RecordingLauncher::default();
    let runner = Runner::new(&ws.settings, stamp(), &launcher, RecordingOpener::default());

    runner.execute(&ws.config("load")).unwrap();

    assert_eq!(launcher.launched_plans(), vec!["Load_Test.jmx"]);
    let launched = launcher.launched.borrow();
    assert_eq!(
        results_of(&launched[0]),
        ws.settings.paths.results_dir.join("load_test-20260520-221509.jtl")
    );
    assert!(ws.settings.paths.results_dir.is_dir());
    assert!(ws.settings.paths.logs_dir.is_dir());
}

#[test]
fn test_single_run_failure_propagates_exit_code() {
    let ws = Workspace::with_plans(&["spike"]);
    let launcher = RecordingLauncher::failing("Spike_Test.jmx", 4);
    let runner = Runner::new(&ws.settings, stamp(), &launcher, RecordingOpener::default());

    let err = runner.execute(&ws.config("spike")).unwrap_err();
    assert!(matches!(err, LoadrunError::ExternalProcess { code: 4 }));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn test_single_run_missing_plan() {
    let ws = Workspace::with_plans(&[]);
    let launcher = RecordingLauncher::default();
    let runner = Runner::new(&ws.settings, stamp(), &launcher, RecordingOpener::default());

    let err = runner.execute(&ws.config("soak")).unwrap_err();
    assert!(matches!(err, LoadrunError::MissingResource { what: "test plan", .. }));
    assert_eq!(err.exit_code(), 1);
    assert!(launcher.launched.borrow().is_empty());
}

#[test]
fn test_distributed_without_hosts_launches_nothing() {
    let ws = Workspace::with_plans(&["load", "stress", "spike", "soak", "stability"]);
    let launcher = RecordingLauncher::default();
    let runner = Runner::new(&ws.settings, stamp(), &launcher, RecordingOpener::default());

    for token in ["load", "all"] {
        let mut config = ws.config(token);
        config.distributed = true;
        let err = runner.execute(&config).unwrap_err();
        assert!(matches!(err, LoadrunError::Configuration(_)), "{token}");
    }

    assert!(launcher.launched.borrow().is_empty());
    assert!(!ws.settings.paths.results_dir.exists());
}

#[test]
fn test_distributed_hosts_reach_engine() {
    let ws = Workspace::with_plans(&["enterprise"]);
    let launcher = RecordingLauncher::default();
    let runner = Runner::new(&ws.settings, stamp(), &launcher, RecordingOpener::default());

    let mut config = ws.config("enterprise-backend");
    config.distributed = true;
    config.hosts = vec!["worker-a".into(), "worker-b".into()];
    runner.execute(&config).unwrap();

    let launched = launcher.launched.borrow();
    assert!(launched[0]
        .engine_args()
        .contains(&EngineArg::RemoteHosts(vec!["worker-a".into(), "worker-b".into()])));
}

#[test]
fn test_batch_runs_in_order_with_shared_stamp() {
    let ws = Workspace::with_plans(&["load", "stress", "spike", "soak", "stability"]);
    let launcher = RecordingLauncher::default();
    let runner = Runner::new(&ws.settings, stamp(), &launcher, RecordingOpener::default());

    let report = runner.run_all(&ws.config("all")).unwrap();

    assert!(report.succeeded());
    assert_eq!(report.attempted(), 5);
    assert_eq!(
        launcher.launched_plans(),
        vec![
            "Load_Test.jmx",
            "Stress_Test.jmx",
            "Spike_Test.jmx",
            "Soak_Test.jmx",
            "Stability_Test.jmx"
        ]
    );

    let results: Vec<PathBuf> = launcher.launched.borrow().iter().map(results_of).collect();
    let mut unique = results.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 5);
    for path in &results {
        assert!(path.to_string_lossy().contains(runner.stamp().as_str()));
    }
}

#[test]
fn test_batch_skips_missing_plan_without_failing() {
    let ws = Workspace::with_plans(&["load", "stress", "soak", "stability"]);
    let launcher = RecordingLauncher::default();
    let runner = Runner::new(&ws.settings, stamp(), &launcher, RecordingOpener::default());

    let config = ws.config("all");
    let report = runner.run_all(&config).unwrap();

    assert_eq!(launcher.launched.borrow().len(), 4);
    assert_eq!(report.attempted(), 4);
    assert_eq!(report.skipped(), 1);
    assert!(matches!(
        &report.entries()[2],
        BatchEntry::Skipped { test_type: "spike", .. }
    ));
    assert!(report.succeeded());
    assert!(runner.execute(&config).is_ok());
}

#[test]
fn test_batch_continues_after_failure() {
    let ws = Workspace::with_plans(&["load", "stress", "spike", "soak", "stability"]);
    let launcher = RecordingLauncher::failing("Stress_Test.jmx", 2);
    let runner = Runner::new(&ws.settings, stamp(), &launcher, RecordingOpener::default());

    let err = runner.execute(&ws.config("all")).unwrap_err();

    assert_eq!(launcher.launched.borrow().len(), 5);
    assert!(matches!(
        err,
        LoadrunError::BatchFailed {
            failed: 1,
            attempted: 5
        }
    ));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_batch_with_skip_and_failure() {
    let ws = Workspace::with_plans(&["load", "stress", "spike", "stability"]);
    let launcher = RecordingLauncher::failing("Load_Test.jmx", 1);
    let runner = Runner::new(&ws.settings, stamp(), &launcher, RecordingOpener::default());

    let report = runner.run_all(&ws.config("all")).unwrap();

    assert!(!report.succeeded());
    assert_eq!(report.failed(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.outcomes().filter(|o| o.succeeded()).count(), 3);

    let summary = report.summary_lines();
    assert_eq!(summary.len(), 5);
    assert!(summary[0].contains("load") && summary[0].contains("FAIL"));
    assert!(summary[3].contains("soak") && summary[3].contains("SKIP"));
}

#[test]
fn test_report_opened_only_on_success() {
    let ws = Workspace::with_plans(&["load", "stress"]);
    let launcher = RecordingLauncher::failing("Stress_Test.jmx", 1);
    let opener = RecordingOpener::default();
    let runner = Runner::new(&ws.settings, stamp(), &launcher, &opener);

    let mut config = ws.config("load");
    config.generate_report = true;
    runner.execute(&config).unwrap();

    let mut config = ws.config("stress");
    config.generate_report = true;
    assert!(runner.execute(&config).is_err());

    assert_eq!(
        *opener.opened.borrow(),
        vec![ws
            .settings
            .paths
            .reports_dir
            .join("load_test-20260520-221509")
            .join("index.html")]
    );
}

#[test]
fn test_report_opener_failure_is_not_fatal() {
    let ws = Workspace::with_plans(&["ui"]);
    let launcher = RecordingLauncher::default();
    let opener = RecordingOpener {
        fail: true,
        ..RecordingOpener::default()
    };
    let runner = Runner::new(&ws.settings, stamp(), &launcher, &opener);

    let mut config = ws.config("ui");
    config.generate_report = true;
    assert!(runner.execute(&config).is_ok());
    assert_eq!(opener.opened.borrow().len(), 1);
}

#[test]
fn test_no_report_open_without_report_flag() {
    let ws = Workspace::with_plans(&["load"]);
    let opener = RecordingOpener::default();
    let runner = Runner::new(&ws.settings, stamp(), RecordingLauncher::default(), &opener);

    runner.execute(&ws.config("load")).unwrap();
    assert!(opener.opened.borrow().is_empty());
}

#[test]
fn test_properties_and_overrides_reach_engine() {
    let ws = Workspace::with_plans(&["ui"]);
    fs::write(ws.settings.paths.config_dir.join("ui-staging.properties"), "").unwrap();
    let launcher = RecordingLauncher::default();
    let runner = Runner::new(&ws.settings, stamp(), &launcher, RecordingOpener::default());

    let mut config = ws.config("enterprise-ui");
    config.environment = "staging".into();
    config.users = NonZeroU32::new(300);
    config.duration_secs = NonZeroU32::new(900);
    runner.execute(&config).unwrap();

    let launched = launcher.launched.borrow();
    let command = &launched[0];
    assert!(command.engine_args().contains(&EngineArg::Properties(
        ws.settings.paths.config_dir.join("ui-staging.properties")
    )));
    assert_eq!(command.parameter("homepage_users"), Some("99"));
    assert_eq!(command.parameter("shopping_users"), Some("150"));
    assert_eq!(command.parameter("checkout_users"), Some("51"));
    assert_eq!(command.parameter("duration"), Some("900"));
    assert_eq!(command.env()[0].0, "HEAP");
}

#[test]
fn test_explicit_properties_override() {
    let ws = Workspace::with_plans(&["stability"]);
    fs::write(ws.settings.paths.config_dir.join("credentials.properties"), "").unwrap();
    let custom = ws.root.path().join("custom.properties");
    fs::write(&custom, "").unwrap();
    let launcher = RecordingLauncher::default();
    let runner = Runner::new(&ws.settings, stamp(), &launcher, RecordingOpener::default());

    let mut config = ws.config("stability");
    config.properties = Some(custom.clone());
    runner.execute(&config).unwrap();

    assert!(launcher.launched.borrow()[0]
        .engine_args()
        .contains(&EngineArg::Properties(custom)));
}

#[test]
fn test_all_selection_is_batch() {
    assert_eq!(catalog::select("all").unwrap(), TestSelection::All);
}
