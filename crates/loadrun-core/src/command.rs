//! Engine command assembly.
//!
//! Arguments are accumulated as typed values and only flattened into an
//! argument vector when the process is spawned, so paths and host lists never
//! pass through shell quoting.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

use crate::catalog::TestTypeDescriptor;
use crate::error::{LoadrunError, LoadrunResult};
use crate::paths::ResolvedPaths;
use crate::run_config::RunConfiguration;
use crate::settings::Settings;

/// Engine parameter carrying the duration override.
pub const DURATION_PARAMETER: &str = "duration";

/// One logical engine argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineArg {
    /// `-n`
    NonGui,
    /// `-t <plan>`
    TestPlan(PathBuf),
    /// `-q <file>`
    Properties(PathBuf),
    /// `-l <file>`
    Results(PathBuf),
    /// `-j <file>`
    Log(PathBuf),
    /// `-e -o <dir>`
    Report(PathBuf),
    /// `-R <host,host>`
    RemoteHosts(Vec<String>),
    /// `-J<name>=<value>`
    Parameter { name: &'static str, value: String },
}

impl EngineArg {
    fn push_to(&self, out: &mut Vec<OsString>) {
        match self {
            Self::NonGui => out.push("-n".into()),
            Self::TestPlan(path) => push_flag(out, "-t", path.as_os_str()),
            Self::Properties(path) => push_flag(out, "-q", path.as_os_str()),
            Self::Results(path) => push_flag(out, "-l", path.as_os_str()),
            Self::Log(path) => push_flag(out, "-j", path.as_os_str()),
            Self::Report(dir) => {
                out.push("-e".into());
                push_flag(out, "-o", dir.as_os_str());
            }
            Self::RemoteHosts(hosts) => push_flag(out, "-R", OsStr::new(&hosts.join(","))),
            Self::Parameter { name, value } => out.push(format!("-J{name}={value}").into()),
        }
    }
}

fn push_flag(out: &mut Vec<OsString>, flag: &str, value: &OsStr) {
    out.push(flag.into());
    out.push(value.to_os_string());
}

/// A fully assembled engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: OsString,
    args: Vec<EngineArg>,
    env: Vec<(String, String)>,
}

impl CommandLine {
    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn engine_args(&self) -> &[EngineArg] {
        &self.args
    }

    /// Environment variables set for the child process only.
    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }

    /// Flattens the typed arguments into the process argument vector.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut out = Vec::with_capacity(self.args.len() * 2);
        for arg in &self.args {
            arg.push_to(&mut out);
        }
        out
    }

    /// Value of a `-J` parameter, if present.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.args.iter().find_map(|arg| match arg {
            EngineArg::Parameter { name: n, value } if *n == name => Some(value.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={} ", shell_quote(value))?;
        }
        write!(f, "{}", shell_quote(&self.program.to_string_lossy()))?;
        for arg in self.to_args() {
            write!(f, " {}", shell_quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn shell_quote(raw: &str) -> String {
    if !raw.is_empty() && !raw.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        return raw.to_string();
    }
    format!("'{}'", raw.replace('\'', r"'\''"))
}

/// Assembles engine invocations from resolved inputs.
#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder<'a> {
    settings: &'a Settings,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    pub fn build(
        &self,
        descriptor: &TestTypeDescriptor,
        paths: &ResolvedPaths,
        config: &RunConfiguration,
    ) -> LoadrunResult<CommandLine> {
        if config.distributed && config.hosts.is_empty() {
            return Err(LoadrunError::configuration(
                "distributed mode requires --hosts with at least one host",
            ));
        }

        let mut args = vec![
            EngineArg::NonGui,
            EngineArg::TestPlan(paths.test_plan.clone()),
        ];
        if let Some(properties) = &paths.properties {
            args.push(EngineArg::Properties(properties.clone()));
        }
        args.push(EngineArg::Results(paths.results.clone()));
        args.push(EngineArg::Log(paths.log.clone()));

        if let Some(users) = config.users {
            let phases = descriptor
                .category
                .split_policy()
                .apply(users.get())
                .unwrap_or_default();
            args.extend(phases.into_iter().map(|phase| EngineArg::Parameter {
                name: phase.parameter,
                value: phase.users.to_string(),
            }));
        }

        if let Some(duration) = config.duration_secs {
            args.push(EngineArg::Parameter {
                name: DURATION_PARAMETER,
                value: duration.to_string(),
            });
        }

        if config.generate_report {
            if let Some(dir) = &paths.report_dir {
                args.push(EngineArg::Report(dir.clone()));
            }
        }

        if config.distributed {
            args.push(EngineArg::RemoteHosts(config.hosts.clone()));
        }

        let heap = self.settings.heap.args_for(descriptor.heap);
        Ok(CommandLine {
            program: OsString::from(&self.settings.engine.binary),
            args,
            env: vec![(self.settings.engine.heap_env_var.clone(), heap.to_string())],
        })
    }
}
