//! Process seams: the engine launcher and the report opener.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::command::CommandLine;
use crate::error::{LoadrunError, LoadrunResult};

/// Runs an engine command to completion.
pub trait Launcher {
    /// Blocks until the child exits and returns its exit code.
    fn launch(&self, command: &CommandLine) -> LoadrunResult<i32>;
}

impl<T: Launcher + ?Sized> Launcher for &T {
    fn launch(&self, command: &CommandLine) -> LoadrunResult<i32> {
        (**self).launch(command)
    }
}

/// Opens a generated report for viewing.
pub trait ReportOpener {
    fn open(&self, index: &Path) -> io::Result<()>;
}

impl<T: ReportOpener + ?Sized> ReportOpener for &T {
    fn open(&self, index: &Path) -> io::Result<()> {
        (**self).open(index)
    }
}

/// Spawns the engine as a child process sharing this process's stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, command: &CommandLine) -> LoadrunResult<i32> {
        debug!(command = %command, "spawning engine");

        let status = Command::new(command.program())
            .args(command.to_args())
            .envs(command.env().iter().map(|(key, value)| (key, value)))
            .status()
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => {
                    LoadrunError::missing("load-test engine", PathBuf::from(command.program()))
                }
                _ => LoadrunError::Io(err),
            })?;

        // Killed by a signal: no code to propagate.
        Ok(status.code().unwrap_or(1))
    }
}

/// Opens files with the platform's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl SystemOpener {
    fn command(index: &Path) -> Command {
        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(index);
            cmd
        } else if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]).arg(index);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(index);
            cmd
        }
    }
}

impl ReportOpener for SystemOpener {
    fn open(&self, index: &Path) -> io::Result<()> {
        let status = Self::command(index)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("opener exited with {status}"),
            ))
        }
    }
}
