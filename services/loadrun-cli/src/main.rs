use std::process::ExitCode;

use loadrun_core::{
    console, LoadrunError, ProcessLauncher, RunStamp, Runner, Settings, SystemOpener,
};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::Action;

fn main() -> ExitCode {
    // Shared by every artifact this invocation writes.
    let stamp = RunStamp::now();

    init_logging();

    let config = match cli::parse_args(std::env::args_os()) {
        Ok(Action::Print(text)) => {
            print!("{text}");
            return ExitCode::SUCCESS;
        }
        Ok(Action::Run(config)) => config,
        Err(err) => {
            console::error(err.to_string());
            eprintln!("\n{}\nFor more information, try 'loadrun --help'.", cli::usage_text());
            return exit_code(err.exit_code());
        }
    };

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            let err = LoadrunError::from(err);
            console::error(err.to_string());
            return exit_code(err.exit_code());
        }
    };
    debug!(?settings, stamp = %stamp, "settings loaded");

    let runner = Runner::new(&settings, stamp, ProcessLauncher, SystemOpener);
    match runner.execute(&config) {
        Ok(()) => ExitCode::SUCCESS,
        // The runner has already reported engine and batch failures.
        Err(err @ (LoadrunError::ExternalProcess { .. } | LoadrunError::BatchFailed { .. })) => {
            exit_code(err.exit_code())
        }
        Err(err) => {
            console::error(err.to_string());
            exit_code(err.exit_code())
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

/// Initialize logging
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
