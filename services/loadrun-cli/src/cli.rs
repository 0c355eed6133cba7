use std::ffi::OsString;
use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};
use loadrun_core::catalog::{self, ALL_TOKEN, BATCH_SEQUENCE};
use loadrun_core::run_config::{parse_host_list, KNOWN_ENVIRONMENTS};
use loadrun_core::{LoadrunError, LoadrunResult, RunConfiguration};

/// Test-type tokens that print usage and exit successfully.
const HELP_TOKENS: [&str; 3] = ["--help", "-h", "help"];

/// Argument position of the environment: directly after the test type.
const ENVIRONMENT_INDEX: usize = 2;

#[derive(Parser, Debug)]
#[command(name = "loadrun")]
#[command(about = "Run Apache JMeter load tests by test type", long_about = None)]
#[command(version)]
#[command(after_help = catalog_help())]
struct Cli {
    /// Test type to run, or `all` for the basic sequence
    #[arg(value_name = "TEST_TYPE")]
    test_type: Option<String>,

    /// Target environment
    #[arg(value_name = "ENVIRONMENT")]
    environment: Option<String>,

    /// Generate the HTML dashboard report after the run
    #[arg(short = 'r', long)]
    report: bool,

    /// Drive remote workers listed in --hosts
    #[arg(short = 'd', long)]
    distributed: bool,

    /// Comma-separated remote worker hosts
    #[arg(long, value_name = "CSV")]
    hosts: Option<String>,

    /// Total user count, split across phases where the plan supports it
    #[arg(long, value_name = "N")]
    users: Option<NonZeroU32>,

    /// Run length in seconds
    #[arg(long, value_name = "SECONDS")]
    duration: Option<NonZeroU32>,

    /// Properties file to use instead of the environment default
    #[arg(long, value_name = "PATH")]
    props: Option<PathBuf>,

    /// Target environment (overrides the positional ENVIRONMENT)
    #[arg(long = "env", value_name = "NAME")]
    env: Option<String>,
}

fn catalog_help() -> String {
    let mut help = String::from("Test types:\n");
    for descriptor in catalog::descriptors() {
        let name = match descriptor.aliases {
            [] => descriptor.name.to_string(),
            aliases => format!("{} ({})", descriptor.name, aliases.join(", ")),
        };
        help.push_str(&format!(
            "  {name:<32} {} users, {}s, {} heap\n",
            descriptor.default_users, descriptor.default_duration_secs, descriptor.heap
        ));
    }
    help.push_str(&format!(
        "  {ALL_TOKEN:<32} {} in sequence\n\nEnvironments: {} (default: production)\n\n",
        BATCH_SEQUENCE.join(", "),
        KNOWN_ENVIRONMENTS.join(", ")
    ));
    help.push_str(
        "Examples:\n  \
         loadrun load dev\n  \
         loadrun stress staging --report\n  \
         loadrun enterprise --users 500 --duration 900\n  \
         loadrun all production -r\n  \
         loadrun load --distributed --hosts 10.0.0.11,10.0.0.12\n",
    );
    help
}

/// What the command line asks for.
#[derive(Debug)]
pub enum Action {
    /// Print text to stdout and exit successfully (help, version).
    Print(String),
    Run(RunConfiguration),
}

/// Full help text.
pub fn help_text() -> String {
    Cli::command().render_help().to_string()
}

/// One-line usage synopsis.
pub fn usage_text() -> String {
    Cli::command().render_usage().to_string()
}

/// Parses the raw argument vector, program name first.
pub fn parse_args<I, T>(args: I) -> LoadrunResult<Action>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    if let Some(first) = args.get(1).and_then(|arg| arg.to_str()) {
        if HELP_TOKENS.contains(&first) {
            return Ok(Action::Print(help_text()));
        }
    }

    let matches = match Cli::command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(Action::Print(err.to_string()));
        }
        Err(err) => return Err(LoadrunError::usage(clap_message(&err))),
    };

    // Only the token right after the test type may name the environment;
    // anything later must be a flag.
    if let Some(index) = matches.index_of("environment") {
        if index != ENVIRONMENT_INDEX {
            let value = matches
                .get_one::<String>("environment")
                .map(String::as_str)
                .unwrap_or_default();
            return Err(LoadrunError::usage(format!(
                "unexpected argument '{value}'; the environment must directly follow the test type"
            )));
        }
    }

    let cli = Cli::from_arg_matches(&matches)
        .map_err(|err| LoadrunError::usage(clap_message(&err)))?;
    cli.into_config().map(Action::Run)
}

/// First line of a clap error without its `error:` prefix.
fn clap_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let line = rendered.lines().next().unwrap_or_default();
    line.trim_start_matches("error:").trim().to_string()
}

impl Cli {
    fn into_config(self) -> LoadrunResult<RunConfiguration> {
        let token = self
            .test_type
            .ok_or_else(|| LoadrunError::usage("missing test type"))?;
        let mut config = RunConfiguration::new(catalog::select(&token)?);

        // --env is applied last so it always wins over the positional.
        if let Some(environment) = self.environment.into_iter().chain(self.env).last() {
            config.environment = environment;
        }

        config.generate_report = self.report;
        config.distributed = self.distributed;
        config.hosts = self
            .hosts
            .as_deref()
            .map(parse_host_list)
            .unwrap_or_default();
        config.users = self.users;
        config.duration_secs = self.duration;
        config.properties = self.props;

        Ok(config)
    }
}
