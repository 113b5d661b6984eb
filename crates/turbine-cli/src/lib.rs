//! Command line entry point for Turbine data apps.
//!
//! A data-app binary registers its app once and hands control over:
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     turbine_cli::start(Anonymize)
//! }
//! ```

mod commands;
pub mod logging;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use turbine_sdk::App;

#[derive(Parser)]
#[command(name = "turbine", version, about = "Run a Turbine data app locally")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the app once against the resources in app.json (default)
    Run(RunArgs),
    /// Validate app.json, fixture files and declared secrets
    Check(CheckArgs),
}

#[derive(Args, Default)]
pub(crate) struct AppArgs {
    /// Directory containing app.json (default: current directory)
    #[arg(long, env = "TURBINE_APP_DIR")]
    pub(crate) app_dir: Option<PathBuf>,
    /// Override the app name from app.json
    #[arg(long)]
    pub(crate) app_name: Option<String>,
    /// Secret value as NAME=VALUE; takes precedence over the environment
    #[arg(long = "secret", value_name = "NAME=VALUE")]
    pub(crate) secrets: Vec<String>,
}

impl AppArgs {
    pub(crate) fn dir(&self) -> PathBuf {
        self.app_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Args, Default)]
pub(crate) struct RunArgs {
    #[command(flatten)]
    pub(crate) app: AppArgs,
    /// Cancel in-flight resource calls after this many seconds
    #[arg(long)]
    pub(crate) timeout_secs: Option<u64>,
    /// Upper bound on each individual resource call, in seconds
    #[arg(long)]
    pub(crate) io_timeout_secs: Option<u64>,
    /// Summary format
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub(crate) output: OutputFormat,
    /// Exit with an error if any record failed to write
    #[arg(long)]
    pub(crate) fail_on_partial: bool,
}

#[derive(Args, Default)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub(crate) app: AppArgs,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

/// Parse the process arguments and run `app`.
///
/// # Errors
///
/// Returns an error if the app config is invalid, the app fails, or
/// `--fail-on-partial` is set and a write was incomplete.
pub fn start<A: App + 'static>(app: A) -> anyhow::Result<()> {
    start_from(app, std::env::args_os())
}

/// Like [`start`] with explicit arguments (the first one is the binary name).
///
/// # Errors
///
/// See [`start`].
pub fn start_from<A, I, T>(app: A, args: I) -> anyhow::Result<()>
where
    A: App + 'static,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| e.exit());

    logging::init(&cli.log_level);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        match cli.command {
            None => commands::run::execute(app, RunArgs::default()).await,
            Some(Commands::Run(args)) => commands::run::execute(app, args).await,
            Some(Commands::Check(args)) => commands::check::execute(&app, &args).await,
        }
    })
}
