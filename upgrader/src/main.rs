//! Rancher Upgrader - Entry Point
//!
//! Upgrade, finish upgrades and roll back services through the orchestration
//! API. Exits with 0 when every target succeeded and 1 otherwise.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, CommandFactory, Parser, Subcommand};
use colored::Colorize;
use tracing::{error, info};

use rancher_upgrader::app::options::RunOptions;
use rancher_upgrader::app::run::{run, summary_lines};
use rancher_upgrader::errors::UpgradeError;
use rancher_upgrader::filesys::file::File;
use rancher_upgrader::logs::{init_logging, LogLevel, LogOptions};
use rancher_upgrader::models::request::DeploymentRequest;
use rancher_upgrader::storage::settings::Settings;
use rancher_upgrader::utils::version_info;

#[derive(Parser)]
#[command(
    name = "rancher-upgrader",
    about = "Rancher Upgrader - Upgrade, rollback and finish upgrades.",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute operation
    Execute(ExecuteArgs),
    /// Print build information as JSON
    Version,
}

#[derive(Args)]
struct ExecuteArgs {
    /// Action like 'upgrade' 'finishupgrade' 'rollback'
    action: String,

    /// API url for rancher service. Separate several services with '|'
    #[arg(short = 'r', long)]
    url: Option<String>,

    /// User for authentication with rancher API
    #[arg(short = 'u', long)]
    user: Option<String>,

    /// Pass for authentication with rancher API
    #[arg(short = 'p', long)]
    pass: Option<String>,

    /// New image
    #[arg(short = 'i', long)]
    image: Option<String>,

    /// New image tag
    #[arg(short = 't', long)]
    tag: Option<String>,

    /// Force finish if upgraded
    #[arg(short = 'f', long)]
    force: bool,

    /// Update environment variables
    #[arg(short = 'k', long = "update-env")]
    update_env: bool,

    /// Wait complete
    #[arg(short = 'w', long)]
    wait: bool,

    /// Setup env var (KEY=VALUE), repeatable
    #[arg(short = 'e', long = "env")]
    envs: Vec<String>,

    /// Maximum minutes to wait for the target state
    #[arg(short = 'm', long)]
    max_wait_minutes: Option<u64>,

    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        None => {
            if let Err(e) = Cli::command().print_help() {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Some(Commands::Version) => match serde_json::to_string_pretty(&version_info()) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        },
        Some(Commands::Execute(args)) => execute(args).await,
    }
}

async fn execute(args: ExecuteArgs) -> ExitCode {
    println!("{}", "##############################".cyan());
    println!("{}", "#      RANCHER UPGRADER!     #".cyan());
    println!("{}", "##############################".cyan());

    let settings_file = args.settings.as_ref().map(File::new);
    let settings = match Settings::load(settings_file.as_ref()).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!(" - Unable to read settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_options = LogOptions {
        log_level: args.log_level.unwrap_or(settings.log_level),
        json_format: args.json_logs || settings.json_logs,
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let request = match build_request(&args, &settings) {
        Ok(request) => request,
        Err(e) => {
            error!(" - {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = RunOptions::from(&settings);
    info!("Running with options: {:?}", options);

    match run(&request, options).await {
        Ok(report) => {
            for line in summary_lines(&report) {
                println!("{line}");
            }
            ExitCode::from(report.exit_code())
        }
        Err(e) => {
            error!("Ooops! {}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_request(args: &ExecuteArgs, settings: &Settings) -> Result<DeploymentRequest, UpgradeError> {
    DeploymentRequest::builder(args.url.clone().unwrap_or_default(), args.action.clone())
        .user(args.user.clone())
        .password(args.pass.clone())
        .image(args.image.clone())
        .tag(args.tag.clone())
        .update_environment(args.update_env)
        .environment(args.envs.iter().cloned())
        .force_finish(args.force)
        .wait(args.wait)
        .max_wait_minutes(args.max_wait_minutes.unwrap_or(settings.max_wait_minutes))
        .build()
}
