//! Argument parsing and command dispatch.

use std::path::PathBuf;

use atelier_core::StorefrontConfig;
use atelier_core::config::{DEFAULT_API_BASE_URL, DEFAULT_PURCHASES_LIMIT, DEFAULT_STORAGE_NAMESPACE};
use atelier_telemetry::{LogFormat, LoggingConfig};
use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::client::{AppContext, CliError, CliResult, build_client, parse_api_url};
use crate::commands::access::{handle_access, handle_purchases, handle_subscription};
use crate::commands::auth::{handle_login, handle_logout, handle_session_import, handle_whoami};
use crate::commands::likes::{handle_like_check, handle_like_toggle};
use crate::credentials::FileCredentialStore;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: LogFormat::parse(&cli.log_format),
        build_sha: option_env!("ATELIER_BUILD_SHA").unwrap_or("dev"),
    };
    if let Err(err) = atelier_telemetry::init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();
    tracing::debug!(command = command_name, trace_id = %trace_id, "dispatching command");

    match dispatch(cli, &trace_id).await {
        Ok(()) => 0,
        Err(err) => {
            let message = err.display_message();
            tracing::debug!(command = command_name, exit_code = err.exit_code(), "command failed");
            eprintln!("error: {message}");
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, trace_id: &str) -> CliResult<()> {
    let ctx = build_context(&cli, trace_id)?;
    let output = cli.output;

    match cli.command {
        Command::Login(args) => handle_login(&ctx, args, output).await,
        Command::Logout => handle_logout(&ctx),
        Command::Whoami => handle_whoami(&ctx, output).await,
        Command::Session(SessionCommand::Import(args)) => handle_session_import(&ctx, &args, output),
        Command::Like(LikeCommand::Toggle(args)) => handle_like_toggle(&ctx, args, output).await,
        Command::Like(LikeCommand::Check(args)) => handle_like_check(&ctx, &args, output).await,
        Command::Access(args) => handle_access(&ctx, &args, output).await,
        Command::Purchases(args) => handle_purchases(&ctx, &args, output).await,
        Command::Subscription => handle_subscription(&ctx, output).await,
    }
}

fn build_context(cli: &Cli, trace_id: &str) -> CliResult<AppContext> {
    let config = StorefrontConfig {
        api_base_url: cli.api_url.clone(),
        storage_namespace: cli.namespace.clone(),
        purchases_limit: cli.purchases_limit,
        ..StorefrontConfig::default()
    };
    config
        .validate()
        .map_err(|err| CliError::validation(err.to_string()))?;

    let credential_file = cli
        .credential_file
        .clone()
        .unwrap_or_else(|| FileCredentialStore::default_path(&config.credential_key()));

    Ok(AppContext {
        client: build_client(cli.timeout, trace_id)?,
        config,
        credential_file,
    })
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Login(_) => "login",
        Command::Logout => "logout",
        Command::Whoami => "whoami",
        Command::Session(_) => "session_import",
        Command::Like(LikeCommand::Toggle(_)) => "like_toggle",
        Command::Like(LikeCommand::Check(_)) => "like_check",
        Command::Access(_) => "access",
        Command::Purchases(_) => "purchases",
        Command::Subscription => "subscription",
    }
}

#[derive(Parser)]
#[command(name = "atelier", about = "Command-line client for the Atelier design marketplace")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "ATELIER_API_URL",
        value_parser = parse_api_url,
        default_value = DEFAULT_API_BASE_URL
    )]
    api_url: String,
    #[arg(
        long,
        global = true,
        env = "ATELIER_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
    #[arg(
        long,
        global = true,
        env = "ATELIER_CREDENTIAL_FILE",
        help = "Where the login credential is kept (defaults to ~/.atelier/)"
    )]
    credential_file: Option<PathBuf>,
    #[arg(long, global = true, env = "ATELIER_NAMESPACE", default_value = DEFAULT_STORAGE_NAMESPACE)]
    namespace: String,
    #[arg(
        long,
        global = true,
        env = "ATELIER_PURCHASES_LIMIT",
        default_value_t = DEFAULT_PURCHASES_LIMIT
    )]
    purchases_limit: u32,
    #[arg(long, global = true, env = "ATELIER_LOG", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
    #[arg(long, global = true, env = "ATELIER_LOG_FORMAT", default_value = "pretty")]
    log_format: String,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Sign in with email and password.
    Login(LoginArgs),
    /// Forget the stored credential.
    Logout,
    /// Show the signed-in user.
    Whoami,
    #[command(subcommand)]
    Session(SessionCommand),
    #[command(subcommand)]
    Like(LikeCommand),
    /// Check whether a design can be downloaded.
    Access(AccessArgs),
    /// List your purchases.
    Purchases(PurchasesArgs),
    /// Show your subscription status.
    Subscription,
}

#[derive(Subcommand)]
pub(crate) enum SessionCommand {
    /// Sync a provider session document into the credential store.
    Import(SessionImportArgs),
}

#[derive(Subcommand)]
pub(crate) enum LikeCommand {
    /// Like or unlike a design.
    Toggle(LikeToggleArgs),
    /// Show whether you like a design.
    Check(LikeCheckArgs),
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long, env = "ATELIER_EMAIL")]
    pub(crate) email: String,
    #[arg(long, env = "ATELIER_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct SessionImportArgs {
    #[arg(help = "Path to a session JSON document (`-` for stdin)")]
    pub(crate) file: PathBuf,
}

#[derive(Args)]
pub(crate) struct LikeToggleArgs {
    #[arg(help = "Design identifier")]
    pub(crate) design: String,
    #[arg(long, default_value_t = 0, help = "Like count currently displayed for the design")]
    pub(crate) count: u64,
}

#[derive(Args)]
pub(crate) struct LikeCheckArgs {
    #[arg(help = "Design identifier")]
    pub(crate) design: String,
}

#[derive(Args)]
pub(crate) struct AccessArgs {
    #[arg(help = "Design identifier")]
    pub(crate) design: String,
}

#[derive(Args, Default)]
pub(crate) struct PurchasesArgs {
    #[arg(long)]
    pub(crate) limit: Option<u32>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_like_toggle_with_globals() {
        let cli = Cli::try_parse_from([
            "atelier",
            "like",
            "toggle",
            "design-1",
            "--count",
            "7",
            "--output",
            "json",
            "--api-url",
            "https://shop.example/api/",
        ]);
        let Ok(cli) = cli else {
            panic!("arguments should parse");
        };
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.api_url, "https://shop.example/api");
        assert_eq!(command_label(&cli.command), "like_toggle");
        match cli.command {
            Command::Like(LikeCommand::Toggle(args)) => {
                assert_eq!(args.design, "design-1");
                assert_eq!(args.count, 7);
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn invalid_namespace_is_a_validation_error() {
        let cli = Cli::try_parse_from(["atelier", "--namespace", "has space", "whoami"]);
        let Ok(cli) = cli else {
            panic!("arguments should parse");
        };
        let err = build_context(&cli, "trace").err();
        assert!(matches!(err, Some(CliError::Validation(_))));
    }
}
