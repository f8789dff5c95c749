// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! cursorauth CLI - sync a provisioned account into Cursor's local session.
//!
//! # Examples
//!
//! ```bash
//! # Activate a card and store the bearer token
//! cursorauth activate ABCD1234EFGH5678
//!
//! # Fetch an account and write it into Cursor's state database
//! cursorauth sync
//!
//! # Show the current session
//! cursorauth status --format json --pretty
//!
//! # Log Cursor out and forget the bearer token
//! cursorauth clear
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{activate, clear, paths, status, sync, token};

// ============================================================================
// CLI Definition
// ============================================================================

/// cursorauth CLI - Cursor credential sync.
#[derive(Parser)]
#[command(name = "cursorauth")]
#[command(about = "Sync provisioned accounts into Cursor's local session")]
#[command(long_about = r#"
cursorauth requests an account from the provisioning service with the
stored bearer token and writes it into Cursor's state database.

Examples:
  cursorauth activate <CARD>     # Activate a card, store the bearer token
  cursorauth activate --refresh  # Re-issue the token from the saved card
  cursorauth sync                # Fetch and commit an account (default)
  cursorauth status              # Show the current session
  cursorauth --format json sync  # JSON output
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'sync'.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Config file to use instead of the default location.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch an account and write it into Cursor (default).
    #[command(visible_alias = "s")]
    Sync,

    /// Show the current Cursor session and stored token.
    Status,

    /// Check and activate a card, storing the issued bearer token.
    Activate(activate::ActivateArgs),

    /// Remove the bearer token and all cursorAuth entries.
    Clear(clear::ClearArgs),

    /// Show or set the stored bearer token.
    Token(token::TokenArgs),

    /// Show resolved file locations.
    Paths,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// No bearer token stored.
    NoToken = 2,
    /// Provisioning service unreachable.
    Network = 3,
    /// No usable account was handed out.
    NoAccount = 4,
    /// Local file or database failure.
    Store = 5,
}

impl ExitCode {
    /// Maps a sync reason code to an exit code.
    pub fn for_reason(reason: &str) -> Self {
        match reason {
            "no_token" => Self::NoToken,
            "network_exhausted" => Self::Network,
            "no_usable_account" => Self::NoAccount,
            "file_error" | "store_error" => Self::Store,
            _ => Self::Error,
        }
    }
}

/// Error carrying an explicit exit code, already reported to the user.
#[derive(Debug)]
pub struct Reported(pub ExitCode);

impl std::fmt::Display for Reported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "exit code {}", self.0 as i32)
    }
}

impl std::error::Error for Reported {}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("cursorauth=debug,info")
    } else {
        EnvFilter::new("cursorauth=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Loads `.env` from the working directory, then from next to the binary.
fn load_dotenv() {
    let cwd = dotenvy::dotenv().ok();

    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(".env")))
        .filter(|path| path.exists())
        .and_then(|path| dotenvy::from_path(&path).ok().map(|()| path));

    debug!(?cwd, ?beside_exe, "Environment files loaded");
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);
    load_dotenv();

    let result: Result<()> = match &cli.command {
        Some(Commands::Sync) | None => sync::run(&cli).await,
        Some(Commands::Status) => status::run(&cli),
        Some(Commands::Activate(args)) => activate::run(args, &cli).await,
        Some(Commands::Clear(args)) => clear::run(args, &cli),
        Some(Commands::Token(args)) => token::run(args, &cli),
        Some(Commands::Paths) => paths::run(&cli),
    };

    let code = match result {
        Ok(()) => ExitCode::Success,
        Err(e) => match e.downcast_ref::<Reported>() {
            Some(Reported(code)) => *code,
            None => {
                if !cli.quiet {
                    eprintln!("Error: {e:#}");
                }
                ExitCode::Error
            }
        },
    };

    std::process::exit(code as i32);
}
