//! Token command - show or set the stored bearer token.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use cursorauth_core::BearerToken;

use super::{load_config, token_store};
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the token command.
#[derive(Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub action: TokenAction,
}

/// Token subcommands.
#[derive(Subcommand)]
pub enum TokenAction {
    /// Show the stored token (masked).
    Show {
        /// Print the full token.
        #[arg(long)]
        reveal: bool,
    },

    /// Store a token, replacing the current one.
    Set {
        /// Bearer token issued by card activation.
        token: String,
    },
}

/// Runs the token command.
pub fn run(args: &TokenArgs, cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let store = token_store(&config)?;

    match &args.action {
        TokenAction::Show { reveal } => {
            let Some(token) = store.get()? else {
                bail!("No bearer token stored at {}", store.path().display());
            };
            let shown = if *reveal {
                token.as_str().to_string()
            } else {
                token.masked()
            };

            match cli.format {
                OutputFormat::Text => println!("{shown}"),
                OutputFormat::Json => {
                    let formatter = JsonFormatter::new(cli.pretty);
                    let output = serde_json::json!({
                        "token": shown,
                        "path": store.path().display().to_string(),
                    });
                    println!("{}", formatter.format(&output)?);
                }
            }
        }
        TokenAction::Set { token } => {
            let token = BearerToken::new(token.as_str())?;
            store.save(token.as_str())?;
            if !cli.quiet {
                println!("Token saved to {}", store.path().display());
            }
        }
    }

    Ok(())
}
