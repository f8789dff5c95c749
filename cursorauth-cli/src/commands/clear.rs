//! Clear command - log Cursor out and forget the bearer token and card.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::{card_store, credential_store, load_config, token_store};
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the clear command.
#[derive(Args)]
pub struct ClearArgs {
    /// Keep the bearer token and saved card; only clear Cursor's session.
    #[arg(long)]
    pub keep_token: bool,
}

/// Runs the clear command.
pub fn run(args: &ClearArgs, cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    let removed_rows = credential_store(&config)?.clear_auth_namespace()?;
    let (removed_token, removed_card) = if args.keep_token {
        (false, false)
    } else {
        (token_store(&config)?.clear()?, card_store(&config)?.clear()?)
    };

    info!(removed_rows, removed_token, removed_card, "Cleared");

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                println!("Removed {removed_rows} cursorAuth entries");
                if removed_token {
                    println!("Removed bearer token");
                }
                if removed_card {
                    println!("Removed saved card");
                }
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = serde_json::json!({
                "removed_entries": removed_rows,
                "removed_token": removed_token,
                "removed_card": removed_card,
            });
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}
