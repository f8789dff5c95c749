//! Sync command - fetch an account and commit it into Cursor.

use anyhow::Result;
use cursorauth_fetch::ProvisioningClient;
use cursorauth_sync::{SyncOptions, SyncOrchestrator};

use super::{credential_store, load_config, service_http, token_store};
use crate::output::{JsonFormatter, SyncOutput, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat, Reported};

/// Runs the sync command.
pub async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    let orchestrator = SyncOrchestrator::new(
        ProvisioningClient::new(service_http(&config)?),
        token_store(&config)?,
        credential_store(&config)?,
        SyncOptions::from_config(&config),
    );

    let outcome = orchestrator.run().await;

    if !cli.quiet || cli.format == OutputFormat::Json {
        match cli.format {
            OutputFormat::Text => {
                let formatter = TextFormatter::new(!cli.no_color);
                println!("{}", formatter.format_sync(&outcome, cli.verbose));
            }
            OutputFormat::Json => {
                let formatter = JsonFormatter::new(cli.pretty);
                println!("{}", formatter.format(&SyncOutput::from_outcome(&outcome))?);
            }
        }
    }

    match outcome.reason_code() {
        None => Ok(()),
        Some(reason) => Err(Reported(ExitCode::for_reason(reason)).into()),
    }
}
