//! Status command - show the current Cursor session.

use anyhow::Result;

use super::{credential_store, load_config, token_store};
use crate::output::{JsonFormatter, StatusOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the status command.
pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let tokens = token_store(&config)?;
    let credentials = credential_store(&config)?;

    let bearer = tokens.get()?;
    let info = credentials.auth_info()?;

    let status = StatusOutput {
        logged_in: info.is_logged_in(),
        email: info.email.clone(),
        has_access_token: info.access_token.is_some(),
        has_refresh_token: info.refresh_token.is_some(),
        bearer_token: bearer.as_ref().map(cursorauth_core::BearerToken::masked),
        fields: info.fields.keys().cloned().collect(),
        state_db: credentials.path().display().to_string(),
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_status(&status, cli.verbose));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&status)?);
        }
    }

    Ok(())
}
