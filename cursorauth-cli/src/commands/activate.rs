//! Activate command - check a card and store its bearer token.
//!
//! With no card argument the last activated card is re-checked and, while
//! it is still in use, re-activated to obtain a fresh bearer token.

use anyhow::{Result, anyhow, bail};
use clap::Args;
use cursorauth_core::CardNumber;
use cursorauth_fetch::ActivationClient;
use cursorauth_store::{CardStore, TokenStore};
use tracing::{info, warn};

use super::{card_store, load_config, service_http, token_store};
use crate::output::{ActivationOutput, JsonFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the activate command.
#[derive(Args)]
pub struct ActivateArgs {
    /// 16-character activation card. Defaults to the saved card.
    pub card: Option<String>,

    /// Re-activate a card that is already used, to obtain a fresh token.
    #[arg(long)]
    pub reissue: bool,

    /// Re-issue the token from the saved card.
    #[arg(long, conflicts_with = "card")]
    pub refresh: bool,
}

/// Runs the activate command.
pub async fn run(args: &ActivateArgs, cli: &Cli) -> Result<()> {
    let card = if args.refresh {
        None
    } else {
        args.card.as_deref().map(CardNumber::parse).transpose()?
    };
    let config = load_config(cli)?;
    let client = ActivationClient::new(service_http(&config)?);

    let output = activate(
        &client,
        &token_store(&config)?,
        &card_store(&config)?,
        card,
        args.reissue,
    )
    .await?;

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                let verb = if output.refreshed { "refreshed" } else { "activated" };
                match output.days {
                    Some(days) => println!("Card {verb} (valid for {days} days)"),
                    None => println!("Card {verb}"),
                }
                if !output.token_saved {
                    println!("Warning: the service returned no bearer token");
                }
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}

/// Activates `card`, or the saved card when `card` is `None`.
///
/// A given card that is already used is refused unless `reissue` is set.
/// The saved card is only re-activated while the service reports it used.
/// After a successful activation the card is remembered and any issued
/// token replaces the stored one.
pub async fn activate(
    client: &ActivationClient,
    tokens: &TokenStore,
    cards: &CardStore,
    card: Option<CardNumber>,
    reissue: bool,
) -> Result<ActivationOutput> {
    let (card, refreshed) = match card {
        Some(card) => (card, false),
        None => {
            let saved = cards.get()?.ok_or_else(|| {
                anyhow!("No saved card; run `cursorauth activate <CARD>` first")
            })?;
            info!(path = %cards.path().display(), "Using saved card");
            (saved, true)
        }
    };

    let status = client.check_card(&card).await?;
    if refreshed && !status.is_used {
        bail!("Saved card {card} is not active; run `cursorauth activate {card}`");
    }
    if !refreshed && status.is_used && !reissue {
        bail!("Card {card} has already been used (pass --reissue to re-activate it)");
    }

    let activation = client.activate_card(&card).await?;
    cards.save(&card)?;

    let token_saved = match activation.access_token.as_deref() {
        Some(token) if !token.trim().is_empty() => {
            tokens.save(token.trim())?;
            info!("Bearer token saved");
            true
        }
        _ => {
            warn!("Activation returned no access token");
            false
        }
    };

    Ok(ActivationOutput {
        card: card.to_string(),
        reissued: status.is_used,
        refreshed,
        days: status.days,
        token_saved,
    })
}
