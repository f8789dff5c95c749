//! Paths command - show resolved file locations.

use anyhow::Result;
use cursorauth_store::Config;

use super::load_config;
use crate::output::{JsonFormatter, PathsOutput};
use crate::{Cli, OutputFormat};

/// Runs the paths command.
pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    let config_file = cli.config.clone().unwrap_or_else(Config::default_path);
    let paths = PathsOutput {
        config_file: config_file.display().to_string(),
        token_file: config.token_path()?.display().to_string(),
        card_file: config.card_path()?.display().to_string(),
        state_db: config.state_db_path()?.display().to_string(),
        api_base_url: config.api_base().to_string(),
    };

    match cli.format {
        OutputFormat::Text => {
            println!("Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config file: {}", paths.config_file);
            println!("Token file:  {}", paths.token_file);
            println!("Card file:   {}", paths.card_file);
            println!("State db:    {}", paths.state_db);
            println!("API base:    {}", paths.api_base_url);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}
