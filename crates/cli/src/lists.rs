//! `modlist lists`: maintain a list-of-lists index.

use std::path::PathBuf;

use byomod_config::Settings;
use byomod_lists::{refresh, HttpFetcher, ListOfLists};
use byomod_modlist::PlatformRegistry;
use clap::Subcommand;

use crate::CliError;

const DEFAULT_INDEX: &str = "lists.json";

#[derive(Subcommand)]
pub enum ListsCommands {
    /// Download referenced lists and refresh their counters
    #[command(after_help = "\
Examples:
  modlist lists refresh
  modlist lists refresh --file index.json --output index.json
  modlist lists refresh --cache-dir /tmp/lists --force")]
    Refresh {
        /// List-of-lists JSON file
        #[arg(long, short = 'f', default_value = DEFAULT_INDEX)]
        file: PathBuf,

        /// Where to write the refreshed index (default: --file)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Cache directory for downloaded lists (default: [lists] cache_dir setting)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Download every list even when a cached copy exists
        #[arg(long)]
        force: bool,
    },
}

pub fn cmd_lists(command: ListsCommands, settings: &Settings) -> Result<(), CliError> {
    match command {
        ListsCommands::Refresh { file, output, cache_dir, force } => {
            if !file.exists() {
                return Err(CliError::args(format!("index not found: {}", file.display())));
            }
            let mut index = ListOfLists::load(&file)?;
            let cache_dir = cache_dir.unwrap_or_else(|| settings.lists.cache_dir.clone());
            let fetcher = HttpFetcher::new()?;

            let report = refresh(&mut index, &fetcher, &cache_dir, &PlatformRegistry::builtin(), force)?;

            let output = output.unwrap_or(file);
            index.save(&output)?;
            println!(
                "{} refreshed · {} downloaded · {} failed → {}",
                report.refreshed,
                report.fetched,
                report.failed,
                output.display()
            );
            Ok(())
        }
    }
}
