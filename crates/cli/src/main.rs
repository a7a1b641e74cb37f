// modlist CLI - build and maintain moderation lists from spreadsheets

mod augment;
mod exit_codes;
mod fetch_blocks;
mod lists;
mod show;

use std::path::PathBuf;
use std::process::ExitCode;

use byomod_config::{ConfigError, Settings};
use byomod_io::ImportError;
use byomod_lists::ListsError;
use byomod_modlist::ModlistError;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use exit_codes::{
    EXIT_ERROR, EXIT_FETCH_UPSTREAM, EXIT_IMPORT, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "modlist")]
#[command(about = "Build and maintain moderation lists from spreadsheets")]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/byomod/settings.toml)
    #[arg(long, global = true, env = "MODLIST_CONFIG")]
    config: Option<PathBuf>,

    /// Log debug detail to stderr (overrides RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a spreadsheet into a moderation list
    #[command(after_help = "\
Examples:
  modlist augment --workbook blocks.xlsx --yaml list.yaml
  modlist augment --workbook blocks.xlsx --sheet Blocks --yaml list.yaml
  modlist augment --workbook export.csv --delimiter ';' --output new.yaml
  modlist augment --workbook more.csv --yaml list.yaml --output merged.yaml")]
    Augment(augment::AugmentArgs),

    /// Summarize a moderation list
    #[command(after_help = "\
Examples:
  modlist show list.yaml
  modlist show list.yaml --json")]
    Show {
        /// List file (YAML)
        list: PathBuf,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Maintain a list-of-lists index
    #[command(subcommand)]
    Lists(lists::ListsCommands),

    /// Export the accounts blocked by an X account as an importable CSV
    #[command(after_help = "\
Examples:
  X_BEARER_TOKEN=... X_CSRF_TOKEN=... X_AUTH_TOKEN=... modlist fetch-blocks --output blocks.csv
  modlist fetch-blocks --output blocks.csv --category harassment")]
    FetchBlocks(fetch_blocks::FetchBlocksArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (settings, settings_error) = match load_settings(cli.config.as_ref()) {
        Ok(loaded) => loaded,
        Err(e) => return report(Err(e)),
    };
    init_logging(&settings.logging.filter, cli.verbose);
    if let Some(e) = settings_error {
        warn!(error = %e, "using default settings");
    }

    let result = match cli.command {
        Commands::Augment(args) => augment::cmd_augment(args, &settings),
        Commands::Show { list, json } => show::cmd_show(&list, json),
        Commands::Lists(command) => lists::cmd_lists(command, &settings),
        Commands::FetchBlocks(args) => fetch_blocks::cmd_fetch_blocks(args),
    };

    report(result)
}

fn report(result: Result<(), CliError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// An explicit `--config` must load; the default location falls back to
/// defaults and hands the error back for logging once tracing is up.
fn load_settings(explicit: Option<&PathBuf>) -> Result<(Settings, Option<ConfigError>), CliError> {
    match explicit {
        Some(path) => Ok((Settings::load_from(path)?, None)),
        None => Ok(Settings::load()),
    }
}

fn init_logging(filter: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(filter))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn import(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IMPORT, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ModlistError> for CliError {
    fn from(err: ModlistError) -> Self {
        match err {
            ModlistError::Io { .. } => CliError::io(err.to_string()),
            ModlistError::UnknownPlatform(_) => CliError::parse(err.to_string())
                .with_hint("the list references a platform this build does not know"),
            ModlistError::Yaml(_) | ModlistError::EmptyStat => CliError::parse(err.to_string()),
        }
    }
}

impl From<ImportError> for CliError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Io { .. } => CliError::io(err.to_string()),
            ImportError::UnsupportedFormat(_) => CliError::args(err.to_string())
                .with_hint("supported: csv, tsv, txt, xlsx, xlsm, xls, xlsb, ods"),
            ImportError::Csv(_)
            | ImportError::Workbook(_)
            | ImportError::SheetNotFound(_)
            | ImportError::NoSheets => CliError::import(err.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io { .. } => CliError::io(err.to_string()),
            ConfigError::Parse { .. } => CliError::parse(err.to_string()),
            ConfigError::Serialize(_) => CliError::general(err.to_string()),
        }
    }
}

impl From<ListsError> for CliError {
    fn from(err: ListsError) -> Self {
        match err {
            ListsError::Io { .. } => CliError::io(err.to_string()),
            ListsError::Json(_) | ListsError::List(_) => CliError::parse(err.to_string()),
            ListsError::Network(_) | ListsError::Http(..) => CliError {
                code: EXIT_FETCH_UPSTREAM,
                message: err.to_string(),
                hint: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_error_codes() {
        let err: CliError = ImportError::SheetNotFound("Blocks".into()).into();
        assert_eq!(err.code, EXIT_IMPORT);

        let err: CliError = ImportError::UnsupportedFormat("a.pdf".into()).into();
        assert_eq!(err.code, EXIT_USAGE);
        assert!(err.hint.is_some());

        let err: CliError = ModlistError::UnknownPlatform("myspace".into()).into();
        assert_eq!(err.code, EXIT_PARSE);

        let err: CliError = ListsError::Http(500, "https://a.example".into()).into();
        assert_eq!(err.code, EXIT_FETCH_UPSTREAM);
    }
}
