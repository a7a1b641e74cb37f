//! `modlist augment`: ingest a spreadsheet into a list file.

use std::path::{Path, PathBuf};

use byomod_config::{parse_delimiter, ListSettings, Settings};
use byomod_io::ImportOptions;
use byomod_modlist::{Author, ListMeta, ModerationList, PlatformRegistry};
use clap::Args;
use tracing::info;

use crate::CliError;

#[derive(Args)]
pub struct AugmentArgs {
    /// Source spreadsheet (csv, tsv, xlsx, xls, xlsb, ods)
    #[arg(long, short = 'w')]
    pub workbook: PathBuf,

    /// Existing list to augment; created if it does not exist
    #[arg(long, short = 'y')]
    pub yaml: Option<PathBuf>,

    /// Where to write the result (default: --yaml)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Worksheet to read (default: [import] sheet setting, else the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// CSV delimiter: a single character or "tab" (default: sniffed)
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Print the ingest report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_augment(args: AugmentArgs, settings: &Settings) -> Result<(), CliError> {
    let output = args
        .output
        .clone()
        .or_else(|| args.yaml.clone())
        .ok_or_else(|| CliError::args("nothing to write to").with_hint("pass --yaml <list> or --output <file>"))?;

    if !args.workbook.exists() {
        return Err(CliError::args(format!("workbook not found: {}", args.workbook.display())));
    }

    let options = import_options(&args, settings)?;
    let mut list = open_list(args.yaml.as_deref(), &settings.list)?;

    let report = byomod_io::import(&args.workbook, &options, &mut list)?;
    info!(
        workbook = %args.workbook.display(),
        rows = report.rows,
        inserted = report.inserted,
        merged = report.merged,
        "ingested workbook"
    );

    list.save(&output)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", json);
    } else {
        println!("{}", report.summary());
        println!("wrote {} ({} blocks)", output.display(), list.blocks().len());
    }
    Ok(())
}

fn import_options(args: &AugmentArgs, settings: &Settings) -> Result<ImportOptions, CliError> {
    let delimiter = match args.delimiter.as_deref() {
        Some(raw) => Some(
            parse_delimiter(raw)
                .ok_or_else(|| CliError::args(format!("invalid delimiter '{}'", raw)).with_hint("use one ASCII character or \"tab\""))?,
        ),
        None => settings.import.delimiter_byte(),
    };
    Ok(ImportOptions {
        sheet: args.sheet.clone().or_else(|| settings.import.sheet.clone()),
        delimiter,
    })
}

/// Load `yaml` when it exists, otherwise start a list from the settings.
fn open_list(yaml: Option<&Path>, defaults: &ListSettings) -> Result<ModerationList, CliError> {
    let registry = PlatformRegistry::builtin();
    match yaml {
        Some(path) if path.exists() => Ok(ModerationList::load(path, registry)?),
        _ => {
            if let Some(path) = yaml {
                info!(path = %path.display(), "list does not exist yet, starting a new one");
            }
            Ok(ModerationList::new(new_list_meta(defaults), registry))
        }
    }
}

fn new_list_meta(defaults: &ListSettings) -> ListMeta {
    ListMeta {
        list_name: defaults.name.clone(),
        author: Author {
            name: defaults.author_name.clone(),
            email: defaults.author_email.clone(),
            url: defaults.author_url.clone(),
        },
        list_url: defaults.list_url.clone(),
        download_url: defaults.download_url.clone(),
    }
}
