// Tabular sources for moderation list ingestion

pub mod csv;
pub mod error;
pub mod xlsx;

use std::path::Path;

use byomod_modlist::{IngestReport, ModerationList};

pub use error::ImportError;

/// Source formats recognized by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Tsv,
    Workbook,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Workbook),
            _ => None,
        }
    }
}

/// Options shared by every source kind.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Worksheet to read (workbooks only); None = first sheet
    pub sheet: Option<String>,
    /// Field delimiter override (CSV only); None = sniff
    pub delimiter: Option<u8>,
}

/// Import any supported source into `list`, dispatching on the extension.
pub fn import(path: &Path, options: &ImportOptions, list: &mut ModerationList) -> Result<IngestReport, ImportError> {
    match SourceKind::from_path(path) {
        Some(SourceKind::Csv) => match options.delimiter {
            Some(delimiter) => csv::import_with_delimiter(path, delimiter, list),
            None => csv::import(path, list),
        },
        Some(SourceKind::Tsv) => csv::import_with_delimiter(path, b'\t', list),
        Some(SourceKind::Workbook) => xlsx::import(path, options.sheet.as_deref(), list),
        None => Err(ImportError::UnsupportedFormat(path.display().to_string())),
    }
}
