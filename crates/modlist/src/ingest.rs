// Row ingestion: tabular row + column map → ModerationEntry → list.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::account::{handle_from_url, SocialAccount, DEFAULT_STATUS};
use crate::cell::{cell_at, Cell};
use crate::columns::ColumnMap;
use crate::entry::{normalize_tag, ModerationEntry, NO_NAME};
use crate::list::{BlockInsert, ModerationList};
use crate::platform::Platform;

/// Separator between a link/handle and its status words in a platform cell.
pub const STATUS_SEPARATOR: &str = " - ";

/// Marks a categorization the curator was unsure about.
const UNCERTAIN_MARKER: char = '?';

const SECURE_SCHEME: &str = "https://";

/// Yes/no columns that add an annotation of the same name.
const ANNOTATION_FLAGS: [&str; 2] = ["politician", "journalist"];

/// What happened to one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Inserted(String),
    Merged(String),
    SkippedUncategorized,
    SkippedNoAccounts,
}

/// Per-source ingestion statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Data rows seen (header excluded)
    pub rows: usize,
    pub inserted: usize,
    pub merged: usize,
    pub skipped_uncategorized: usize,
    pub skipped_no_accounts: usize,
}

impl IngestReport {
    pub fn record(&mut self, outcome: &RowOutcome) {
        self.rows += 1;
        match outcome {
            RowOutcome::Inserted(_) => self.inserted += 1,
            RowOutcome::Merged(_) => self.merged += 1,
            RowOutcome::SkippedUncategorized => self.skipped_uncategorized += 1,
            RowOutcome::SkippedNoAccounts => self.skipped_no_accounts += 1,
        }
    }

    pub fn accepted(&self) -> usize {
        self.inserted + self.merged
    }

    pub fn summary(&self) -> String {
        format!(
            "{} rows · {} new · {} merged · {} uncategorized · {} without accounts",
            self.rows, self.inserted, self.merged, self.skipped_uncategorized, self.skipped_no_accounts
        )
    }
}

/// Turns rows into entries using a discovered column map.
pub struct RowIngestor<'a> {
    columns: &'a ColumnMap,
}

impl<'a> RowIngestor<'a> {
    pub fn new(columns: &'a ColumnMap) -> Self {
        Self { columns }
    }

    fn text(&self, row: &[Cell], name: &str) -> Option<String> {
        self.columns.first(name).and_then(|i| cell_at(row, i).text())
    }

    fn flag(&self, row: &[Cell], name: &str) -> bool {
        self.columns.first(name).is_some_and(|i| cell_at(row, i).flag())
    }

    /// Build the entry for one row. New category tags are registered in the
    /// list's glossary as soon as the row passes the category gate.
    ///
    /// `Err(outcome)` carries the reason the row was skipped.
    pub fn build_entry(&self, row: &[Cell], list: &mut ModerationList) -> Result<ModerationEntry, RowOutcome> {
        let mut entry = ModerationEntry::new(
            self.text(row, "firstname"),
            self.text(row, "lastname"),
            self.text(row, "businessname"),
            self.text(row, "businesstype"),
        );
        let name = entry.display_name();

        let categories = match self.text(row, "categories") {
            Some(raw) if !raw.contains(UNCERTAIN_MARKER) => raw,
            _ => {
                if name != NO_NAME {
                    info!(name = %name, "skipping row without a definitive category");
                }
                return Err(RowOutcome::SkippedUncategorized);
            }
        };
        for category in split_list(&categories) {
            entry.add_category(&category);
            list.add_category(&category, "");
        }

        if let Some(languages) = self.text(row, "languages") {
            let languages = split_list(&languages);
            entry.set_languages(languages.iter().map(String::as_str));
        }

        for annotation in ANNOTATION_FLAGS {
            if self.flag(row, annotation) {
                entry.add_annotation(annotation);
            }
        }

        for index in self.columns.indices("web") {
            if let Some(url) = cell_at(row, index).text() {
                entry.add_url(&url);
            }
        }

        for platform in list.registry().iter() {
            let indices = self.columns.indices(&platform.key);
            for account in accounts_from_row(platform, &indices, row) {
                entry.add_account(account);
            }
        }

        if entry.account_count() == 0 {
            debug!(name = %name, "skipping row without social accounts");
            return Err(RowOutcome::SkippedNoAccounts);
        }
        Ok(entry)
    }

    /// Build the row's entry and hand it to the list.
    pub fn ingest(&self, row: &[Cell], list: &mut ModerationList) -> RowOutcome {
        let entry = match self.build_entry(row, list) {
            Ok(entry) => entry,
            Err(skipped) => return skipped,
        };
        match list.add_block(entry) {
            BlockInsert::Inserted(key) => RowOutcome::Inserted(key),
            BlockInsert::Merged(key) => RowOutcome::Merged(key),
        }
    }
}

/// Discover columns from the first row, then ingest every following row.
pub fn ingest_rows<I>(rows: I, list: &mut ModerationList) -> IngestReport
where
    I: IntoIterator<Item = Vec<Cell>>,
{
    let mut rows = rows.into_iter();
    let mut report = IngestReport::default();
    let Some(header) = rows.next() else {
        return report;
    };
    let columns = ColumnMap::discover(&header, list.registry());
    let ingestor = RowIngestor::new(&columns);
    for row in rows {
        let outcome = ingestor.ingest(&row, list);
        report.record(&outcome);
    }
    info!(
        rows = report.rows,
        inserted = report.inserted,
        merged = report.merged,
        skipped = report.skipped_uncategorized + report.skipped_no_accounts,
        "ingested rows"
    );
    report
}

/// Accounts for one platform from the row's cells at `indices`.
///
/// The account from the lowest index is primary, all others are not.
pub fn accounts_from_row(platform: &Platform, indices: &BTreeSet<usize>, row: &[Cell]) -> Vec<SocialAccount> {
    let Some(&primary_index) = indices.first() else {
        return Vec::new();
    };
    indices
        .iter()
        .filter_map(|&index| {
            let raw = cell_at(row, index).text()?;
            let account = parse_account_cell(platform, &raw)?;
            Some(account.with_primary(Some(index == primary_index)))
        })
        .collect()
}

/// Parse `"<url-or-handle>"` or `"<url-or-handle> - <status words>"`.
///
/// Only the last word of the status text is kept: `"suspended by user"`
/// gives status `"user"`.
pub fn parse_account_cell(platform: &Platform, raw: &str) -> Option<SocialAccount> {
    let (value, status) = match raw.split_once(STATUS_SEPARATOR) {
        Some((value, status_text)) => (
            value.trim(),
            status_text.split_whitespace().last().unwrap_or(DEFAULT_STATUS),
        ),
        None => (raw.trim(), DEFAULT_STATUS),
    };
    if value.is_empty() {
        return None;
    }

    let account = if value.starts_with(SECURE_SCHEME) {
        SocialAccount::new(platform, &handle_from_url(value), value)
    } else {
        let handle = value.trim_start_matches('@');
        let url = platform.profile_url(handle).unwrap_or_else(|| value.to_string());
        SocialAccount::new(platform, handle, &url)
    };
    Some(account.with_status(status))
}

/// Comma-separated cell content, normalized, blanks dropped.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_tag)
        .filter(|s| !s.is_empty())
        .collect()
}
