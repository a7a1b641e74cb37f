// Workbook import (xlsx, xls, xlsb, ods) via calamine

use std::path::Path;

use byomod_modlist::{ingest_rows, Cell, IngestReport, ModerationList};
use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::debug;

use crate::error::ImportError;

/// Import one worksheet. `sheet` = None reads the first sheet in the workbook.
pub fn import(path: &Path, sheet: Option<&str>, list: &mut ModerationList) -> Result<IngestReport, ImportError> {
    let rows = read_sheet(path, sheet)?;
    Ok(ingest_rows(rows, list))
}

/// Rows of the selected worksheet, header first.
pub fn read_sheet(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<Cell>>, ImportError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ImportError::Workbook(e.to_string()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| ImportError::SheetNotFound(name.to_string()))?,
        None => sheet_names.first().cloned().ok_or(ImportError::NoSheets)?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::Workbook(format!("failed to read sheet '{}': {}", sheet_name, e)))?;

    let rows = range_rows(&range);
    debug!(sheet = %sheet_name, rows = rows.len(), "read worksheet");
    Ok(rows)
}

fn range_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
    // Range start offset (data may not begin at A1). Leading blank rows are
    // dropped so the first stored row is the header; columns keep their offset.
    let (_, data_start_col) = range.start().unwrap_or((0, 0));
    let pad = data_start_col as usize;

    range
        .rows()
        .map(|row| {
            let mut cells = Vec::with_capacity(pad + row.len());
            cells.resize(pad, Cell::Empty);
            cells.extend(row.iter().map(to_cell));
            cells
        })
        .collect()
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(n) => Cell::Float(*n),
        Data::Int(n) => Cell::Int(*n),
        Data::Bool(b) => Cell::Bool(*b),
        // #N/A and friends carry no usable value
        Data::Error(_) => Cell::Empty,
        Data::DateTime(dt) => Cell::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from(s.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byomod_modlist::{ListMeta, PlatformRegistry};
    use rust_xlsxwriter::Workbook;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn new_list() -> ModerationList {
        ModerationList::new(ListMeta::default(), PlatformRegistry::builtin())
    }

    /// Two sheets: "Notes" (no usable rows) first, then "Blocks".
    fn fixture(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("list.xlsx");
        let mut workbook = Workbook::new();

        let notes = workbook.add_worksheet();
        notes.set_name("Notes").unwrap();
        notes.write_string(0, 0, "Curated by hand").unwrap();

        let blocks = workbook.add_worksheet();
        blocks.set_name("Blocks").unwrap();
        for (col, header) in ["First Name", "Categories", "Politician", "Twitter", "YouTube"].iter().enumerate() {
            blocks.write_string(0, col as u16, *header).unwrap();
        }
        blocks.write_string(1, 0, "Jane").unwrap();
        blocks.write_string(1, 1, "extremist").unwrap();
        blocks.write_number(1, 2, 1.0).unwrap();
        blocks.write_string(1, 3, "https://twitter.com/janedoe").unwrap();
        blocks.write_string(2, 0, "Bob").unwrap();
        blocks.write_string(2, 1, "hate").unwrap();
        blocks.write_boolean(2, 2, false).unwrap();
        blocks.write_string(2, 4, "bobtube").unwrap();

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_import_named_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir);

        let mut list = new_list();
        let report = import(&path, Some("Blocks"), &mut list).unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(report.inserted, 2);

        let jane = list.block("twitter:janedoe").unwrap();
        assert!(jane.annotations().contains("politician"), "numeric 1 is a set flag");

        let bob = list.block("youtube:bobtube").unwrap();
        assert!(bob.annotations().is_empty(), "FALSE is an unset flag");
    }

    #[test]
    fn test_first_sheet_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir);

        let rows = read_sheet(&path, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], Cell::Text("Curated by hand".into()));

        let mut list = new_list();
        let report = import(&path, None, &mut list).unwrap();
        assert_eq!(report.accepted(), 0);
        assert!(list.blocks().is_empty());
    }

    #[test]
    fn test_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir);
        let err = read_sheet(&path, Some("Trusts")).unwrap_err();
        assert!(matches!(err, ImportError::SheetNotFound(ref name) if name == "Trusts"));
    }

    #[test]
    fn test_offset_range_keeps_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offset.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        // data starts at C3
        sheet.write_string(2, 2, "Categories").unwrap();
        sheet.write_string(2, 3, "Twitter").unwrap();
        sheet.write_string(3, 2, "spam").unwrap();
        sheet.write_string(3, 3, "spammer").unwrap();
        workbook.save(&path).unwrap();

        let rows = read_sheet(&path, None).unwrap();
        assert_eq!(rows[0][2], Cell::Text("Categories".into()));
        assert_eq!(rows[0][0], Cell::Empty);

        let mut list = new_list();
        let report = import(&path, None, &mut list).unwrap();
        assert_eq!(report.inserted, 1);
        assert!(list.block("twitter:spammer").is_some());
    }

    #[test]
    fn test_not_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip").unwrap();
        assert!(matches!(read_sheet(&path, None), Err(ImportError::Workbook(_))));
    }
}
