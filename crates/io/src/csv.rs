// CSV/TSV import

use std::cmp::Reverse;
use std::io::Read;
use std::path::Path;

use byomod_modlist::{ingest_rows, Cell, IngestReport, ModerationList};
use tracing::debug;

use crate::error::ImportError;

pub fn import(path: &Path, list: &mut ModerationList) -> Result<IngestReport, ImportError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter, list)
}

pub fn import_with_delimiter(path: &Path, delimiter: u8, list: &mut ModerationList) -> Result<IngestReport, ImportError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter, list)
}

/// Delimiters tried when sniffing, in tie-break order.
const DELIMITER_CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];

/// Non-blank lines sampled when sniffing.
const SNIFF_LINES: usize = 10;

/// Pick the delimiter that splits the header into several fields and keeps
/// the most sampled rows at the header's width.
///
/// Score is agreeing rows × header width; ties favor the earlier candidate.
/// Nothing splits → comma.
fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    DELIMITER_CANDIDATES
        .iter()
        .enumerate()
        .filter_map(|(rank, &delimiter)| {
            let widths: Vec<usize> = sample.iter().map(|line| field_count(line, delimiter)).collect();
            let header = *widths.first()?;
            if header <= 1 {
                return None;
            }
            let agreeing = widths.iter().filter(|&&width| width == header).count();
            Some((agreeing * header, Reverse(rank), delimiter))
        })
        .max_by_key(|&(score, rank, _)| (score, rank))
        .map_or(b',', |(.., delimiter)| delimiter)
}

/// Fields in one line under `delimiter`, honoring quotes. Unparseable → 1.
fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(1, |record| record.len())
}

/// Read file and convert to UTF-8 if needed (Windows-1252 exports from Excel).
pub fn read_file_as_utf8(path: &Path) -> Result<String, ImportError> {
    let io_err = |source| ImportError::Io { path: path.display().to_string(), source };
    let mut file = std::fs::File::open(path).map_err(io_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(io_err)?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    // Excel prefixes UTF-8 CSV exports with a BOM that would end up in the first header
    Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
}

/// Parse CSV text into rows of cells. Fields are kept as text.
pub fn read_rows(content: &str, delimiter: u8) -> Result<Vec<Vec<Cell>>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(Cell::from).collect());
    }
    Ok(rows)
}

fn import_from_string(content: &str, delimiter: u8, list: &mut ModerationList) -> Result<IngestReport, ImportError> {
    let rows = read_rows(content, delimiter)?;
    debug!(rows = rows.len(), delimiter = %(delimiter as char), "read CSV rows");
    Ok(ingest_rows(rows, list))
}

#[cfg(test)]
mod tests {
    use super::*;
    use byomod_modlist::{ListMeta, PlatformRegistry};
    use std::fs;
    use tempfile::tempdir;

    fn new_list() -> ModerationList {
        ModerationList::new(ListMeta::default(), PlatformRegistry::builtin())
    }

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "First Name;Twitter;Categories\nJane;jd;extremist\nBob;bob;hate\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "First Name,Twitter,Categories\nJane,jd,extremist\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "First Name\tTwitter\tCategories\nJane\tjd\textremist\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "Name;Categories;Twitter\n\"Doe, Jane\";\"hate, spam\";jd\nBob;spam;bob\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_skips_blank_lines_and_defaults_to_comma() {
        assert_eq!(sniff_delimiter("\n\nTwitter|Categories\njd|hate\n"), b'|');
        assert_eq!(sniff_delimiter("Twitter\njd\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_sniff_tie_prefers_earlier_candidate() {
        // two fields under both tab and comma
        assert_eq!(sniff_delimiter("a\tb,c\n"), b'\t');
    }

    #[test]
    fn test_read_rows_keeps_empty_cells() {
        let rows = read_rows("a,,c\n,b\n", b',').unwrap();
        assert_eq!(rows[0], vec![Cell::Text("a".into()), Cell::Empty, Cell::Text("c".into())]);
        assert_eq!(rows[1], vec![Cell::Empty, Cell::Text("b".into())]);
    }

    #[test]
    fn test_quoted_category_list_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.csv");
        fs::write(
            &path,
            "First Name,Categories,Twitter-1,Twitter-2\nJane,\"extremist, hate\",jd,https://twitter.com/jd2 - suspended by user\n",
        )
        .unwrap();

        let mut list = new_list();
        let report = import(&path, &mut list).unwrap();
        assert_eq!(report.inserted, 1);
        let entry = list.block("twitter:jd").unwrap();
        assert_eq!(entry.categories().len(), 2);
        let statuses: Vec<_> = entry.accounts().map(|a| a.status.as_str()).collect();
        assert_eq!(statuses, ["active", "user"]);
    }

    #[test]
    fn test_windows_1252_and_bom() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "José" in Windows-1252
        let mut bytes = b"First Name,Categories,Twitter\nJos".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b",spam,jose\n");
        fs::write(&path, bytes).unwrap();
        assert!(read_file_as_utf8(&path).unwrap().contains("José"));

        let bom_path = dir.path().join("bom.csv");
        fs::write(&bom_path, "\u{feff}First Name,Categories,Twitter\nJane,spam,jd\n").unwrap();
        let mut list = new_list();
        import(&bom_path, &mut list).unwrap();
        assert_eq!(list.block("twitter:jd").unwrap().first_name.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_missing_file() {
        let mut list = new_list();
        let err = import(Path::new("/nonexistent/list.csv"), &mut list).unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }
}
