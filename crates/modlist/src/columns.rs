use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::cell::Cell;
use crate::platform::PlatformRegistry;

/// Normalized column name → source column indices holding that field.
///
/// Numbered variants (`Twitter-1`, `Twitter-2`) collapse into one key.
/// Index sets are ordered, so the smallest index is always `first()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: HashMap<String, BTreeSet<usize>>,
}

impl ColumnMap {
    /// Inspect a header row and build the map.
    pub fn discover(header: &[Cell], registry: &PlatformRegistry) -> Self {
        let mut map = ColumnMap::default();
        let mut platform_columns = 0usize;
        for (index, cell) in header.iter().enumerate() {
            let raw = cell.text().unwrap_or_default();
            let name = normalize_header(&raw);
            if name.is_empty() {
                warn!(column = index, "empty column header; mapped to an empty key");
            } else if registry.contains(&name) {
                platform_columns += 1;
            }
            map.columns.entry(name).or_default().insert(index);
        }
        debug!(columns = header.len(), platform_columns, "discovered column map");
        map
    }

    /// All indices mapped to `name` (empty when the column is absent).
    pub fn indices(&self, name: &str) -> BTreeSet<usize> {
        self.columns.get(name).cloned().unwrap_or_default()
    }

    /// Lowest index for `name`; singleton fields read only this one.
    pub fn first(&self, name: &str) -> Option<usize> {
        self.columns.get(name).and_then(|set| set.first().copied())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

/// `"Twitter-2"` → `"twitter"`, `"First Name"` → `"firstname"`.
///
/// Only a numeric suffix after the last hyphen is dropped; otherwise the
/// whole header is kept as a literal name.
pub fn normalize_header(raw: &str) -> String {
    let base = match raw.rsplit_once('-') {
        Some((base, suffix)) if suffix.trim().parse::<i64>().is_ok() => base,
        _ => raw,
    };
    base.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
