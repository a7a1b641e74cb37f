//! Cache and refresh the lists an index references.

use std::fs;
use std::path::{Path, PathBuf};

use byomod_modlist::{ModerationList, PlatformRegistry};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{ListOfLists, ListRef, COUNTER_BLOCKS, COUNTER_CATEGORIES, COUNTER_RECOMMENDS, COUNTER_TRUSTS};
use crate::error::ListsError;
use crate::fetch::ListFetcher;

/// Hex digits of the blake3 digest used as cache file name.
const CACHE_ID_LEN: usize = 16;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Entries whose counters were updated
    pub refreshed: usize,
    /// Entries downloaded during this run
    pub fetched: usize,
    /// Entries left untouched after a fetch or parse failure
    pub failed: usize,
}

/// Cache identifier for a fetch URL.
pub fn cache_id(url: &str) -> String {
    let hex = blake3::hash(url.as_bytes()).to_hex();
    hex[..CACHE_ID_LEN].to_string()
}

pub fn cache_path(cache_dir: &Path, entry: &ListRef) -> PathBuf {
    cache_dir.join(format!("{}.yaml", cache_id(entry.fetch_url())))
}

/// Refresh every entry of `lists` from its cached file, downloading files
/// that are not cached yet (or all of them with `force`).
///
/// Errors only when the cache directory cannot be created.
pub fn refresh(
    lists: &mut ListOfLists,
    fetcher: &dyn ListFetcher,
    cache_dir: &Path,
    registry: &PlatformRegistry,
    force: bool,
) -> Result<RefreshReport, ListsError> {
    fs::create_dir_all(cache_dir).map_err(|e| ListsError::io(cache_dir, e))?;

    let mut report = RefreshReport::default();
    for entry in &mut lists.lists {
        match refresh_entry(entry, fetcher, cache_dir, registry, force) {
            Ok(fetched) => {
                report.refreshed += 1;
                if fetched {
                    report.fetched += 1;
                }
            }
            Err(e) => {
                warn!(list = %entry.name, url = %entry.fetch_url(), error = %e, "skipping list");
                report.failed += 1;
            }
        }
    }

    info!(
        refreshed = report.refreshed,
        fetched = report.fetched,
        failed = report.failed,
        "list-of-lists refreshed"
    );
    Ok(report)
}

/// Returns whether the file had to be downloaded.
fn refresh_entry(
    entry: &mut ListRef,
    fetcher: &dyn ListFetcher,
    cache_dir: &Path,
    registry: &PlatformRegistry,
    force: bool,
) -> Result<bool, ListsError> {
    let path = cache_path(cache_dir, entry);

    let fetched = force || !path.exists();
    if fetched {
        let text = fetcher.fetch(entry.fetch_url())?;
        // parse before caching so a bad download is not kept
        ModerationList::from_yaml(&text, registry.clone())?;
        fs::write(&path, text).map_err(|e| ListsError::io(&path, e))?;
        debug!(list = %entry.name, path = %path.display(), "cached list");
    }

    let list = ModerationList::load(&path, registry.clone())?;
    entry.last_updated = Some(list.last_updated());
    entry.counters.insert(COUNTER_BLOCKS.into(), list.blocks().len() as u64);
    entry.counters.insert(COUNTER_TRUSTS.into(), list.trusts().len() as u64);
    entry.counters.insert(COUNTER_RECOMMENDS.into(), list.recommends().len() as u64);
    entry.counters.insert(COUNTER_CATEGORIES.into(), list.categories().len() as u64);
    Ok(fetched)
}
