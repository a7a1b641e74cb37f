use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::account::AccountKey;
use crate::entry::{ModerationEntry, UserEntry};
use crate::platform::PlatformRegistry;

pub const DISCLAIMER: &str = "This list is provided as-is, without warranty of any kind. \
Inclusion of an account in this list reflects the opinion of the list author and is not \
a statement of fact about the person or business behind it. Use it at your own discretion.";

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    pub email: String,
    pub url: String,
}

/// Descriptive fields of a list, used to start a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListMeta {
    pub list_name: String,
    pub author: Author,
    pub list_url: String,
    pub download_url: String,
}

/// Outcome of [`ModerationList::add_block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockInsert {
    Inserted(String),
    Merged(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ListSummary {
    pub list_name: String,
    pub last_updated: DateTime<Utc>,
    pub blocks: usize,
    pub trusts: usize,
    pub recommends: usize,
    pub accounts: usize,
    pub category_counts: BTreeMap<String, usize>,
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// A curated moderation list.
///
/// `blocks` is keyed by [`ModerationEntry::derived_key`]; every stored entry
/// sits under its own current key. Inserting an entry whose key is already
/// present, or which shares a priority-platform account with a stored
/// subject, merges it into the existing entry.
#[derive(Debug, Clone)]
pub struct ModerationList {
    pub list_name: String,
    pub author: Author,
    pub list_url: String,
    pub download_url: String,
    pub disclaimer: String,
    pub(crate) last_updated: DateTime<Utc>,
    pub(crate) categories: BTreeMap<String, String>,
    blocks: BTreeMap<String, ModerationEntry>,
    trusts: Vec<UserEntry>,
    recommends: Vec<UserEntry>,
    /// Priority-platform account → keys of the blocks holding it.
    account_index: HashMap<AccountKey, BTreeSet<String>>,
    registry: PlatformRegistry,
}

impl ModerationList {
    pub fn new(meta: ListMeta, registry: PlatformRegistry) -> Self {
        Self {
            list_name: meta.list_name,
            author: meta.author,
            list_url: meta.list_url,
            download_url: meta.download_url,
            disclaimer: DISCLAIMER.to_string(),
            last_updated: Utc::now(),
            categories: BTreeMap::new(),
            blocks: BTreeMap::new(),
            trusts: Vec::new(),
            recommends: Vec::new(),
            account_index: HashMap::new(),
            registry,
        }
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// Insert or merge by derived key, falling back to a stored subject that
    /// shares a priority-platform account.
    ///
    /// A merge can change the entry's derived key (a new primary or a
    /// smaller handle); the entry then moves to its new key and absorbs
    /// whatever it now matches. No two stored blocks are ever the same
    /// subject, so reloading a saved list reproduces its keys.
    pub fn add_block(&mut self, entry: ModerationEntry) -> BlockInsert {
        let key = entry.derived_key(&self.registry);
        self.touch();
        let slot = if self.blocks.contains_key(&key) {
            Some(key)
        } else {
            self.same_subject(&entry)
        };
        let Some(mut existing) = slot.and_then(|slot| self.take(&slot)) else {
            return BlockInsert::Inserted(self.settle(entry));
        };
        if existing.names_conflict(&entry) {
            warn!(
                existing = %existing.display_name(),
                incoming = %entry.display_name(),
                "merging entries whose names disagree"
            );
        }
        existing.merge(&entry);
        let key = self.settle(existing);
        debug!(key = %key, "merged into existing entry");
        BlockInsert::Merged(key)
    }

    /// Key of a stored block sharing a priority-platform account with
    /// `entry` and describing the same subject.
    fn same_subject(&self, entry: &ModerationEntry) -> Option<String> {
        self.priority_accounts(entry)
            .iter()
            .filter_map(|account| self.account_index.get(account))
            .flatten()
            .find(|slot| {
                self.blocks
                    .get(slot.as_str())
                    .is_some_and(|stored| stored.is_same_subject(entry, &self.registry))
            })
            .cloned()
    }

    /// Store `entry` under its derived key, first folding in the block
    /// already under that key and any other block it is the same subject as.
    fn settle(&mut self, mut entry: ModerationEntry) -> String {
        loop {
            let key = entry.derived_key(&self.registry);
            let absorb = if self.blocks.contains_key(&key) {
                Some(key.clone())
            } else {
                self.same_subject(&entry)
            };
            let Some(mut stored) = absorb.and_then(|slot| self.take(&slot)) else {
                self.store(key.clone(), entry);
                return key;
            };
            debug!(into = %stored.display_name(), "folding blocks that describe one subject");
            stored.merge(&entry);
            entry = stored;
        }
    }

    fn store(&mut self, key: String, entry: ModerationEntry) {
        for account in self.priority_accounts(&entry) {
            self.account_index.entry(account).or_default().insert(key.clone());
        }
        self.blocks.insert(key, entry);
    }

    fn take(&mut self, key: &str) -> Option<ModerationEntry> {
        let entry = self.blocks.remove(key)?;
        for account in self.priority_accounts(&entry) {
            if let Some(slots) = self.account_index.get_mut(&account) {
                slots.remove(key);
                if slots.is_empty() {
                    self.account_index.remove(&account);
                }
            }
        }
        Some(entry)
    }

    fn priority_accounts(&self, entry: &ModerationEntry) -> Vec<AccountKey> {
        let priority = self.registry.priority();
        entry
            .accounts()
            .filter(|a| priority.contains(&a.platform.key))
            .map(|a| a.identity_key())
            .collect()
    }

    pub fn add_trust(&mut self, user: UserEntry) {
        self.trusts.push(user);
        self.touch();
    }

    pub fn add_recommend(&mut self, user: UserEntry) {
        self.recommends.push(user);
        self.touch();
    }

    /// Register a category tag; an existing description is never replaced.
    /// Returns true when the tag is new.
    pub fn add_category(&mut self, tag: &str, description: &str) -> bool {
        if self.categories.contains_key(tag) {
            return false;
        }
        self.categories.insert(tag.to_string(), description.to_string());
        self.touch();
        true
    }

    /// Set (or replace) a category description.
    pub fn describe_category(&mut self, tag: &str, description: &str) {
        self.categories.insert(tag.to_string(), description.to_string());
        self.touch();
    }

    pub fn categories(&self) -> &BTreeMap<String, String> {
        &self.categories
    }

    pub fn blocks(&self) -> &BTreeMap<String, ModerationEntry> {
        &self.blocks
    }

    pub fn block(&self, key: &str) -> Option<&ModerationEntry> {
        self.blocks.get(key)
    }

    pub fn trusts(&self) -> &[UserEntry] {
        &self.trusts
    }

    pub fn recommends(&self) -> &[UserEntry] {
        &self.recommends
    }

    pub fn summary(&self) -> ListSummary {
        let mut category_counts: BTreeMap<String, usize> =
            self.categories.keys().map(|k| (k.clone(), 0)).collect();
        let mut accounts = 0;
        for entry in self.blocks.values() {
            accounts += entry.account_count();
            for category in entry.categories() {
                *category_counts.entry(category.clone()).or_insert(0) += 1;
            }
        }
        ListSummary {
            list_name: self.list_name.clone(),
            last_updated: self.last_updated,
            blocks: self.blocks.len(),
            trusts: self.trusts.len(),
            recommends: self.recommends.len(),
            accounts,
            category_counts,
        }
    }
}
