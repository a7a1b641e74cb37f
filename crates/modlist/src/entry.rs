use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::account::{AccountKey, SocialAccount};
use crate::platform::PlatformRegistry;

/// Display name used when an entry carries no name at all.
pub const NO_NAME: &str = "(N/A)";

/// Derived key for entries with neither a priority account nor a name.
pub const UNKNOWN_KEY: &str = "unknown";

pub const DEFAULT_LANGUAGE: &str = "en";

/// Lower-case and remove all whitespace: `" Far Right "` → `"farright"`.
pub fn normalize_tag(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn clean_scalar(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Moderation entry
// ---------------------------------------------------------------------------

/// One person or business and its social presence.
///
/// Set-valued fields are kept normalized: categories, annotations and
/// languages through [`normalize_tag`], URLs by trimming only.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationEntry {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    languages: BTreeSet<String>,
    categories: BTreeSet<String>,
    annotations: BTreeSet<String>,
    urls: BTreeSet<String>,
    accounts: BTreeMap<AccountKey, SocialAccount>,
}

impl Default for ModerationEntry {
    fn default() -> Self {
        Self::new(None, None, None, None)
    }
}

impl ModerationEntry {
    pub fn new(
        first_name: Option<String>,
        last_name: Option<String>,
        business_name: Option<String>,
        business_type: Option<String>,
    ) -> Self {
        Self {
            first_name: clean_scalar(first_name),
            last_name: clean_scalar(last_name),
            business_name: clean_scalar(business_name),
            business_type: clean_scalar(business_type),
            languages: BTreeSet::from([DEFAULT_LANGUAGE.to_string()]),
            categories: BTreeSet::new(),
            annotations: BTreeSet::new(),
            urls: BTreeSet::new(),
            accounts: BTreeMap::new(),
        }
    }

    /// Replace the language set; an empty result falls back to `{"en"}`.
    pub fn set_languages<'a>(&mut self, languages: impl IntoIterator<Item = &'a str>) {
        let set: BTreeSet<String> = languages
            .into_iter()
            .map(normalize_tag)
            .filter(|l| !l.is_empty())
            .collect();
        self.languages = if set.is_empty() {
            BTreeSet::from([DEFAULT_LANGUAGE.to_string()])
        } else {
            set
        };
    }

    pub fn add_category(&mut self, category: &str) -> bool {
        insert_tag(&mut self.categories, category)
    }

    pub fn add_annotation(&mut self, annotation: &str) -> bool {
        insert_tag(&mut self.annotations, annotation)
    }

    pub fn add_url(&mut self, url: &str) -> bool {
        let url = url.trim();
        !url.is_empty() && self.urls.insert(url.to_string())
    }

    /// Add an account unless one with the same identity is present.
    pub fn add_account(&mut self, account: SocialAccount) -> bool {
        let key = account.identity_key();
        if self.accounts.contains_key(&key) {
            return false;
        }
        self.accounts.insert(key, account);
        true
    }

    pub fn languages(&self) -> &BTreeSet<String> {
        &self.languages
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    pub fn annotations(&self) -> &BTreeSet<String> {
        &self.annotations
    }

    pub fn urls(&self) -> &BTreeSet<String> {
        &self.urls
    }

    /// Accounts ordered by (platform, handle).
    pub fn accounts(&self) -> impl Iterator<Item = &SocialAccount> {
        self.accounts.values()
    }

    pub fn account(&self, key: &AccountKey) -> Option<&SocialAccount> {
        self.accounts.get(key)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn accounts_on<'a>(&'a self, platform: &'a str) -> impl Iterator<Item = &'a SocialAccount> + 'a {
        self.accounts.values().filter(move |a| a.platform.key == platform)
    }

    /// "first last", first, last, then the business name, else `(N/A)`.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name, &self.business_name) {
            (Some(first), Some(last), _) => format!("{first} {last}"),
            (Some(first), None, _) => first.clone(),
            (None, Some(last), _) => last.clone(),
            (None, None, Some(business)) => business.clone(),
            (None, None, None) => NO_NAME.to_string(),
        }
    }

    /// The account that identifies this entry: the first priority platform
    /// holding any account, preferring primary accounts, then the smallest
    /// handle.
    pub fn identity_account(&self, registry: &PlatformRegistry) -> Option<&SocialAccount> {
        registry.priority().iter().find_map(|platform| {
            self.accounts
                .values()
                .filter(|a| &a.platform.key == platform)
                .min_by(|a, b| b.is_primary().cmp(&a.is_primary()).then_with(|| a.handle.cmp(&b.handle)))
        })
    }

    /// Key used to detect duplicate subjects across ingestion passes.
    pub fn derived_key(&self, registry: &PlatformRegistry) -> String {
        if let Some(account) = self.identity_account(registry) {
            return format!("{}:{}", account.platform.key, account.handle);
        }
        let name = self.display_name();
        if name != NO_NAME {
            // names compare case-insensitively, so the key does too
            return format!("name:{}", name.to_lowercase());
        }
        UNKNOWN_KEY.to_string()
    }

    /// True when both sides carry a name field and the values differ.
    pub fn names_conflict(&self, other: &ModerationEntry) -> bool {
        let pairs = [
            (&self.first_name, &other.first_name),
            (&self.last_name, &other.last_name),
            (&self.business_name, &other.business_name),
        ];
        pairs.iter().any(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => a.to_lowercase() != b.to_lowercase(),
            _ => false,
        })
    }

    /// Whether two entries describe the same subject.
    ///
    /// Conflicting names always mean different subjects, even when accounts
    /// overlap (shared or impersonation accounts). Otherwise an overlapping
    /// priority-platform account or an equal derived key means the same one.
    pub fn is_same_subject(&self, other: &ModerationEntry, registry: &PlatformRegistry) -> bool {
        if self.names_conflict(other) {
            return false;
        }
        let overlap = registry.priority().iter().any(|platform| {
            self.accounts_on(platform)
                .any(|a| other.accounts.contains_key(&a.identity_key()))
        });
        overlap || self.derived_key(registry) == other.derived_key(registry)
    }

    /// Absorb `other` into `self`.
    ///
    /// Scalars are only filled where `self` has none; set fields are
    /// unioned; accounts already present by identity are kept as they are.
    pub fn merge(&mut self, other: &ModerationEntry) {
        fill(&mut self.first_name, &other.first_name);
        fill(&mut self.last_name, &other.last_name);
        fill(&mut self.business_name, &other.business_name);
        fill(&mut self.business_type, &other.business_type);

        self.languages.extend(other.languages.iter().cloned());
        self.categories.extend(other.categories.iter().cloned());
        self.annotations.extend(other.annotations.iter().cloned());
        self.urls.extend(other.urls.iter().cloned());

        for (key, account) in &other.accounts {
            self.accounts.entry(key.clone()).or_insert_with(|| account.clone());
        }
    }
}

fn insert_tag(set: &mut BTreeSet<String>, raw: &str) -> bool {
    let tag = normalize_tag(raw);
    !tag.is_empty() && set.insert(tag)
}

fn fill(target: &mut Option<String>, source: &Option<String>) {
    if target.is_none() {
        target.clone_from(source);
    }
}

// ---------------------------------------------------------------------------
// Trusted / recommended sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub url: String,
}

impl UserEntry {
    pub fn new(name: &str, email: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            url: url.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    fn registry() -> PlatformRegistry {
        PlatformRegistry::builtin()
    }

    fn account(platform: &str, handle: &str) -> SocialAccount {
        let registry = registry();
        let platform: &Platform = registry.resolve(platform).unwrap();
        SocialAccount::new(platform, handle, &format!("https://example.com/{handle}"))
    }

    fn person(first: &str, last: &str) -> ModerationEntry {
        ModerationEntry::new(Some(first.into()), Some(last.into()), None, None)
    }

    #[test]
    fn tags_are_case_and_space_normalized() {
        let mut entry = ModerationEntry::default();
        assert!(entry.add_category(" Far Right "));
        assert!(!entry.add_category("farright"));
        entry.add_annotation("Journalist");
        entry.add_url("  https://Example.com/Page ");
        assert_eq!(entry.categories().iter().collect::<Vec<_>>(), ["farright"]);
        assert_eq!(entry.annotations().iter().collect::<Vec<_>>(), ["journalist"]);
        assert_eq!(entry.urls().iter().collect::<Vec<_>>(), ["https://Example.com/Page"]);
    }

    #[test]
    fn languages_default_to_english() {
        let mut entry = ModerationEntry::default();
        assert_eq!(entry.languages().iter().collect::<Vec<_>>(), ["en"]);
        entry.set_languages(["NL", " de "]);
        assert_eq!(entry.languages().iter().collect::<Vec<_>>(), ["de", "nl"]);
        entry.set_languages([" "]);
        assert_eq!(entry.languages().iter().collect::<Vec<_>>(), ["en"]);
    }

    #[test]
    fn display_name_precedence() {
        assert_eq!(person("Jane", "Doe").display_name(), "Jane Doe");
        assert_eq!(ModerationEntry::new(Some("Jane".into()), None, None, None).display_name(), "Jane");
        assert_eq!(ModerationEntry::new(None, Some("Doe".into()), None, None).display_name(), "Doe");
        assert_eq!(ModerationEntry::new(None, None, Some("Acme".into()), None).display_name(), "Acme");
        assert_eq!(ModerationEntry::new(Some(" ".into()), None, None, None).display_name(), NO_NAME);
    }

    #[test]
    fn derived_key_prefers_priority_accounts() {
        let registry = registry();
        let mut entry = person("Jane", "Doe");
        entry.add_account(account("rumble", "jane"));
        assert_eq!(entry.derived_key(&registry), "name:jane doe");

        entry.add_account(account("instagram", "jane_ig"));
        assert_eq!(entry.derived_key(&registry), "instagram:jane_ig");

        entry.add_account(account("twitter", "zed"));
        entry.add_account(account("twitter", "alpha"));
        assert_eq!(entry.derived_key(&registry), "twitter:alpha");

        assert_eq!(ModerationEntry::default().derived_key(&registry), UNKNOWN_KEY);
    }

    #[test]
    fn derived_key_prefers_primary_over_handle_order() {
        let registry = registry();
        let mut entry = ModerationEntry::default();
        entry.add_account(account("twitter", "alpha"));
        entry.add_account(account("twitter", "zed").with_primary(Some(true)));
        assert_eq!(entry.derived_key(&registry), "twitter:zed");
    }

    #[test]
    fn name_key_ignores_case() {
        let registry = registry();
        let lower = person("jane", "doe");
        let upper = person("Jane", "DOE");
        assert!(!lower.names_conflict(&upper));
        assert_eq!(lower.derived_key(&registry), upper.derived_key(&registry));
        assert!(lower.is_same_subject(&upper, &registry));
    }

    #[test]
    fn conflicting_names_are_different_subjects() {
        let registry = registry();
        let mut a = person("Jane", "Doe");
        a.add_account(account("twitter", "shared"));
        let mut b = person("John", "Doe");
        b.add_account(account("twitter", "shared"));
        assert!(!a.is_same_subject(&b, &registry));

        let mut c = ModerationEntry::new(Some("jane".into()), None, None, None);
        c.add_account(account("twitter", "shared"));
        assert!(a.is_same_subject(&c, &registry));
    }

    #[test]
    fn merge_fills_blanks_and_unions_sets() {
        let mut a = ModerationEntry::new(Some("Jane".into()), None, None, None);
        a.add_category("extremist");
        a.add_account(account("twitter", "jane").with_status("active"));

        let mut b = ModerationEntry::new(Some("Janet".into()), Some("Doe".into()), None, Some("media".into()));
        b.add_category("antivax");
        b.add_url("https://jane.example");
        b.add_account(account("twitter", "jane").with_status("suspended"));
        b.add_account(account("youtube", "janedoe"));

        a.merge(&b);
        assert_eq!(a.first_name.as_deref(), Some("Jane"));
        assert_eq!(a.last_name.as_deref(), Some("Doe"));
        assert_eq!(a.business_type.as_deref(), Some("media"));
        assert_eq!(a.categories().len(), 2);
        assert_eq!(a.urls().len(), 1);
        assert_eq!(a.account_count(), 2);
        let kept = a
            .account(&AccountKey { platform: "twitter".into(), handle: "jane".into() })
            .unwrap();
        assert_eq!(kept.status, "active");
    }

    #[test]
    fn merge_is_idempotent() {
        let mut a = person("Jane", "Doe");
        a.add_category("x");
        let mut b = ModerationEntry::default();
        b.add_category("y");
        b.add_account(account("gab", "jd"));

        a.merge(&b);
        let once = a.clone();
        a.merge(&b);
        assert_eq!(a, once);
    }
}
