// Structured document form of a moderation list.
//
// Layout (top-level sections):
//   meta            list metadata + category glossary
//   block_list      moderation entries
//   trust_list      trusted sources
//   recommend_list  recommended sources

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::{AccountStat, SocialAccount, DEFAULT_STATUS};
use crate::entry::{ModerationEntry, UserEntry};
use crate::error::ModlistError;
use crate::list::{Author, ListMeta, ModerationList};
use crate::platform::PlatformRegistry;

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDocument {
    pub meta: MetaDocument,
    #[serde(default)]
    pub block_list: Vec<EntryDocument>,
    #[serde(default)]
    pub trust_list: Vec<UserEntry>,
    #[serde(default)]
    pub recommend_list: Vec<UserEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaDocument {
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub list_name: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub author_url: String,
    #[serde(default)]
    pub list_url: String,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub disclaimer: String,
    #[serde(default)]
    pub categories: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryDocument {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub social_accounts: Vec<AccountDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountDocument {
    pub platform: String,
    pub handle: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_primary: Option<bool>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, with = "last_active_format")]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stats: Vec<StatDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatDocument {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub followers: Option<u64>,
    #[serde(default)]
    pub assets: Option<u64>,
    #[serde(default)]
    pub views: Option<u64>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// `last_active` is written as `"unknown"` when absent; `"unknown"`, null
/// or a missing key all read back as None.
mod last_active_format {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const UNKNOWN: &str = "unknown";

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_str(UNKNOWN),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") | Some(UNKNOWN) => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(s)
                .map(|ts| Some(ts.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}

// ---------------------------------------------------------------------------
// Model → document
// ---------------------------------------------------------------------------

impl From<&AccountStat> for StatDocument {
    fn from(stat: &AccountStat) -> Self {
        Self {
            timestamp: Some(stat.timestamp),
            followers: stat.followers,
            assets: stat.assets,
            views: stat.views,
        }
    }
}

impl From<&SocialAccount> for AccountDocument {
    fn from(account: &SocialAccount) -> Self {
        Self {
            platform: account.platform.key.clone(),
            handle: account.handle.clone(),
            url: account.url.clone(),
            is_primary: account.is_primary,
            status: account.status.clone(),
            last_active: account.last_active,
            stats: account.stats.iter().map(StatDocument::from).collect(),
        }
    }
}

impl From<&ModerationEntry> for EntryDocument {
    fn from(entry: &ModerationEntry) -> Self {
        Self {
            first_name: entry.first_name.clone(),
            last_name: entry.last_name.clone(),
            business_name: entry.business_name.clone(),
            business_type: entry.business_type.clone(),
            urls: entry.urls().iter().cloned().collect(),
            categories: entry.categories().iter().cloned().collect(),
            annotations: entry.annotations().iter().cloned().collect(),
            languages: entry.languages().iter().cloned().collect(),
            social_accounts: entry.accounts().map(AccountDocument::from).collect(),
        }
    }
}

impl ModerationList {
    pub fn as_document(&self) -> ListDocument {
        ListDocument {
            meta: MetaDocument {
                last_updated: Some(self.last_updated),
                list_name: self.list_name.clone(),
                author_name: self.author.name.clone(),
                author_email: self.author.email.clone(),
                author_url: self.author.url.clone(),
                list_url: self.list_url.clone(),
                download_url: self.download_url.clone(),
                disclaimer: self.disclaimer.clone(),
                categories: self
                    .categories
                    .iter()
                    .map(|(k, v)| (k.clone(), Some(v.clone())))
                    .collect(),
            },
            block_list: self.blocks().values().map(EntryDocument::from).collect(),
            trust_list: self.trusts().to_vec(),
            recommend_list: self.recommends().to_vec(),
        }
    }

    /// Rebuild a list by replaying every item through `add_block`,
    /// `add_trust` and `add_recommend`. Entries sharing a derived key are
    /// merged on the way in.
    pub fn from_document(doc: &ListDocument, registry: PlatformRegistry) -> Result<Self, ModlistError> {
        let meta = ListMeta {
            list_name: doc.meta.list_name.clone(),
            author: Author {
                name: doc.meta.author_name.clone(),
                email: doc.meta.author_email.clone(),
                url: doc.meta.author_url.clone(),
            },
            list_url: doc.meta.list_url.clone(),
            download_url: doc.meta.download_url.clone(),
        };
        let mut list = ModerationList::new(meta, registry);
        if !doc.meta.disclaimer.is_empty() {
            list.disclaimer = doc.meta.disclaimer.clone();
        }
        for (tag, description) in &doc.meta.categories {
            list.describe_category(tag, description.as_deref().unwrap_or_default());
        }

        for item in &doc.block_list {
            let entry = entry_from_document(item, list.registry())?;
            list.add_block(entry);
        }
        for user in &doc.trust_list {
            list.add_trust(user.clone());
        }
        for user in &doc.recommend_list {
            list.add_recommend(user.clone());
        }

        if let Some(ts) = doc.meta.last_updated {
            list.last_updated = ts;
        }
        Ok(list)
    }
}

fn entry_from_document(doc: &EntryDocument, registry: &PlatformRegistry) -> Result<ModerationEntry, ModlistError> {
    let mut entry = ModerationEntry::new(
        doc.first_name.clone(),
        doc.last_name.clone(),
        doc.business_name.clone(),
        doc.business_type.clone(),
    );
    entry.set_languages(doc.languages.iter().map(String::as_str));
    for category in &doc.categories {
        entry.add_category(category);
    }
    for annotation in &doc.annotations {
        entry.add_annotation(annotation);
    }
    for url in &doc.urls {
        entry.add_url(url);
    }
    for account in &doc.social_accounts {
        entry.add_account(account_from_document(account, registry)?);
    }
    Ok(entry)
}

fn account_from_document(doc: &AccountDocument, registry: &PlatformRegistry) -> Result<SocialAccount, ModlistError> {
    let platform = registry.resolve(doc.platform.as_str())?;
    let url = if doc.url.trim().is_empty() {
        platform.profile_url(&doc.handle).unwrap_or_default()
    } else {
        doc.url.clone()
    };
    let mut account = SocialAccount::new(platform, &doc.handle, &url)
        .with_status(&doc.status)
        .with_primary(doc.is_primary);
    account.last_active = doc.last_active;
    for stat in &doc.stats {
        account.add_stat(AccountStat::new(stat.timestamp, stat.followers, stat.assets, stat.views)?);
    }
    Ok(account)
}
