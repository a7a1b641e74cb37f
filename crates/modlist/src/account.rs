use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};

use crate::error::ModlistError;
use crate::platform::Platform;

/// Status given to accounts whose source does not say otherwise.
pub const DEFAULT_STATUS: &str = "active";

const LEGACY_TWITTER_DOMAIN: &str = "twitter.com";
const TWITTER_DOMAIN: &str = "x.com";

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// One timestamped measurement of an account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountStat {
    pub timestamp: DateTime<Utc>,
    pub followers: Option<u64>,
    pub assets: Option<u64>,
    pub views: Option<u64>,
}

impl AccountStat {
    /// A missing timestamp means "now". At least one measurement is required.
    pub fn new(
        timestamp: Option<DateTime<Utc>>,
        followers: Option<u64>,
        assets: Option<u64>,
        views: Option<u64>,
    ) -> Result<Self, ModlistError> {
        if followers.is_none() && assets.is_none() && views.is_none() {
            return Err(ModlistError::EmptyStat);
        }
        Ok(Self {
            timestamp: timestamp.unwrap_or_else(Utc::now),
            followers,
            assets,
            views,
        })
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Identity of an account: (platform key, handle).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountKey {
    pub platform: String,
    pub handle: String,
}

/// One account on one platform.
///
/// Equality and hashing use [`SocialAccount::identity_key`] only; status,
/// primary flag and stats do not take part.
#[derive(Debug, Clone)]
pub struct SocialAccount {
    pub platform: Platform,
    pub handle: String,
    pub url: String,
    pub status: String,
    pub is_primary: Option<bool>,
    pub last_active: Option<DateTime<Utc>>,
    pub stats: Vec<AccountStat>,
}

impl SocialAccount {
    pub fn new(platform: &Platform, handle: &str, url: &str) -> Self {
        Self {
            platform: platform.clone(),
            handle: handle.trim().to_string(),
            url: normalize_url(url),
            status: DEFAULT_STATUS.to_string(),
            is_primary: None,
            last_active: None,
            stats: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        let status = status.trim();
        self.status = if status.is_empty() { DEFAULT_STATUS.to_string() } else { status.to_string() };
        self
    }

    pub fn with_primary(mut self, is_primary: Option<bool>) -> Self {
        self.is_primary = is_primary;
        self
    }

    pub fn identity_key(&self) -> AccountKey {
        AccountKey {
            platform: self.platform.key.clone(),
            handle: self.handle.clone(),
        }
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary == Some(true)
    }

    pub fn add_stat(&mut self, stat: AccountStat) {
        self.stats.push(stat);
    }
}

impl PartialEq for SocialAccount {
    fn eq(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}

impl Eq for SocialAccount {}

impl Hash for SocialAccount {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity_key().hash(state);
    }
}

/// Strip whitespace and move legacy `twitter.com` links to `x.com`.
pub fn normalize_url(url: &str) -> String {
    url.trim().replace(LEGACY_TWITTER_DOMAIN, TWITTER_DOMAIN)
}

/// Handle embedded in a profile URL: last non-empty path segment, `@` removed.
/// Falls back to the whole URL when it has no usable path.
pub fn handle_from_url(raw: &str) -> String {
    let raw = raw.trim();
    let segment = url::Url::parse(raw).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
    });
    match segment {
        Some(s) => s.trim_start_matches('@').to_string(),
        None => raw.to_string(),
    }
}
