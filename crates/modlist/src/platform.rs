use std::collections::HashMap;

use crate::error::ModlistError;

/// Platforms whose accounts identify a subject, in priority order.
pub const DEFAULT_PRIORITY: [&str; 4] = ["twitter", "youtube", "facebook", "instagram"];

/// A social platform: canonical key, display name, home URL and the
/// prefix used to turn a bare handle into a profile URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub key: String,
    pub name: String,
    pub url: String,
    pub profile_prefix: Option<String>,
}

impl Platform {
    pub fn new(key: &str, name: &str, url: &str, profile_prefix: Option<&str>) -> Self {
        Self {
            key: normalize_key(key),
            name: name.to_string(),
            url: url.to_string(),
            profile_prefix: profile_prefix.map(str::to_string),
        }
    }

    /// Profile URL for a bare handle, if this platform has a prefix.
    pub fn profile_url(&self, handle: &str) -> Option<String> {
        self.profile_prefix.as_ref().map(|prefix| format!("{prefix}{handle}"))
    }
}

/// Lower-case and drop all whitespace: `"Truth Social"` → `"truthsocial"`.
pub fn normalize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Anything that names a platform: a key string or a `Platform`.
pub trait PlatformRef {
    fn platform_key(&self) -> String;
}

impl PlatformRef for str {
    fn platform_key(&self) -> String {
        normalize_key(self)
    }
}

impl PlatformRef for String {
    fn platform_key(&self) -> String {
        normalize_key(self)
    }
}

impl PlatformRef for Platform {
    fn platform_key(&self) -> String {
        self.key.clone()
    }
}

/// Explicit lookup table of known platforms.
///
/// Registration order is preserved and is the order in which the ingestor
/// visits platform columns. `priority` lists the platforms consulted (in
/// order) when deriving an entry's identity key.
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    platforms: Vec<Platform>,
    index: HashMap<String, usize>,
    priority: Vec<String>,
}

impl PlatformRegistry {
    /// Build a registry. Priority keys not present among `platforms` are dropped.
    pub fn new(platforms: Vec<Platform>, priority: &[&str]) -> Self {
        let index = platforms
            .iter()
            .enumerate()
            .map(|(i, p)| (p.key.clone(), i))
            .collect::<HashMap<_, _>>();
        let priority = priority
            .iter()
            .map(|k| normalize_key(k))
            .filter(|k| index.contains_key(k))
            .collect();
        Self { platforms, index, priority }
    }

    /// The platforms a moderation list recognizes out of the box.
    pub fn builtin() -> Self {
        let platforms = vec![
            Platform::new("twitter", "Twitter", "https://x.com", Some("https://x.com/")),
            Platform::new("youtube", "YouTube", "https://www.youtube.com", Some("https://www.youtube.com/@")),
            Platform::new("facebook", "Facebook", "https://www.facebook.com", Some("https://www.facebook.com/")),
            Platform::new("instagram", "Instagram", "https://www.instagram.com", Some("https://www.instagram.com/")),
            Platform::new("tiktok", "TikTok", "https://www.tiktok.com", Some("https://www.tiktok.com/@")),
            Platform::new("truthsocial", "Truth Social", "https://truthsocial.com", Some("https://truthsocial.com/@")),
            Platform::new("parler", "Parler", "https://parler.com", Some("https://parler.com/")),
            Platform::new("rumble", "Rumble", "https://rumble.com", Some("https://rumble.com/c/")),
            Platform::new("odysee", "Odysee", "https://odysee.com", Some("https://odysee.com/@")),
            Platform::new("gab", "Gab", "https://gab.com", Some("https://gab.com/")),
            Platform::new("telegram", "Telegram", "https://telegram.org", Some("https://t.me/")),
            Platform::new("bitchute", "BitChute", "https://www.bitchute.com", Some("https://www.bitchute.com/channel/")),
            Platform::new("bsky", "Bluesky", "https://bsky.app", Some("https://bsky.app/profile/")),
            Platform::new("mastodon", "Mastodon", "https://joinmastodon.org", None),
            Platform::new("threads", "Threads", "https://www.threads.net", Some("https://www.threads.net/@")),
            Platform::new("twitch", "Twitch", "https://www.twitch.tv", Some("https://www.twitch.tv/")),
            Platform::new("reddit", "Reddit", "https://www.reddit.com", Some("https://www.reddit.com/user/")),
            Platform::new("discord", "Discord", "https://discord.com", None),
        ];
        Self::new(platforms, &DEFAULT_PRIORITY)
    }

    /// Resolve a key (case/space-insensitive) or platform object.
    /// Unknown platforms are an error, never silently created.
    pub fn resolve<P: PlatformRef + ?Sized>(&self, platform: &P) -> Result<&Platform, ModlistError> {
        let key = platform.platform_key();
        self.index
            .get(&key)
            .map(|&i| &self.platforms[i])
            .ok_or(ModlistError::UnknownPlatform(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(&normalize_key(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn priority(&self) -> &[String] {
        &self.priority
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
