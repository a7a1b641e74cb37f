//! The list-of-lists document.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ListsError;

pub const COUNTER_BLOCKS: &str = "blocks";
pub const COUNTER_TRUSTS: &str = "trusts";
pub const COUNTER_RECOMMENDS: &str = "recommends";
pub const COUNTER_CATEGORIES: &str = "categories";

/// One published list referenced by the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRef {
    pub name: String,
    /// Landing page of the list
    pub url: String,
    /// Direct link to the YAML file, when it differs from `url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub counters: BTreeMap<String, u64>,
}

impl ListRef {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            download_url: None,
            last_updated: None,
            counters: BTreeMap::new(),
        }
    }

    /// URL the list file is downloaded from.
    pub fn fetch_url(&self) -> &str {
        self.download_url.as_deref().filter(|u| !u.trim().is_empty()).unwrap_or(&self.url)
    }

    pub fn counter(&self, name: &str) -> Option<u64> {
        self.counters.get(name).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListOfLists {
    #[serde(default)]
    pub lists: Vec<ListRef>,
}

impl ListOfLists {
    pub fn from_json(text: &str) -> Result<Self, ListsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ListsError> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }

    pub fn load(path: &Path) -> Result<Self, ListsError> {
        let text = fs::read_to_string(path).map_err(|e| ListsError::io(path, e))?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: &Path) -> Result<(), ListsError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ListsError::io(parent, e))?;
        }
        fs::write(path, self.to_json()?).map_err(|e| ListsError::io(path, e))
    }
}
