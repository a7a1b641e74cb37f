// Application settings
// Loaded from ~/.config/byomod/settings.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const TBD: &str = "TBD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Metadata given to a list created from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListSettings {
    pub name: String,
    pub author_name: String,
    pub author_email: String,
    pub author_url: String,
    pub list_url: String,
    pub download_url: String,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            name: TBD.into(),
            author_name: TBD.into(),
            author_email: TBD.into(),
            author_url: TBD.into(),
            list_url: TBD.into(),
            download_url: TBD.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Worksheet to read; unset = first sheet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,

    /// CSV delimiter override (";" or "tab"); unset = sniff
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

impl ImportSettings {
    /// The delimiter as a byte, if one is configured and usable.
    pub fn delimiter_byte(&self) -> Option<u8> {
        self.delimiter.as_deref().and_then(parse_delimiter)
    }
}

/// Parse a delimiter spelling: a single ASCII character, `tab`, or `\t`.
pub fn parse_delimiter(raw: &str) -> Option<u8> {
    match raw {
        "tab" | "\\t" | "\t" => Some(b'\t'),
        s if s.len() == 1 && s.is_ascii() => s.bytes().next(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListsSettings {
    /// Where fetched list files are cached
    pub cache_dir: PathBuf,
}

impl Default for ListsSettings {
    fn default() -> Self {
        Self {
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("byomod")
                .join("lists"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// tracing EnvFilter directive, used when RUST_LOG is unset
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { filter: "info".into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub list: ListSettings,
    pub import: ImportSettings,
    pub lists: ListsSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("byomod");
        config_dir.join("settings.toml")
    }

    /// Load the settings file at [`Settings::config_path`], falling back to
    /// defaults. See [`Settings::load_or_default`].
    pub fn load() -> (Self, Option<ConfigError>) {
        Self::load_or_default(&Self::config_path())
    }

    /// Load `path`, or defaults when it is missing or broken.
    ///
    /// A broken file's error is handed back so the caller can warn once its
    /// logging is set up.
    pub fn load_or_default(path: &Path) -> (Self, Option<ConfigError>) {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return (Self::default(), None);
        }
        match Self::load_from(path) {
            Ok(settings) => (settings, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load settings from an explicit file. Missing keys take their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save current settings to `path`, creating its directory
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.list.name, "TBD");
        assert_eq!(settings.list.download_url, "TBD");
        assert_eq!(settings.logging.filter, "info");
        assert!(settings.import.sheet.is_none());
        assert!(settings.lists.cache_dir.ends_with("lists"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "[list]\nname = \"Community blocks\"\n\n[import]\ndelimiter = \"tab\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.list.name, "Community blocks");
        assert_eq!(settings.list.author_name, "TBD");
        assert_eq!(settings.import.delimiter_byte(), Some(b'\t'));
        assert_eq!(settings.logging, LoggingSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.import.sheet = Some("Blocks".into());
        settings.logging.filter = "byomod_modlist=debug".into();
        settings.save(&path).unwrap();

        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[list\nname = ").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(ConfigError::Parse { .. })));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Settings::load_from(&missing), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();

        let (settings, error) = Settings::load_or_default(&dir.path().join("missing.toml"));
        assert_eq!(settings, Settings::default());
        assert!(error.is_none());

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[logging
").unwrap();
        let (settings, error) = Settings::load_or_default(&broken);
        assert_eq!(settings, Settings::default());
        assert!(matches!(error, Some(ConfigError::Parse { .. })));

        let valid = dir.path().join("valid.toml");
        fs::write(&valid, "[logging]\nfilter = \"warn\"\n").unwrap();
        let (settings, error) = Settings::load_or_default(&valid);
        assert_eq!(settings.logging.filter, "warn");
        assert!(error.is_none());
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(";"), Some(b';'));
        assert_eq!(parse_delimiter("\\t"), Some(b'\t'));
        assert_eq!(parse_delimiter("tab"), Some(b'\t'));
        assert_eq!(parse_delimiter(";;"), None);
        assert_eq!(parse_delimiter("é"), None);
    }
}
