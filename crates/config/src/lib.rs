// Configuration loading

pub mod settings;

pub use settings::{parse_delimiter, ConfigError, ImportSettings, ListSettings, ListsSettings, LoggingSettings, Settings};
