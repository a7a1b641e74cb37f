//! `byomod-modlist`: Moderation list engine.
//!
//! Pure engine crate: turns tabular rows into canonical moderation
//! entries, merges duplicates by derived identity, and (de)serializes
//! whole lists. No CLI or network dependencies.

pub mod account;
pub mod cell;
pub mod columns;
pub mod document;
pub mod entry;
pub mod error;
pub mod ingest;
pub mod list;
pub mod persist;
pub mod platform;
pub mod shared;

pub use account::{AccountKey, AccountStat, SocialAccount};
pub use cell::Cell;
pub use columns::ColumnMap;
pub use entry::{ModerationEntry, UserEntry};
pub use error::ModlistError;
pub use ingest::{ingest_rows, IngestReport, RowIngestor, RowOutcome};
pub use list::{Author, BlockInsert, ListMeta, ListSummary, ModerationList};
pub use platform::{Platform, PlatformRef, PlatformRegistry};
pub use shared::SharedList;
