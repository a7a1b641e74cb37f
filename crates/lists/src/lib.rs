//! List-of-lists aggregator.
//!
//! A list-of-lists is a JSON index of published moderation lists. This crate
//! downloads each referenced list into a local cache and refreshes the
//! counters the index carries for it.
//!
//! No CLI concepts. Fetch failures are per list and never abort a batch.

mod catalog;
mod error;
mod fetch;
mod refresh;

pub use catalog::{ListOfLists, ListRef, COUNTER_BLOCKS, COUNTER_CATEGORIES, COUNTER_RECOMMENDS, COUNTER_TRUSTS};
pub use error::ListsError;
pub use fetch::{HttpFetcher, ListFetcher};
pub use refresh::{cache_id, cache_path, refresh, RefreshReport};
