use std::sync::Arc;

use parking_lot::Mutex;

use crate::cell::Cell;
use crate::entry::ModerationEntry;
use crate::ingest::{ingest_rows, IngestReport};
use crate::list::{BlockInsert, ModerationList};

/// A moderation list shared between ingesting threads.
///
/// Every insertion holds the single list lock across the whole
/// lookup-merge-insert, so concurrent merges on one key cannot interleave.
#[derive(Debug, Clone)]
pub struct SharedList {
    inner: Arc<Mutex<ModerationList>>,
}

impl SharedList {
    pub fn new(list: ModerationList) -> Self {
        Self { inner: Arc::new(Mutex::new(list)) }
    }

    pub fn add_block(&self, entry: ModerationEntry) -> BlockInsert {
        self.inner.lock().add_block(entry)
    }

    /// Ingest a whole source under one lock acquisition.
    pub fn ingest_rows<I>(&self, rows: I) -> IngestReport
    where
        I: IntoIterator<Item = Vec<Cell>>,
    {
        let mut list = self.inner.lock();
        ingest_rows(rows, &mut list)
    }

    /// Run `f` with exclusive access to the list.
    pub fn with<R>(&self, f: impl FnOnce(&mut ModerationList) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Take the list back once all other handles are gone.
    pub fn into_inner(self) -> Result<ModerationList, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
