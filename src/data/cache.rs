use std::path::Path;
use std::sync::{Arc, OnceLock};

use anyhow::Result;

use super::loader::load_file;
use super::model::JobTable;

/// Load-once holder for the listing table. The first successful load is kept
/// for the lifetime of the cache; later calls return the same `Arc` without
/// touching the source again.
#[derive(Debug, Default)]
pub struct ListingCache {
    cell: OnceLock<Arc<JobTable>>,
}

impl ListingCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Return the cached table, running `load` only if nothing is cached yet.
    /// A failed load leaves the cache empty.
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<JobTable>>
    where
        F: FnOnce() -> Result<JobTable>,
    {
        if let Some(table) = self.cell.get() {
            log::debug!("Serving cached job table ({} listings)", table.len());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load()?);
        Ok(Arc::clone(self.cell.get_or_init(|| table)))
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

static LISTINGS: ListingCache = ListingCache::new();

/// Process-wide cached load. Only the first call reads `path`; every later
/// call gets the table from that first load, whatever path it passes.
pub fn listings(path: &Path) -> Result<Arc<JobTable>> {
    LISTINGS.get_or_load(|| load_file(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::data::model::{ColumnPresence, JobListing};

    fn one_listing() -> JobTable {
        JobTable::from_listings(
            vec![JobListing {
                title: Some("Data Engineer".into()),
                company: Some("A".into()),
                ..Default::default()
            }],
            ColumnPresence::ALL,
        )
    }

    #[test]
    fn test_loader_runs_once() {
        let cache = ListingCache::new();
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Ok(one_listing())
        };

        let first = cache.get_or_load(load).unwrap();
        let second = cache.get_or_load(load).unwrap();
        let third = cache.get_or_load(|| anyhow::bail!("source should not be read again")).unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache = ListingCache::new();
        assert!(cache.get_or_load(|| anyhow::bail!("unreachable")).is_err());
        assert!(!cache.is_loaded());
        assert_eq!(cache.get_or_load(|| Ok(one_listing())).unwrap().len(), 1);
    }
}
