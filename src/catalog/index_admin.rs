use super::state::QueryCatalog;
use crate::errors::Result;
use crate::index::{IndexHandle, IndexStatsSnapshot};
use crate::types::Order;

impl QueryCatalog {
    // --- Index admin helpers ---

    /// Registers an ordered index over `fields` and builds it from the current records.
    /// Asking for an index that already exists returns its handle unchanged.
    ///
    /// # Errors
    /// `CatalogError::InvalidField` for unknown names, `CatalogError::Query` for an empty or
    /// repeating field list.
    pub fn create_index(&self, fields: &[(&str, Order)]) -> Result<IndexHandle> {
        let handle = IndexHandle::from_spec(fields)?;
        let mut st = self.state.write();
        let st = &mut *st;
        let built = st.indexes.create(handle.clone(), st.records.iter().map(|(id, b)| (*id, b)));
        if built {
            log::info!("created index {} on {}", handle.name, self.name());
        } else {
            log::debug!("index {} already exists on {}", handle.name, self.name());
        }
        Ok(handle)
    }

    pub fn drop_index(&self, name: &str) -> bool {
        let dropped = self.state.write().indexes.drop_index(name);
        if dropped {
            log::info!("dropped index {name} on {}", self.name());
        }
        dropped
    }

    #[must_use]
    pub fn list_indexes(&self) -> Vec<IndexHandle> {
        self.state.read().indexes.handles()
    }

    #[must_use]
    pub fn index_stats(&self, name: &str) -> Option<IndexStatsSnapshot> {
        self.state.read().indexes.get(name).map(|i| i.stats.snapshot())
    }
}
