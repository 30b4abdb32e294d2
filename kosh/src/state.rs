//! Application state management

use crate::collation::{hindi_locale, HindiCollator};
use crate::config::Config;
use crate::error::Result;
use crate::listing::{ListingDefaults, ListingService};
use crate::store::KoshStore;
use std::sync::Arc;

/// Shared state: the store, the collator built once from the configured table, and the listing service
pub struct AppState {
    pub store: KoshStore,
    pub listing: ListingService,
    pub defaults: ListingDefaults,
}

impl AppState {
    /// Initialize application state
    pub fn new(config: &Config) -> Result<Self> {
        let store = KoshStore::open(config.db_path.clone())?;

        let table = Arc::new(config.load_alphabet()?);
        tracing::info!("Loaded alphabet table with {} entries", table.len());
        let collator = HindiCollator::new(table, Arc::new(hindi_locale()?));

        Ok(Self {
            listing: ListingService::new(store.clone(), collator),
            store,
            defaults: config.listing,
        })
    }
}
