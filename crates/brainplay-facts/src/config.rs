//! Builds the configured fact lookup.

use std::sync::Arc;

use tracing::warn;

use brainplay_core::config::FactsConfig;
use brainplay_core::traits::FactLookup;

use crate::numbers::NumbersApiLookup;

/// Create the fact lookup described by `config`, or `None` when facts are
/// disabled or the HTTP client cannot be built.
pub fn create_fact_lookup(config: &FactsConfig) -> Option<Arc<dyn FactLookup>> {
    if !config.enabled {
        return None;
    }
    match NumbersApiLookup::new(&config.base_url, config.timeout(), config.max_len) {
        Ok(lookup) => Some(Arc::new(lookup)),
        Err(e) => {
            warn!("fact lookups disabled: {e:#}");
            None
        }
    }
}
