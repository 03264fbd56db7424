use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::catalog::cache::SnapshotCache;
use crate::catalog::{InMemoryCatalog, PartnerSource};
use crate::engine::audit::{SelectionLog, DEFAULT_AUDIT_RETENTION};
use crate::engine::selector::SelectionPolicy;
use crate::models::selection::SelectionRecord;
use crate::models::shipment::ClientWeights;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub catalog: Arc<InMemoryCatalog>,
    pub cache: SnapshotCache,
    pub policy: SelectionPolicy,
    pub client_weights: DashMap<String, ClientWeights>,
    pub selections: SelectionLog,
    pub selection_events_tx: broadcast::Sender<SelectionRecord>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        catalog: Arc<InMemoryCatalog>,
        catalog_refresh: Duration,
        event_buffer_size: usize,
        policy: SelectionPolicy,
    ) -> Self {
        let source: Arc<dyn PartnerSource> = catalog.clone();
        Self::with_source(catalog, source, catalog_refresh, event_buffer_size, policy)
    }

    /// Selections read from `source`; admin writes still land in `catalog`.
    pub fn with_source(
        catalog: Arc<InMemoryCatalog>,
        source: Arc<dyn PartnerSource>,
        catalog_refresh: Duration,
        event_buffer_size: usize,
        policy: SelectionPolicy,
    ) -> Self {
        let (selection_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            catalog,
            cache: SnapshotCache::new(source, catalog_refresh),
            policy,
            client_weights: DashMap::new(),
            selections: SelectionLog::new(DEFAULT_AUDIT_RETENTION),
            selection_events_tx,
            metrics: Metrics::new(),
        }
    }

    pub fn with_audit_retention(mut self, retention: usize) -> Self {
        self.selections = SelectionLog::new(retention);
        self
    }
}
