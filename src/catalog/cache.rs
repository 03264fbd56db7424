use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, error};

use crate::catalog::{CatalogSnapshot, PartnerSource};
use crate::error::SourceError;

struct Cached {
    snapshot: Arc<CatalogSnapshot>,
    fetched_at: Instant,
}

/// Read-through cache of the catalog. A snapshot is replaced wholesale
/// once it is older than `ttl`; callers keep whatever `Arc` they were given.
pub struct SnapshotCache {
    source: Arc<dyn PartnerSource>,
    ttl: Duration,
    current: RwLock<Option<Cached>>,
}

#[derive(Clone)]
pub struct Fetched {
    pub snapshot: Arc<CatalogSnapshot>,
    pub refreshed: bool,
}

impl SnapshotCache {
    pub fn new(source: Arc<dyn PartnerSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            current: RwLock::new(None),
        }
    }

    pub fn snapshot(&self) -> Result<Fetched, SourceError> {
        {
            let guard = self.current.read().unwrap_or_else(|p| p.into_inner());
            if let Some(cached) = guard.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    return Ok(Fetched {
                        snapshot: cached.snapshot.clone(),
                        refreshed: false,
                    });
                }
            }
        }

        let mut guard = self.current.write().unwrap_or_else(|p| p.into_inner());
        // Another caller may have refreshed while we waited for the lock.
        if let Some(cached) = guard.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                return Ok(Fetched {
                    snapshot: cached.snapshot.clone(),
                    refreshed: false,
                });
            }
        }

        let snapshot = Arc::new(self.source.load().inspect_err(|err| {
            error!(error = %err, "catalog refresh failed");
        })?);
        debug!(partners = snapshot.partners.len(), "catalog refreshed");

        *guard = Some(Cached {
            snapshot: snapshot.clone(),
            fetched_at: Instant::now(),
        });

        Ok(Fetched {
            snapshot,
            refreshed: true,
        })
    }

    pub fn invalidate(&self) {
        let mut guard = self.current.write().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }
}
