use std::collections::VecDeque;
use std::sync::Mutex;

use dashmap::DashMap;
use uuid::Uuid;

use crate::models::selection::SelectionRecord;

pub const DEFAULT_AUDIT_RETENTION: usize = 10_000;

/// Bounded store of recent selection records. Once `retention` records are
/// held, each new record evicts the oldest one.
pub struct SelectionLog {
    records: DashMap<Uuid, SelectionRecord>,
    order: Mutex<VecDeque<Uuid>>,
    retention: usize,
}

impl SelectionLog {
    pub fn new(retention: usize) -> Self {
        let retention = retention.max(1);
        Self {
            records: DashMap::new(),
            order: Mutex::new(VecDeque::with_capacity(retention.min(1024))),
            retention,
        }
    }

    /// Stores `record`, returning how many old records were evicted.
    pub fn record(&self, record: SelectionRecord) -> usize {
        let mut order = self.order.lock().unwrap_or_else(|p| p.into_inner());
        let id = record.id;
        if self.records.insert(id, record).is_none() {
            order.push_back(id);
        }

        let mut evicted = 0;
        while order.len() > self.retention {
            if let Some(oldest) = order.pop_front() {
                self.records.remove(&oldest);
                evicted += 1;
            }
        }
        evicted
    }

    pub fn get(&self, id: &Uuid) -> Option<SelectionRecord> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Newest first, skipping `offset` records and returning at most `limit`.
    pub fn recent(&self, offset: usize, limit: usize) -> Vec<SelectionRecord> {
        let order = self.order.lock().unwrap_or_else(|p| p.into_inner());
        order
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .filter_map(|id| self.records.get(id).map(|entry| entry.value().clone()))
            .collect()
    }
}
