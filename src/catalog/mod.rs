pub mod cache;

use std::path::Path;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, SourceError};
use crate::geo::{PincodeDirectory, PincodeEntry};
use crate::models::partner::PartnerProfile;

/// Immutable view of partner and pincode reference data handed to a
/// single selection call.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    /// Sorted by partner id.
    pub partners: Vec<PartnerProfile>,
    pub directory: PincodeDirectory,
    pub loaded_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    pub fn new(mut partners: Vec<PartnerProfile>, pincodes: Vec<PincodeEntry>) -> Self {
        partners.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            partners,
            directory: PincodeDirectory::new(pincodes),
            loaded_at: Utc::now(),
        }
    }
}

/// Read-mostly store of partner profiles, rate cards and pincode data.
pub trait PartnerSource: Send + Sync {
    fn load(&self) -> Result<CatalogSnapshot, SourceError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub partners: Vec<PartnerProfile>,
    #[serde(default)]
    pub pincodes: Vec<PincodeEntry>,
}

/// In-process partner store backing the admin endpoints.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    pub partners: DashMap<String, PartnerProfile>,
    pub pincodes: DashMap<String, PincodeEntry>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_seed(&self, seed: CatalogSeed) {
        for partner in seed.partners {
            self.partners.insert(partner.id.clone(), partner);
        }
        for entry in seed.pincodes {
            self.pincodes.insert(entry.pincode.clone(), entry);
        }
    }

    pub fn load_seed_file(&self, path: impl AsRef<Path>) -> Result<(), AppError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AppError::Internal(format!("failed to read seed {}: {err}", path.display()))
        })?;
        let seed: CatalogSeed = serde_json::from_str(&raw).map_err(|err| {
            AppError::Internal(format!("invalid seed {}: {err}", path.display()))
        })?;

        tracing::info!(
            path = %path.display(),
            partners = seed.partners.len(),
            pincodes = seed.pincodes.len(),
            "catalog seed loaded"
        );
        self.apply_seed(seed);
        Ok(())
    }
}

impl PartnerSource for InMemoryCatalog {
    fn load(&self) -> Result<CatalogSnapshot, SourceError> {
        let partners = self
            .partners
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        let pincodes = self
            .pincodes
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        Ok(CatalogSnapshot::new(partners, pincodes))
    }
}
