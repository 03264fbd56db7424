use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::partner::Zone;

/// States billed at the special-zone rate (North-East, J&K, islands).
const SPECIAL_ZONE_STATES: &[&str] = &[
    "arunachal pradesh",
    "assam",
    "manipur",
    "meghalaya",
    "mizoram",
    "nagaland",
    "sikkim",
    "tripura",
    "jammu and kashmir",
    "ladakh",
    "andaman and nicobar islands",
    "lakshadweep",
];

pub fn is_valid_pincode(value: &str) -> bool {
    value.len() == 6 && value.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate_pincode(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if is_valid_pincode(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPincode {
            field,
            value: value.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PincodeEntry {
    pub pincode: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub metro: bool,
}

impl PincodeEntry {
    pub fn is_special_zone(&self) -> bool {
        let state = normalize_region(&self.state);
        SPECIAL_ZONE_STATES.contains(&state.as_str())
    }
}

/// Pincode to city/state lookup used for region-level coverage and zoning.
#[derive(Debug, Clone, Default)]
pub struct PincodeDirectory {
    entries: HashMap<String, PincodeEntry>,
}

impl PincodeDirectory {
    pub fn new(entries: impl IntoIterator<Item = PincodeEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.pincode.clone(), entry))
                .collect(),
        }
    }

    pub fn get(&self, pincode: &str) -> Option<&PincodeEntry> {
        self.entries.get(pincode)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Case- and whitespace-insensitive key for city and state names.
pub fn normalize_region(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Zone for an origin/destination pair. Falls back to the postal-circle
/// digits of the pincodes when either end is missing from the directory.
pub fn resolve_zone(origin: &str, destination: &str, directory: &PincodeDirectory) -> Zone {
    match (directory.get(origin), directory.get(destination)) {
        (Some(from), Some(to)) => {
            if from.is_special_zone() || to.is_special_zone() {
                Zone::Special
            } else if normalize_region(&from.city) == normalize_region(&to.city) {
                Zone::Local
            } else if normalize_region(&from.state) == normalize_region(&to.state) {
                Zone::Regional
            } else if from.metro && to.metro {
                Zone::Metro
            } else {
                Zone::National
            }
        }
        _ => {
            if shared_prefix(origin, destination, 3) {
                Zone::Local
            } else if shared_prefix(origin, destination, 2) {
                Zone::Regional
            } else {
                Zone::National
            }
        }
    }
}

fn shared_prefix(a: &str, b: &str, len: usize) -> bool {
    match (a.get(..len), b.get(..len)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
