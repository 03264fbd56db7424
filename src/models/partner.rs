use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Billing zone of an origin/destination pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Local,
    Regional,
    Metro,
    National,
    Special,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Local => "local",
            Zone::Regional => "regional",
            Zone::Metro => "metro",
            Zone::National => "national",
            Zone::Special => "special",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weight bracket: any chargeable weight up to `up_to_kg` (inclusive)
/// is billed at the zone's flat price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSlab {
    pub up_to_kg: f64,
    pub rates: HashMap<Zone, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodFee {
    pub flat: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateCard {
    pub slabs: Vec<RateSlab>,
    #[serde(default)]
    pub cod: CodFee,
}

/// Inclusive numeric pincode range, e.g. 400001..=400104.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PincodeRange {
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSet {
    #[serde(default)]
    pub pincodes: BTreeSet<String>,
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub ranges: Vec<PincodeRange>,
    #[serde(default)]
    pub cities: BTreeSet<String>,
    #[serde(default)]
    pub states: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub pickup: CoverageSet,
    /// Falls back to `pickup` when the partner does not distinguish the two.
    #[serde(default)]
    pub delivery: Option<CoverageSet>,
}

impl Coverage {
    pub fn delivery_set(&self) -> &CoverageSet {
        self.delivery.as_ref().unwrap_or(&self.pickup)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerProfile {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub supports_cod: bool,
    pub rate_card: RateCard,
    pub coverage: Coverage,
    pub reliability: f64,
    pub avg_transit_hours: f64,
    #[serde(default)]
    pub zone_transit_hours: HashMap<Zone, f64>,
    pub max_weight_kg: f64,
    #[serde(default)]
    pub daily_capacity: Option<u32>,
    pub updated_at: DateTime<Utc>,
}

impl PartnerProfile {
    /// Expected door-to-door transit for a zone, preferring a zone override.
    pub fn transit_hours(&self, zone: Zone) -> f64 {
        self.zone_transit_hours
            .get(&zone)
            .copied()
            .unwrap_or(self.avg_transit_hours)
    }
}
