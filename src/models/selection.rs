use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::partner::Zone;
use crate::models::shipment::{ClientWeights, ShipmentRequest};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub cost_score: f64,
    pub speed_score: f64,
    pub reliability_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub partner_id: String,
    pub partner_name: String,
    pub cost: f64,
    pub eta_hours: f64,
    pub reliability: f64,
    pub breakdown: ScoreBreakdown,
    pub score: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSource {
    Request,
    Client,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    Inactive,
    OriginNotCovered,
    DestinationNotCovered,
    CodUnsupported,
    OverweightLimit,
    RateNotFound,
    InvalidPartnerData,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::Inactive => "inactive",
            ExclusionReason::OriginNotCovered => "origin_not_covered",
            ExclusionReason::DestinationNotCovered => "destination_not_covered",
            ExclusionReason::CodUnsupported => "cod_unsupported",
            ExclusionReason::OverweightLimit => "overweight_limit",
            ExclusionReason::RateNotFound => "rate_not_found",
            ExclusionReason::InvalidPartnerData => "invalid_partner_data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exclusion {
    pub partner_id: String,
    pub reasons: Vec<ExclusionReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub winner: ScoredCandidate,
    pub candidates: Vec<ScoredCandidate>,
    pub weights: ClientWeights,
    pub weight_source: WeightSource,
    pub chargeable_weight_kg: f64,
    pub zone: Zone,
    pub excluded: Vec<Exclusion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoService {
    pub weights: ClientWeights,
    pub weight_source: WeightSource,
    pub chargeable_weight_kg: f64,
    pub zone: Zone,
    pub excluded: Vec<Exclusion>,
}

/// Result of a selection call. "No partner serves this route" is a normal
/// business outcome, kept apart from `SelectionError`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SelectionOutcome {
    Selected(Selection),
    NoService(NoService),
}

impl SelectionOutcome {
    pub fn winner(&self) -> Option<&ScoredCandidate> {
        match self {
            SelectionOutcome::Selected(selection) => Some(&selection.winner),
            SelectionOutcome::NoService(_) => None,
        }
    }

    pub fn excluded(&self) -> &[Exclusion] {
        match self {
            SelectionOutcome::Selected(selection) => &selection.excluded,
            SelectionOutcome::NoService(no_service) => &no_service.excluded,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SelectionOutcome::Selected(_) => "selected",
            SelectionOutcome::NoService(_) => "no_service",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRecord {
    pub id: Uuid,
    pub request: ShipmentRequest,
    pub outcome: SelectionOutcome,
    pub selected_at: DateTime<Utc>,
}
