use tracing::{debug, warn};

use crate::catalog::CatalogSnapshot;
use crate::engine::rate::estimate_cost;
use crate::engine::scoring::{assign_ranks, normalize_weights, score_candidates, tie_break, CandidateInput};
use crate::engine::serviceability::{check_serviceability, validate_coverage};
use crate::engine::weight::chargeable_weight_for;
use crate::error::{PartnerDataError, SelectionError, ValidationError};
use crate::geo::{resolve_zone, validate_pincode};
use crate::models::partner::{PartnerProfile, Zone};
use crate::models::selection::{
    Exclusion, ExclusionReason, NoService, ScoredCandidate, Selection, SelectionOutcome,
    WeightSource,
};
use crate::models::shipment::{ClientWeights, ShipmentRequest};

pub const DEFAULT_TIE_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPolicy {
    pub default_weights: ClientWeights,
    /// Candidates this close to the top score are ordered by the tie-break.
    pub tie_epsilon: f64,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            default_weights: ClientWeights::default(),
            tie_epsilon: DEFAULT_TIE_EPSILON,
        }
    }
}

/// Everything a selection call reads besides the request itself.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub snapshot: &'a CatalogSnapshot,
    pub policy: &'a SelectionPolicy,
    /// Stored preference of the requesting client, if any.
    pub client_weights: Option<ClientWeights>,
}

impl<'a> SelectionContext<'a> {
    pub fn new(snapshot: &'a CatalogSnapshot, policy: &'a SelectionPolicy) -> Self {
        Self {
            snapshot,
            policy,
            client_weights: None,
        }
    }

    pub fn with_client_weights(mut self, weights: Option<ClientWeights>) -> Self {
        self.client_weights = weights;
        self
    }
}

pub fn select_optimal_partner(
    request: &ShipmentRequest,
    ctx: &SelectionContext<'_>,
) -> Result<SelectionOutcome, SelectionError> {
    validate_request(request)?;

    let chargeable_weight_kg =
        chargeable_weight_for(request.weight_kg, request.dimensions.as_ref())
            .map_err(ValidationError::from)?;
    let (raw_weights, weight_source) = resolve_weights(request, ctx);
    let weights = normalize_weights(&raw_weights);
    let zone = resolve_zone(
        &request.origin_pincode,
        &request.destination_pincode,
        &ctx.snapshot.directory,
    );

    let mut excluded = Vec::new();
    let mut inputs = Vec::new();

    for partner in &ctx.snapshot.partners {
        match evaluate_partner(partner, request, chargeable_weight_kg, zone, ctx) {
            Ok(input) => inputs.push(input),
            Err(exclusion) => excluded.push(exclusion),
        }
    }

    if inputs.is_empty() {
        debug!(
            origin = %request.origin_pincode,
            destination = %request.destination_pincode,
            excluded = excluded.len(),
            "no partner serves shipment"
        );
        return Ok(SelectionOutcome::NoService(NoService {
            weights,
            weight_source,
            chargeable_weight_kg,
            zone,
            excluded,
        }));
    }

    let mut candidates = score_candidates(&inputs, &weights);
    break_ties(&mut candidates, ctx.policy.tie_epsilon);

    let winner = candidates[0].clone();

    Ok(SelectionOutcome::Selected(Selection {
        winner,
        candidates,
        weights,
        weight_source,
        chargeable_weight_kg,
        zone,
        excluded,
    }))
}

pub fn validate_request(request: &ShipmentRequest) -> Result<(), ValidationError> {
    validate_pincode("originPincode", &request.origin_pincode)?;
    validate_pincode("destinationPincode", &request.destination_pincode)?;

    if !request.weight_kg.is_finite() || request.weight_kg <= 0.0 {
        return Err(ValidationError::NonPositiveWeight(request.weight_kg));
    }

    if let Some(dimensions) = &request.dimensions {
        for (field, value) in [
            ("lengthCm", dimensions.length_cm),
            ("widthCm", dimensions.width_cm),
            ("heightCm", dimensions.height_cm),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ValidationError::InvalidDimension { field, value });
                }
            }
        }
    }

    if !request.cod_amount.is_finite() || request.cod_amount < 0.0 {
        return Err(ValidationError::InvalidCodAmount(request.cod_amount));
    }

    if let Some(weights) = &request.client_weights {
        validate_weights(weights)?;
    }

    Ok(())
}

pub fn validate_weights(weights: &ClientWeights) -> Result<(), ValidationError> {
    for (field, value) in [
        ("cost", weights.cost),
        ("speed", weights.speed),
        ("reliability", weights.reliability),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::WeightPreferenceOutOfRange { field, value });
        }
    }
    Ok(())
}

fn resolve_weights(
    request: &ShipmentRequest,
    ctx: &SelectionContext<'_>,
) -> (ClientWeights, WeightSource) {
    if let Some(weights) = request.client_weights {
        (weights, WeightSource::Request)
    } else if let Some(weights) = ctx.client_weights {
        (weights, WeightSource::Client)
    } else {
        (ctx.policy.default_weights, WeightSource::Default)
    }
}

fn evaluate_partner(
    partner: &PartnerProfile,
    request: &ShipmentRequest,
    chargeable_weight_kg: f64,
    zone: Zone,
    ctx: &SelectionContext<'_>,
) -> Result<CandidateInput, Exclusion> {
    if let Err(err) = validate_coverage(partner) {
        return Err(partner_data_exclusion(partner, ExclusionReason::InvalidPartnerData, err));
    }

    if let Err(reasons) = check_serviceability(
        partner,
        &request.origin_pincode,
        &request.destination_pincode,
        chargeable_weight_kg,
        request.is_cod,
        &ctx.snapshot.directory,
    ) {
        debug!(partner_id = %partner.id, ?reasons, "partner not serviceable");
        return Err(Exclusion {
            partner_id: partner.id.clone(),
            reasons,
            detail: None,
        });
    }

    let estimate = estimate_cost(
        partner,
        chargeable_weight_kg,
        zone,
        request.is_cod,
        request.cod_amount,
    )
    .map_err(|err| {
        let reason = match err {
            PartnerDataError::RateNotFound { .. } => ExclusionReason::RateNotFound,
            _ => ExclusionReason::InvalidPartnerData,
        };
        partner_data_exclusion(partner, reason, err)
    })?;

    if !estimate.total.is_finite() {
        let err = PartnerDataError::NonFiniteCost {
            partner_id: partner.id.clone(),
            value: estimate.total,
        };
        return Err(partner_data_exclusion(partner, ExclusionReason::InvalidPartnerData, err));
    }

    let eta_hours = partner.transit_hours(zone);
    if !eta_hours.is_finite() || eta_hours <= 0.0 {
        let err = PartnerDataError::InvalidTransitTime {
            partner_id: partner.id.clone(),
            value: eta_hours,
        };
        return Err(partner_data_exclusion(partner, ExclusionReason::InvalidPartnerData, err));
    }

    if !(0.0..=1.0).contains(&partner.reliability) {
        let err = PartnerDataError::InvalidReliability {
            partner_id: partner.id.clone(),
            value: partner.reliability,
        };
        return Err(partner_data_exclusion(partner, ExclusionReason::InvalidPartnerData, err));
    }

    Ok(CandidateInput {
        partner_id: partner.id.clone(),
        partner_name: partner.name.clone(),
        cost: estimate.total,
        eta_hours,
        reliability: partner.reliability,
    })
}

fn partner_data_exclusion(
    partner: &PartnerProfile,
    reason: ExclusionReason,
    err: PartnerDataError,
) -> Exclusion {
    warn!(partner_id = %partner.id, error = %err, "partner excluded");
    Exclusion {
        partner_id: partner.id.clone(),
        reasons: vec![reason],
        detail: Some(err.to_string()),
    }
}

/// Reorders the near-top group by cost, ETA and id, then re-ranks.
fn break_ties(candidates: &mut [ScoredCandidate], epsilon: f64) {
    let Some(top) = candidates.first().map(|c| c.score) else {
        return;
    };

    let group = candidates
        .iter()
        .take_while(|c| top - c.score <= epsilon)
        .count();
    candidates[..group].sort_by(tie_break);
    assign_ranks(candidates);
}
