use serde::{Deserialize, Serialize};

use crate::error::PartnerDataError;
use crate::models::partner::{CodFee, PartnerProfile, RateCard, Zone};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    /// Upper bound of the slab the weight was rounded up to.
    pub billed_weight_kg: f64,
    pub freight: f64,
    pub cod_fee: f64,
    pub total: f64,
}

pub fn estimate_cost(
    partner: &PartnerProfile,
    chargeable_weight_kg: f64,
    zone: Zone,
    is_cod: bool,
    cod_amount: f64,
) -> Result<CostEstimate, PartnerDataError> {
    validate_rate_card(&partner.id, &partner.rate_card)?;

    // Slabs are ascending, so the first one that fits is the round-up slab.
    let slab = partner
        .rate_card
        .slabs
        .iter()
        .find(|slab| slab.up_to_kg >= chargeable_weight_kg)
        .ok_or_else(|| rate_not_found(partner, chargeable_weight_kg, zone))?;

    let freight = slab
        .rates
        .get(&zone)
        .copied()
        .ok_or_else(|| rate_not_found(partner, chargeable_weight_kg, zone))?;

    let cod_fee = if is_cod {
        cod_fee(&partner.rate_card.cod, cod_amount)
    } else {
        0.0
    };

    Ok(CostEstimate {
        billed_weight_kg: slab.up_to_kg,
        freight,
        cod_fee,
        total: freight + cod_fee,
    })
}

/// Greater of the flat fee and the percentage of the collected amount.
pub fn cod_fee(fee: &CodFee, cod_amount: f64) -> f64 {
    fee.flat.max(fee.percent * cod_amount.max(0.0) / 100.0)
}

pub fn validate_rate_card(partner_id: &str, card: &RateCard) -> Result<(), PartnerDataError> {
    let malformed = |detail: String| PartnerDataError::MalformedRateCard {
        partner_id: partner_id.to_string(),
        detail,
    };

    if card.slabs.is_empty() {
        return Err(malformed("rate card has no slabs".to_string()));
    }

    let mut previous = 0.0_f64;
    for slab in &card.slabs {
        if !slab.up_to_kg.is_finite() || slab.up_to_kg <= previous {
            return Err(malformed(format!(
                "slab bounds must be positive and strictly ascending, got {} after {}",
                slab.up_to_kg, previous
            )));
        }
        if let Some((zone, rate)) = slab
            .rates
            .iter()
            .find(|(_, rate)| !rate.is_finite() || **rate < 0.0)
        {
            return Err(malformed(format!(
                "rate {rate} for zone {zone} in slab up to {} kg",
                slab.up_to_kg
            )));
        }
        previous = slab.up_to_kg;
    }

    let cod = &card.cod;
    if !(cod.flat.is_finite() && cod.flat >= 0.0 && cod.percent.is_finite() && cod.percent >= 0.0)
    {
        return Err(malformed(format!(
            "cod fee must be non-negative, got flat {} percent {}",
            cod.flat, cod.percent
        )));
    }

    Ok(())
}

fn rate_not_found(partner: &PartnerProfile, weight_kg: f64, zone: Zone) -> PartnerDataError {
    PartnerDataError::RateNotFound {
        partner_id: partner.id.clone(),
        weight_kg,
        zone: zone.to_string(),
    }
}
