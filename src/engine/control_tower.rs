use chrono::{DateTime, Utc};

use crate::models::control_tower::{
    CapacityForecast, InFlightShipment, PartnerLoad, RiskLevel, SlaRisk,
};

const SCHEDULE_WEIGHT: f64 = 0.6;
const UNRELIABILITY_WEIGHT: f64 = 0.25;
const ATTEMPT_PENALTY: f64 = 0.15;
const MAX_ATTEMPT_PENALTY: f64 = 0.3;

pub const DEFAULT_BOTTLENECK_THRESHOLD: f64 = 0.9;

pub fn assess_sla_risk(shipment: &InFlightShipment, now: DateTime<Utc>) -> SlaRisk {
    let elapsed_hours = hours_between(shipment.booked_at, now).max(0.0);
    let hours_to_promise = hours_between(now, shipment.promised_by);
    let expected_remaining_hours = (shipment.expected_transit_hours - elapsed_hours).max(0.0);

    let (score, level) = if shipment.delivered {
        (0.0, RiskLevel::Low)
    } else if hours_to_promise <= 0.0 {
        (1.0, RiskLevel::Breached)
    } else {
        let schedule_pressure = (expected_remaining_hours / hours_to_promise).clamp(0.0, 1.0);
        let unreliability = 1.0 - shipment.partner_reliability.clamp(0.0, 1.0);
        let attempts =
            (ATTEMPT_PENALTY * f64::from(shipment.failed_attempts)).min(MAX_ATTEMPT_PENALTY);

        let score = (SCHEDULE_WEIGHT * schedule_pressure + UNRELIABILITY_WEIGHT * unreliability + attempts)
            .clamp(0.0, 1.0);
        (score, risk_level(score))
    };

    SlaRisk {
        awb: shipment.awb.clone(),
        partner_id: shipment.partner_id.clone(),
        score,
        level,
        hours_to_promise,
        expected_remaining_hours,
    }
}

fn risk_level(score: f64) -> RiskLevel {
    if score < 0.4 {
        RiskLevel::Low
    } else if score < 0.7 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Highest risk first; ties by AWB.
pub fn rank_sla_risks(shipments: &[InFlightShipment], now: DateTime<Utc>) -> Vec<SlaRisk> {
    let mut risks: Vec<SlaRisk> = shipments
        .iter()
        .map(|shipment| assess_sla_risk(shipment, now))
        .collect();
    risks.sort_by(|a, b| {
        b.level
            .cmp(&a.level)
            .then_with(|| b.score.total_cmp(&a.score))
            .then_with(|| a.awb.cmp(&b.awb))
    });
    risks
}

pub fn predict_capacity(load: &PartnerLoad, threshold: f64) -> CapacityForecast {
    let projected_volume = f64::from(load.booked_today)
        + load.hourly_run_rate.max(0.0) * load.hours_remaining.max(0.0);

    let capacity = load.daily_capacity.unwrap_or(0);
    let utilization = if capacity == 0 {
        1.0
    } else {
        projected_volume / f64::from(capacity)
    };

    CapacityForecast {
        partner_id: load.partner_id.clone(),
        projected_volume,
        utilization,
        bottleneck: utilization >= threshold,
        headroom: f64::from(capacity) - projected_volume,
    }
}

pub fn rank_capacity(loads: &[PartnerLoad], threshold: f64) -> Vec<CapacityForecast> {
    let mut forecasts: Vec<CapacityForecast> = loads
        .iter()
        .map(|load| predict_capacity(load, threshold))
        .collect();
    forecasts.sort_by(|a, b| {
        b.utilization
            .total_cmp(&a.utilization)
            .then_with(|| a.partner_id.cmp(&b.partner_id))
    });
    forecasts
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / 3_600.0
}
