use std::cmp::Ordering;

use crate::models::selection::{ScoreBreakdown, ScoredCandidate};
use crate::models::shipment::ClientWeights;

/// Raw per-partner figures fed into the scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateInput {
    pub partner_id: String,
    pub partner_name: String,
    pub cost: f64,
    pub eta_hours: f64,
    pub reliability: f64,
}

/// Scales weights to sum to 1. A zero (or unusable) sum becomes an even split.
pub fn normalize_weights(weights: &ClientWeights) -> ClientWeights {
    let sanitize = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let cost = sanitize(weights.cost);
    let speed = sanitize(weights.speed);
    let reliability = sanitize(weights.reliability);

    let sum = cost + speed + reliability;
    if sum <= 0.0 {
        let third = 1.0 / 3.0;
        return ClientWeights::new(third, third, third);
    }

    ClientWeights::new(cost / sum, speed / sum, reliability / sum)
}

pub fn score_candidates(candidates: &[CandidateInput], weights: &ClientWeights) -> Vec<ScoredCandidate> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let weights = normalize_weights(weights);
    let (min_cost, max_cost) = bounds(candidates.iter().map(|c| c.cost));
    let (min_eta, max_eta) = bounds(candidates.iter().map(|c| c.eta_hours));

    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|candidate| {
            let breakdown = ScoreBreakdown {
                cost_score: inverted_min_max(candidate.cost, min_cost, max_cost),
                speed_score: inverted_min_max(candidate.eta_hours, min_eta, max_eta),
                reliability_score: candidate.reliability,
            };

            ScoredCandidate {
                partner_id: candidate.partner_id.clone(),
                partner_name: candidate.partner_name.clone(),
                cost: candidate.cost,
                eta_hours: candidate.eta_hours,
                reliability: candidate.reliability,
                score: weighted_score(&breakdown, &weights),
                breakdown,
                rank: 0,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| tie_break(a, b)));
    assign_ranks(&mut scored);
    scored
}

pub fn weighted_score(breakdown: &ScoreBreakdown, weights: &ClientWeights) -> f64 {
    (breakdown.cost_score * weights.cost)
        + (breakdown.speed_score * weights.speed)
        + (breakdown.reliability_score * weights.reliability)
}

/// Lower cost, then lower ETA, then partner id.
pub fn tie_break(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    a.cost
        .total_cmp(&b.cost)
        .then_with(|| a.eta_hours.total_cmp(&b.eta_hours))
        .then_with(|| a.partner_id.cmp(&b.partner_id))
}

pub fn assign_ranks(scored: &mut [ScoredCandidate]) {
    for (index, candidate) in scored.iter_mut().enumerate() {
        candidate.rank = index + 1;
    }
}

/// Best (lowest) value maps to 1.0, worst to 0.0.
fn inverted_min_max(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span <= 0.0 {
        return 1.0;
    }

    ((max - value) / span).clamp(0.0, 1.0)
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
        (min.min(v), max.max(v))
    })
}
