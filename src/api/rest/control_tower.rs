use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::engine::control_tower::{rank_capacity, rank_sla_risks, DEFAULT_BOTTLENECK_THRESHOLD};
use crate::error::AppError;
use crate::models::control_tower::{CapacityForecast, InFlightShipment, PartnerLoad, SlaRisk};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/control-tower/sla-risk", post(sla_risk))
        .route("/control-tower/capacity", post(capacity))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaRiskRequest {
    pub shipments: Vec<InFlightShipment>,
    /// Evaluation time; defaults to now.
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityRequest {
    pub partners: Vec<PartnerLoad>,
    #[serde(default)]
    pub threshold: Option<f64>,
}

async fn sla_risk(Json(payload): Json<SlaRiskRequest>) -> Json<Vec<SlaRisk>> {
    let now = payload.as_of.unwrap_or_else(Utc::now);
    Json(rank_sla_risks(&payload.shipments, now))
}

async fn capacity(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CapacityRequest>,
) -> Result<Json<Vec<CapacityForecast>>, AppError> {
    let threshold = payload.threshold.unwrap_or(DEFAULT_BOTTLENECK_THRESHOLD);
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(AppError::BadRequest("threshold must be > 0".to_string()));
    }

    let mut loads = payload.partners;
    for load in &mut loads {
        if load.daily_capacity.is_some() {
            continue;
        }
        let stored = state
            .catalog
            .partners
            .get(&load.partner_id)
            .and_then(|partner| partner.daily_capacity);
        match stored {
            Some(capacity) => load.daily_capacity = Some(capacity),
            None => {
                return Err(AppError::BadRequest(format!(
                    "no dailyCapacity given or on record for partner {}",
                    load.partner_id
                )));
            }
        }
    }

    Ok(Json(rank_capacity(&loads, threshold)))
}
