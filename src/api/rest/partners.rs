use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch, post, put};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;

use crate::engine::rate::validate_rate_card;
use crate::engine::serviceability::validate_coverage;
use crate::error::AppError;
use crate::geo::{validate_pincode, PincodeEntry};
use crate::models::partner::{Coverage, PartnerProfile, RateCard, Zone};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/partners", post(create_partner).get(list_partners))
        .route("/partners/:id", get(get_partner).put(replace_partner))
        .route("/partners/:id/status", patch(update_partner_status))
        .route("/pincodes", put(upsert_pincodes))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerPayload {
    pub id: String,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
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
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub active: bool,
}

impl PartnerPayload {
    fn into_profile(self) -> Result<PartnerProfile, AppError> {
        if self.id.trim().is_empty() {
            return Err(AppError::BadRequest("id cannot be empty".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("name cannot be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.reliability) {
            return Err(AppError::BadRequest(
                "reliability must be within [0, 1]".to_string(),
            ));
        }
        if !self.max_weight_kg.is_finite() || self.max_weight_kg <= 0.0 {
            return Err(AppError::BadRequest("maxWeightKg must be > 0".to_string()));
        }
        let transit_ok = |hours: f64| hours.is_finite() && hours > 0.0;
        if !transit_ok(self.avg_transit_hours) || !self.zone_transit_hours.values().all(|h| transit_ok(*h)) {
            return Err(AppError::BadRequest("transit hours must be > 0".to_string()));
        }

        let profile = PartnerProfile {
            id: self.id,
            name: self.name,
            active: self.active,
            supports_cod: self.supports_cod,
            rate_card: self.rate_card,
            coverage: self.coverage,
            reliability: self.reliability,
            avg_transit_hours: self.avg_transit_hours,
            zone_transit_hours: self.zone_transit_hours,
            max_weight_kg: self.max_weight_kg,
            daily_capacity: self.daily_capacity,
            updated_at: Utc::now(),
        };

        validate_rate_card(&profile.id, &profile.rate_card)
            .map_err(|err| AppError::BadRequest(err.to_string()))?;
        validate_coverage(&profile).map_err(|err| AppError::BadRequest(err.to_string()))?;

        Ok(profile)
    }
}

async fn create_partner(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PartnerPayload>,
) -> Result<Json<PartnerProfile>, AppError> {
    let partner = payload.into_profile()?;

    if state.catalog.partners.contains_key(&partner.id) {
        return Err(AppError::Conflict(format!(
            "partner {} already exists",
            partner.id
        )));
    }

    state.catalog.partners.insert(partner.id.clone(), partner.clone());
    state.cache.invalidate();
    tracing::info!(partner_id = %partner.id, "partner created");

    Ok(Json(partner))
}

async fn list_partners(State(state): State<Arc<AppState>>) -> Json<Vec<PartnerProfile>> {
    let mut partners: Vec<PartnerProfile> = state
        .catalog
        .partners
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    partners.sort_by(|a, b| a.id.cmp(&b.id));

    Json(partners)
}

async fn get_partner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PartnerProfile>, AppError> {
    let partner = state
        .catalog
        .partners
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("partner {} not found", id)))?;

    Ok(Json(partner.value().clone()))
}

async fn replace_partner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<PartnerPayload>,
) -> Result<Json<PartnerProfile>, AppError> {
    if payload.id != id {
        return Err(AppError::BadRequest(format!(
            "body id {} does not match path id {}",
            payload.id, id
        )));
    }
    if !state.catalog.partners.contains_key(&id) {
        return Err(AppError::NotFound(format!("partner {} not found", id)));
    }

    let partner = payload.into_profile()?;
    state.catalog.partners.insert(id, partner.clone());
    state.cache.invalidate();

    Ok(Json(partner))
}

async fn update_partner_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<PartnerProfile>, AppError> {
    let updated = {
        let mut partner = state
            .catalog
            .partners
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("partner {} not found", id)))?;

        partner.active = payload.active;
        partner.updated_at = Utc::now();
        partner.clone()
    };
    state.cache.invalidate();

    Ok(Json(updated))
}

async fn upsert_pincodes(
    State(state): State<Arc<AppState>>,
    Json(entries): Json<Vec<PincodeEntry>>,
) -> Result<Json<serde_json::Value>, AppError> {
    for entry in &entries {
        validate_pincode("pincode", &entry.pincode)?;
    }

    let count = entries.len();
    for entry in entries {
        state.catalog.pincodes.insert(entry.pincode.clone(), entry);
    }
    state.cache.invalidate();

    Ok(Json(serde_json::json!({ "upserted": count })))
}
