use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::routing::route_shipment;
use crate::error::AppError;
use crate::models::selection::SelectionRecord;
use crate::models::shipment::ShipmentRequest;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Default, Deserialize)]
pub struct ListSelectionsQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/selections", post(create_selection).get(list_selections))
        .route("/selections/:id", get(get_selection))
}

async fn create_selection(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ShipmentRequest>,
) -> Result<Json<SelectionRecord>, AppError> {
    let record = route_shipment(&state, payload)?;
    Ok(Json(record))
}

async fn get_selection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SelectionRecord>, AppError> {
    let record = state
        .selections
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("selection {} not found", id)))?;

    Ok(Json(record))
}

/// Newest first. `limit` defaults to 50 and is capped at 500.
async fn list_selections(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListSelectionsQuery>,
) -> Json<Vec<SelectionRecord>> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    Json(state.selections.recent(offset, limit))
}
