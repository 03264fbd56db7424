use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::engine::selector::validate_weights;
use crate::error::AppError;
use crate::models::shipment::ClientWeights;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/clients/:id/weights",
        get(get_client_weights).put(put_client_weights),
    )
}

async fn get_client_weights(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ClientWeights>, AppError> {
    let weights = state
        .client_weights
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("no stored weights for client {}", id)))?;

    Ok(Json(*weights.value()))
}

async fn put_client_weights(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(weights): Json<ClientWeights>,
) -> Result<Json<ClientWeights>, AppError> {
    if id.trim().is_empty() {
        return Err(AppError::BadRequest("client id cannot be empty".to_string()));
    }
    validate_weights(&weights)?;

    state.client_weights.insert(id, weights);
    Ok(Json(weights))
}
