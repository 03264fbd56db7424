use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// A malformed shipment request. Rejected before any partner is evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a 6-digit pincode, got {value:?}")]
    InvalidPincode { field: &'static str, value: String },

    #[error("weight must be a positive number of kilograms, got {0}")]
    NonPositiveWeight(f64),

    #[error("dimension {field} must be a positive number of centimeters, got {value}")]
    InvalidDimension { field: &'static str, value: f64 },

    #[error("cod amount must be a non-negative number, got {0}")]
    InvalidCodAmount(f64),

    #[error("weight preference {field} must be within [0, 1], got {value}")]
    WeightPreferenceOutOfRange { field: &'static str, value: f64 },
}

/// Per-partner data problems. The partner is dropped from the candidate set
/// and the selection carries on with the rest.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PartnerDataError {
    #[error("no rate slab covers {weight_kg} kg in zone {zone} for partner {partner_id}")]
    RateNotFound {
        partner_id: String,
        weight_kg: f64,
        zone: String,
    },

    #[error("rate card of partner {partner_id} is malformed: {detail}")]
    MalformedRateCard { partner_id: String, detail: String },

    #[error("coverage of partner {partner_id} is malformed: {detail}")]
    MalformedCoverage { partner_id: String, detail: String },

    #[error("reliability of partner {partner_id} must be within [0, 1], got {value}")]
    InvalidReliability { partner_id: String, value: f64 },

    #[error("transit time of partner {partner_id} must be positive, got {value}")]
    InvalidTransitTime { partner_id: String, value: f64 },

    #[error("cost estimate of partner {partner_id} is not a finite number: {value}")]
    NonFiniteCost { partner_id: String, value: f64 },
}

/// The partner/rate data source could not be read.
#[derive(Debug, Clone, Error)]
#[error("partner source unavailable: {0}")]
pub struct SourceError(pub String);

#[derive(Debug, Clone, Error)]
pub enum SelectionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    System(#[from] SourceError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<SelectionError> for AppError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::Validation(err) => err.into(),
            SelectionError::System(err) => AppError::Unavailable(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
