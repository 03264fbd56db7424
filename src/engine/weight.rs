use thiserror::Error;

use crate::error::ValidationError;
use crate::models::shipment::Dimensions;

/// Industry divisor for cm³ to kg volumetric conversion.
pub const VOLUMETRIC_DIVISOR: f64 = 5_000.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightError {
    #[error("dimension {field} must be positive, got {value}")]
    NonPositiveDimension { field: &'static str, value: f64 },
}

impl From<WeightError> for ValidationError {
    fn from(err: WeightError) -> Self {
        match err {
            WeightError::NonPositiveDimension { field, value } => {
                ValidationError::InvalidDimension { field, value }
            }
        }
    }
}

pub fn compute_volumetric_weight(
    length_cm: f64,
    width_cm: f64,
    height_cm: f64,
) -> Result<f64, WeightError> {
    for (field, value) in [
        ("lengthCm", length_cm),
        ("widthCm", width_cm),
        ("heightCm", height_cm),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(WeightError::NonPositiveDimension { field, value });
        }
    }

    Ok(length_cm * width_cm * height_cm / VOLUMETRIC_DIVISOR)
}

pub fn compute_chargeable_weight(actual_kg: f64, volumetric_kg: Option<f64>) -> f64 {
    match volumetric_kg {
        Some(volumetric) => actual_kg.max(volumetric),
        None => actual_kg,
    }
}

/// Chargeable weight for a parcel; dimensions count only when all three
/// sides are known.
pub fn chargeable_weight_for(
    actual_kg: f64,
    dimensions: Option<&Dimensions>,
) -> Result<f64, WeightError> {
    let volumetric = match dimensions.and_then(Dimensions::complete) {
        Some((length, width, height)) => Some(compute_volumetric_weight(length, width, height)?),
        None => None,
    };

    Ok(compute_chargeable_weight(actual_kg, volumetric))
}
