use std::env;
use std::time::Duration;

use crate::engine::audit::DEFAULT_AUDIT_RETENTION;
use crate::engine::selector::{validate_weights, SelectionPolicy, DEFAULT_TIE_EPSILON};
use crate::error::AppError;
use crate::models::shipment::ClientWeights;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub event_buffer_size: usize,
    pub catalog_refresh: Duration,
    pub audit_retention: usize,
    pub policy: SelectionPolicy,
    pub catalog_seed_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let default_weights = ClientWeights::new(
            parse_or_default("DEFAULT_COST_WEIGHT", 0.4)?,
            parse_or_default("DEFAULT_SPEED_WEIGHT", 0.3)?,
            parse_or_default("DEFAULT_RELIABILITY_WEIGHT", 0.3)?,
        );
        validate_weights(&default_weights)
            .map_err(|err| AppError::Internal(format!("invalid default weights: {err}")))?;

        let tie_epsilon: f64 = parse_or_default("TIE_EPSILON", DEFAULT_TIE_EPSILON)?;
        if !tie_epsilon.is_finite() || tie_epsilon < 0.0 {
            return Err(AppError::Internal(format!(
                "invalid TIE_EPSILON: {tie_epsilon} must be a non-negative number"
            )));
        }

        let audit_retention: usize = parse_or_default("AUDIT_RETENTION", DEFAULT_AUDIT_RETENTION)?;
        if audit_retention == 0 {
            return Err(AppError::Internal(
                "invalid AUDIT_RETENTION: must be > 0".to_string(),
            ));
        }

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            catalog_refresh: Duration::from_secs(parse_or_default("CATALOG_REFRESH_SECS", 60)?),
            audit_retention,
            policy: SelectionPolicy {
                default_weights,
                tie_epsilon,
            },
            catalog_seed_path: env::var("CATALOG_SEED_PATH").ok().filter(|p| !p.is_empty()),
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
