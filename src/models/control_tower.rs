use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InFlightShipment {
    pub awb: String,
    pub partner_id: String,
    pub booked_at: DateTime<Utc>,
    pub promised_by: DateTime<Utc>,
    pub expected_transit_hours: f64,
    pub partner_reliability: f64,
    #[serde(default)]
    pub failed_attempts: u32,
    #[serde(default)]
    pub delivered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Breached,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaRisk {
    pub awb: String,
    pub partner_id: String,
    pub score: f64,
    pub level: RiskLevel,
    pub hours_to_promise: f64,
    pub expected_remaining_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerLoad {
    pub partner_id: String,
    pub booked_today: u32,
    /// Falls back to the partner profile's capacity when omitted.
    #[serde(default)]
    pub daily_capacity: Option<u32>,
    /// Bookings per hour over the recent window.
    pub hourly_run_rate: f64,
    pub hours_remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityForecast {
    pub partner_id: String,
    pub projected_volume: f64,
    pub utilization: f64,
    pub bottleneck: bool,
    pub headroom: f64,
}
