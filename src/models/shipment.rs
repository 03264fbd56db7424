use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
}

impl Dimensions {
    pub fn new(length_cm: f64, width_cm: f64, height_cm: f64) -> Self {
        Self {
            length_cm: Some(length_cm),
            width_cm: Some(width_cm),
            height_cm: Some(height_cm),
        }
    }

    /// All three sides, or `None` when any of them is unknown.
    pub fn complete(&self) -> Option<(f64, f64, f64)> {
        Some((self.length_cm?, self.width_cm?, self.height_cm?))
    }
}

/// Relative importance of cost, speed and reliability for one client.
/// Values need not sum to 1; the scorer normalises them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientWeights {
    pub cost: f64,
    pub speed: f64,
    pub reliability: f64,
}

impl ClientWeights {
    pub const fn new(cost: f64, speed: f64, reliability: f64) -> Self {
        Self {
            cost,
            speed,
            reliability,
        }
    }
}

impl Default for ClientWeights {
    fn default() -> Self {
        Self::new(0.4, 0.3, 0.3)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRequest {
    pub origin_pincode: String,
    pub destination_pincode: String,
    pub weight_kg: f64,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub is_cod: bool,
    #[serde(default)]
    pub cod_amount: f64,
    #[serde(default)]
    pub client_weights: Option<ClientWeights>,
    #[serde(default)]
    pub client_id: Option<String>,
}

impl ShipmentRequest {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>, weight_kg: f64) -> Self {
        Self {
            origin_pincode: origin.into(),
            destination_pincode: destination.into(),
            weight_kg,
            dimensions: None,
            is_cod: false,
            cod_amount: 0.0,
            client_weights: None,
            client_id: None,
        }
    }

    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn with_cod(mut self, cod_amount: f64) -> Self {
        self.is_cod = true;
        self.cod_amount = cod_amount;
        self
    }

    pub fn with_weights(mut self, weights: ClientWeights) -> Self {
        self.client_weights = Some(weights);
        self
    }

    pub fn for_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }
}
