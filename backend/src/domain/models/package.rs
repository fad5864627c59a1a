use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalog entry: a bundle of sessions sold at a fixed price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPackage {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub sessions: u32,
    pub price: f64,
    pub validity_days: Option<u32>,
    pub training_type_ids: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainingPackage {
    pub fn price_per_session(&self) -> f64 {
        if self.sessions == 0 {
            return 0.0;
        }
        (self.price / self.sessions as f64 * 100.0).round() / 100.0
    }
}
