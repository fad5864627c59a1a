use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of activity carrying the defaults used when scheduling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingType {
    pub id: String,
    pub name: String,
    /// `#RRGGBB`
    pub color: String,
    pub default_trainer_id: Option<String>,
    pub default_hours: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainingType {
    pub fn is_valid_color(color: &str) -> bool {
        let Some(hex) = color.strip_prefix('#') else {
            return false;
        };
        hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
    }
}
