use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{MoneyFlow, SectionKind};

/// Named bucket of a year's budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSection {
    pub id: String,
    pub year: i32,
    pub name: String,
    pub kind: SectionKind,
    /// Source of the costs of an auto section
    pub training_type_id: Option<String>,
    pub planned_amount: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hand-entered cost or income line of a manual section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub id: String,
    pub section_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub flow: MoneyFlow,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BudgetEntry {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}
