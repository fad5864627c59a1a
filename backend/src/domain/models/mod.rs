//! Domain models persisted in the club document.

pub mod activity;
pub mod budget;
pub mod package;
pub mod series;
pub mod trainer;
pub mod training_type;
pub mod user;

pub use activity::{Activity, ActivityDetails};
pub use budget::{BudgetEntry, BudgetSection};
pub use package::TrainingPackage;
pub use series::RecurringSeries;
pub use trainer::Trainer;
pub use training_type::TrainingType;
pub use user::{Actor, User};

/// Generate a fresh record id
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
