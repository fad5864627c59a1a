//! # Domain Module
//!
//! Business rules of the club planner: scheduling activities and recurring
//! series, detecting trainer double-bookings, building calendar grids, the
//! trainer / training type / package catalog, user accounts and the yearly
//! budget.
//!
//! ## Module Organization
//!
//! - **dates**, **recurrence**, **conflicts**, **budget**: pure functions
//!   with no storage access
//! - **calendar**: month, year and week grids over activity views
//! - **\*_service**: storage-backed services, one per resource
//! - **commands**: inputs and results of service operations
//! - **models**: records persisted in the club document
//!
//! Services take an [`Actor`](models::Actor) for every write and check the
//! role rules before touching storage.

pub mod activity_service;
pub mod auth_service;
pub mod budget;
pub mod budget_service;
pub mod calendar;
pub mod commands;
pub mod conflicts;
pub mod dates;
pub mod error;
pub mod models;
pub mod package_service;
pub mod recurrence;
pub mod trainer_service;
pub mod training_type_service;
pub mod user_service;

pub use activity_service::ActivityService;
pub use auth_service::AuthService;
pub use budget_service::BudgetService;
pub use calendar::CalendarService;
pub use error::{DomainError, DomainResult};
pub use package_service::PackageService;
pub use trainer_service::TrainerService;
pub use training_type_service::TrainingTypeService;
pub use user_service::UserService;
