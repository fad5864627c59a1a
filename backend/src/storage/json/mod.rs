//! JSON document store.
//!
//! The whole club lives in one JSON file, loaded at startup and kept in
//! memory. Each repository is a thin view over the shared `JsonConnection`.

pub mod activity_repository;
pub mod budget_repository;
pub mod connection;
pub mod document;
pub mod package_repository;
pub mod series_repository;
pub mod trainer_repository;
pub mod training_type_repository;
pub mod user_repository;

#[cfg(test)]
pub mod test_utils;

pub use activity_repository::ActivityRepository;
pub use budget_repository::BudgetRepository;
pub use connection::JsonConnection;
pub use document::ClubDocument;
pub use package_repository::PackageRepository;
pub use series_repository::SeriesRepository;
pub use trainer_repository::TrainerRepository;
pub use training_type_repository::TrainingTypeRepository;
pub use user_repository::UserRepository;
