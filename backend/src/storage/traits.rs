//! # Storage Traits
//!
//! Storage abstractions used by the domain services. The JSON document store
//! implements all of them; tests and future backends can swap in their own.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::models::{
    Activity, BudgetEntry, BudgetSection, RecurringSeries, Trainer, TrainingPackage, TrainingType,
    User,
};

/// Outcome of deleting a record that other records may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    NotFound,
    /// Still referenced by this many records, nothing was deleted
    InUse(usize),
}

/// An invariant that spans collections, checked inside the write that
/// would break it. Services map these onto their own error kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("Username {0} is already taken")]
    DuplicateUsername(String),
    #[error("Cannot remove or demote the last administrator")]
    LastAdmin,
    #[error("Trainer {0} does not exist")]
    MissingTrainer(String),
    #[error("Training type {0} does not exist")]
    MissingTrainingType(String),
    #[error("A training type named {0} already exists")]
    DuplicateTrainingTypeName(String),
    #[error("An auto section for training type {type_id} already exists in {year}")]
    DuplicateAutoSection { year: i32, type_id: String },
}

/// What a series deletion or truncation removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesRemoval {
    pub deleted_activities: usize,
    pub series_removed: bool,
}

#[async_trait]
pub trait UserStorage: Send + Sync {
    async fn store_user(&self, user: &User) -> Result<()>;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Case-insensitive lookup
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// All users ordered by username
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Fails with [`IntegrityError::LastAdmin`] when this would demote the
    /// only administrator
    async fn update_user(&self, user: &User) -> Result<()>;

    /// Returns true if the user was found and deleted. Fails with
    /// [`IntegrityError::LastAdmin`] for the only administrator.
    async fn delete_user(&self, user_id: &str) -> Result<bool>;

    async fn count_admins(&self) -> Result<usize>;
}

#[async_trait]
pub trait TrainerStorage: Send + Sync {
    async fn store_trainer(&self, trainer: &Trainer) -> Result<()>;

    async fn get_trainer(&self, trainer_id: &str) -> Result<Option<Trainer>>;

    /// Trainers ordered by name
    async fn list_trainers(&self, active_only: bool) -> Result<Vec<Trainer>>;

    async fn update_trainer(&self, trainer: &Trainer) -> Result<()>;

    /// Refuses while activities or series reference the trainer. On success
    /// the trainer is also cleared from type defaults and user links.
    async fn delete_trainer(&self, trainer_id: &str) -> Result<Removal>;
}

#[async_trait]
pub trait TrainingTypeStorage: Send + Sync {
    async fn store_training_type(&self, training_type: &TrainingType) -> Result<()>;

    async fn get_training_type(&self, type_id: &str) -> Result<Option<TrainingType>>;

    /// Case-insensitive lookup
    async fn find_training_type_by_name(&self, name: &str) -> Result<Option<TrainingType>>;

    /// Training types ordered by name
    async fn list_training_types(&self) -> Result<Vec<TrainingType>>;

    async fn update_training_type(&self, training_type: &TrainingType) -> Result<()>;

    /// Refuses while activities, series or auto budget sections reference
    /// the type. On success the type is dropped from package lists.
    async fn delete_training_type(&self, type_id: &str) -> Result<Removal>;
}

#[async_trait]
pub trait ActivityStorage: Send + Sync {
    async fn store_activity(&self, activity: &Activity) -> Result<()>;

    async fn get_activity(&self, activity_id: &str) -> Result<Option<Activity>>;

    /// Activities within the inclusive bounds, ordered by date, start time
    /// (untimed first) and id
    async fn list_activities(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Activity>>;

    /// Occurrences of a series in date order
    async fn list_series_activities(&self, series_id: &str) -> Result<Vec<Activity>>;

    async fn update_activity(&self, activity: &Activity) -> Result<()>;

    /// Returns true if the activity was found and deleted
    async fn delete_activity(&self, activity_id: &str) -> Result<bool>;
}

/// Series operations touch the template and its occurrences in one write
#[async_trait]
pub trait SeriesStorage: Send + Sync {
    async fn store_series(&self, series: &RecurringSeries, activities: &[Activity]) -> Result<()>;

    async fn get_series(&self, series_id: &str) -> Result<Option<RecurringSeries>>;

    /// Series ordered by start date
    async fn list_series(&self) -> Result<Vec<RecurringSeries>>;

    /// Save the template and swap its occurrences on or after `from` for
    /// `activities`. Returns how many occurrences were removed.
    async fn replace_series_from(
        &self,
        series: &RecurringSeries,
        from: NaiveDate,
        activities: &[Activity],
    ) -> Result<usize>;

    /// Remove occurrences on or after `from` and end the template the day
    /// before. A template left without occurrences is removed as well.
    async fn truncate_series(&self, series_id: &str, from: NaiveDate) -> Result<Option<SeriesRemoval>>;

    /// Remove the template and every occurrence still linked to it
    async fn delete_series(&self, series_id: &str) -> Result<Option<SeriesRemoval>>;
}

#[async_trait]
pub trait PackageStorage: Send + Sync {
    async fn store_package(&self, package: &TrainingPackage) -> Result<()>;

    async fn get_package(&self, package_id: &str) -> Result<Option<TrainingPackage>>;

    /// Packages ordered by name
    async fn list_packages(&self, active_only: bool) -> Result<Vec<TrainingPackage>>;

    async fn update_package(&self, package: &TrainingPackage) -> Result<()>;

    async fn delete_package(&self, package_id: &str) -> Result<bool>;
}

#[async_trait]
pub trait BudgetStorage: Send + Sync {
    async fn store_section(&self, section: &BudgetSection) -> Result<()>;

    async fn get_section(&self, section_id: &str) -> Result<Option<BudgetSection>>;

    async fn list_sections(&self, year: i32) -> Result<Vec<BudgetSection>>;

    /// The auto section of a year that draws on a training type
    async fn find_auto_section(&self, year: i32, type_id: &str) -> Result<Option<BudgetSection>>;

    async fn update_section(&self, section: &BudgetSection) -> Result<()>;

    /// Deletes the section with its entries. Returns the number of entries
    /// removed, or `None` if the section does not exist.
    async fn delete_section(&self, section_id: &str) -> Result<Option<usize>>;

    async fn store_entry(&self, entry: &BudgetEntry) -> Result<()>;

    async fn get_entry(&self, entry_id: &str) -> Result<Option<BudgetEntry>>;

    /// Entries of a section in date order
    async fn list_entries(&self, section_id: &str) -> Result<Vec<BudgetEntry>>;

    /// Entries of every section of a year
    async fn list_entries_for_year(&self, year: i32) -> Result<Vec<BudgetEntry>>;

    async fn update_entry(&self, entry: &BudgetEntry) -> Result<()>;

    async fn delete_entry(&self, entry_id: &str) -> Result<bool>;
}
