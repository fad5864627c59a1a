//! On-disk shape of the club data file.

use serde::{Deserialize, Serialize};
use shared::{Role, SectionKind};

use crate::domain::models::{
    Activity, BudgetEntry, BudgetSection, RecurringSeries, Trainer, TrainingPackage, TrainingType,
    User,
};
use crate::storage::traits::IntegrityError;

pub const DOCUMENT_VERSION: u32 = 1;

/// Every collection of the club, stored as one JSON document.
///
/// Missing collections deserialize as empty so older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClubDocument {
    pub version: u32,
    pub users: Vec<User>,
    pub trainers: Vec<Trainer>,
    pub training_types: Vec<TrainingType>,
    pub activities: Vec<Activity>,
    pub series: Vec<RecurringSeries>,
    pub packages: Vec<TrainingPackage>,
    pub budget_sections: Vec<BudgetSection>,
    pub budget_entries: Vec<BudgetEntry>,
}

impl Default for ClubDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            users: Vec::new(),
            trainers: Vec::new(),
            training_types: Vec::new(),
            activities: Vec::new(),
            series: Vec::new(),
            packages: Vec::new(),
            budget_sections: Vec::new(),
            budget_entries: Vec::new(),
        }
    }
}

impl ClubDocument {
    pub fn admin_count(&self) -> usize {
        self.users.iter().filter(|u| u.role == Role::Admin).count()
    }

    pub fn require_trainer(&self, trainer_id: &str) -> Result<(), IntegrityError> {
        if self.trainers.iter().any(|t| t.id == trainer_id) {
            Ok(())
        } else {
            Err(IntegrityError::MissingTrainer(trainer_id.to_string()))
        }
    }

    pub fn require_training_type(&self, type_id: &str) -> Result<(), IntegrityError> {
        if self.training_types.iter().any(|t| t.id == type_id) {
            Ok(())
        } else {
            Err(IntegrityError::MissingTrainingType(type_id.to_string()))
        }
    }

    /// The training type and every trainer of an activity or series template
    pub fn require_schedule_references(&self, type_id: &str, trainer_ids: &[String]) -> Result<(), IntegrityError> {
        self.require_training_type(type_id)?;
        trainer_ids.iter().try_for_each(|t| self.require_trainer(t))
    }

    /// Case-insensitive, ignoring the type with `own_id`
    pub fn require_unique_type_name(&self, name: &str, own_id: &str) -> Result<(), IntegrityError> {
        let name = name.trim();
        match self
            .training_types
            .iter()
            .find(|t| t.id != own_id && t.name.trim().eq_ignore_ascii_case(name))
        {
            Some(existing) => Err(IntegrityError::DuplicateTrainingTypeName(existing.name.clone())),
            None => Ok(()),
        }
    }

    /// An auto section needs an existing type that no other auto section of
    /// the same year already covers
    pub fn require_valid_auto_section(&self, section: &BudgetSection) -> Result<(), IntegrityError> {
        let (SectionKind::Auto, Some(type_id)) = (section.kind, section.training_type_id.as_deref()) else {
            return Ok(());
        };
        self.require_training_type(type_id)?;
        let taken = self.budget_sections.iter().any(|s| {
            s.id != section.id
                && s.year == section.year
                && s.kind == SectionKind::Auto
                && s.training_type_id.as_deref() == Some(type_id)
        });
        if taken {
            return Err(IntegrityError::DuplicateAutoSection {
                year: section.year,
                type_id: type_id.to_string(),
            });
        }
        Ok(())
    }

    /// Activities and series templates that reference a trainer
    pub fn trainer_references(&self, trainer_id: &str) -> usize {
        let activities = self
            .activities
            .iter()
            .filter(|a| a.has_trainer(trainer_id))
            .count();
        let series = self
            .series
            .iter()
            .filter(|s| s.trainer_ids.iter().any(|t| t == trainer_id))
            .count();
        activities + series
    }

    /// Activities, series templates and auto budget sections that reference
    /// a training type
    pub fn training_type_references(&self, type_id: &str) -> usize {
        let activities = self
            .activities
            .iter()
            .filter(|a| a.training_type_id == type_id)
            .count();
        let series = self
            .series
            .iter()
            .filter(|s| s.training_type_id == type_id)
            .count();
        let sections = self
            .budget_sections
            .iter()
            .filter(|s| s.training_type_id.as_deref() == Some(type_id))
            .count();
        activities + series + sections
    }
}
