use chrono::Utc;
use log::{info, warn};

use crate::domain::commands::training_types::{CreateTrainingTypeCommand, UpdateTrainingTypeCommand};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::{generate_id, Actor, TrainingType};
use crate::storage::json::{JsonConnection, TrainerRepository, TrainingTypeRepository};
use crate::storage::traits::{Removal, TrainerStorage, TrainingTypeStorage};

/// Longest single session, in hours
pub const MAX_ACTIVITY_HOURS: f64 = 24.0;

/// Service for managing training types
#[derive(Clone)]
pub struct TrainingTypeService {
    type_repository: TrainingTypeRepository,
    trainer_repository: TrainerRepository,
}

impl TrainingTypeService {
    pub fn new(connection: JsonConnection) -> Self {
        Self {
            type_repository: TrainingTypeRepository::new(connection.clone()),
            trainer_repository: TrainerRepository::new(connection),
        }
    }

    pub async fn list_training_types(&self) -> DomainResult<Vec<TrainingType>> {
        Ok(self.type_repository.list_training_types().await?)
    }

    pub async fn get_training_type(&self, type_id: &str) -> DomainResult<TrainingType> {
        self.type_repository
            .get_training_type(type_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Training type", type_id))
    }

    pub async fn create_training_type(
        &self,
        actor: &Actor,
        command: CreateTrainingTypeCommand,
    ) -> DomainResult<TrainingType> {
        actor.require_admin()?;
        info!("Creating training type: name={}", command.name.trim());

        let name = self.validate_unique_name(&command.name, None).await?;
        let color = validate_color(&command.color)?;
        validate_hours(command.default_hours)?;
        let default_trainer_id = self.validate_default_trainer(command.default_trainer_id).await?;

        let now = Utc::now();
        let training_type = TrainingType {
            id: generate_id(),
            name,
            color,
            default_trainer_id,
            default_hours: command.default_hours,
            description: clean(command.description),
            created_at: now,
            updated_at: now,
        };
        self.type_repository.store_training_type(&training_type).await?;

        info!("Created training type {} with ID {}", training_type.name, training_type.id);
        Ok(training_type)
    }

    pub async fn update_training_type(
        &self,
        actor: &Actor,
        type_id: &str,
        command: UpdateTrainingTypeCommand,
    ) -> DomainResult<TrainingType> {
        actor.require_admin()?;
        info!("Updating training type {}", type_id);
        let mut training_type = self.get_training_type(type_id).await?;

        if let Some(name) = command.name {
            training_type.name = self.validate_unique_name(&name, Some(type_id)).await?;
        }
        if let Some(color) = command.color {
            training_type.color = validate_color(&color)?;
        }
        if let Some(hours) = command.default_hours {
            validate_hours(hours)?;
            training_type.default_hours = hours;
        }
        if let Some(default_trainer_id) = command.default_trainer_id {
            training_type.default_trainer_id = self.validate_default_trainer(default_trainer_id).await?;
        }
        if let Some(description) = command.description {
            training_type.description = clean(description);
        }
        training_type.updated_at = Utc::now();
        self.type_repository.update_training_type(&training_type).await?;

        Ok(training_type)
    }

    pub async fn delete_training_type(&self, actor: &Actor, type_id: &str) -> DomainResult<()> {
        actor.require_admin()?;
        info!("Deleting training type {}", type_id);
        match self.type_repository.delete_training_type(type_id).await? {
            Removal::Removed => Ok(()),
            Removal::NotFound => Err(DomainError::not_found("Training type", type_id)),
            Removal::InUse(count) => {
                warn!("Training type {} is still used by {} records", type_id, count);
                Err(DomainError::Conflict(format!(
                    "Training type is still used by {} activities, series or budget sections",
                    count
                )))
            }
        }
    }

    async fn validate_unique_name(&self, name: &str, own_id: Option<&str>) -> DomainResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Training type name cannot be empty"));
        }
        if let Some(existing) = self.type_repository.find_training_type_by_name(name).await? {
            if Some(existing.id.as_str()) != own_id {
                return Err(DomainError::Conflict(format!(
                    "A training type named {} already exists",
                    existing.name
                )));
            }
        }
        Ok(name.to_string())
    }

    async fn validate_default_trainer(&self, trainer_id: Option<String>) -> DomainResult<Option<String>> {
        let Some(trainer_id) = clean(trainer_id) else {
            return Ok(None);
        };
        if self.trainer_repository.get_trainer(&trainer_id).await?.is_none() {
            return Err(DomainError::Validation(format!(
                "Trainer {} does not exist",
                trainer_id
            )));
        }
        Ok(Some(trainer_id))
    }
}

/// Accepts `#RRGGBB` and stores it lowercase
fn validate_color(color: &str) -> DomainResult<String> {
    let color = color.trim();
    if !TrainingType::is_valid_color(color) {
        return Err(DomainError::Validation(format!(
            "Invalid color {}, expected #RRGGBB",
            color
        )));
    }
    Ok(color.to_ascii_lowercase())
}

pub fn validate_hours(hours: f64) -> DomainResult<()> {
    if !hours.is_finite() || hours <= 0.0 || hours > MAX_ACTIVITY_HOURS {
        return Err(DomainError::Validation(format!(
            "Hours must be greater than 0 and at most {}",
            MAX_ACTIVITY_HOURS
        )));
    }
    Ok(())
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
