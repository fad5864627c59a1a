use std::collections::HashMap;

use chrono::Utc;
use log::{info, warn};
use shared::TrainerHours;

use crate::domain::budget;
use crate::domain::commands::trainers::{CreateTrainerCommand, TrainerHoursQuery, UpdateTrainerCommand};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::{generate_id, Actor, Trainer};
use crate::storage::json::{ActivityRepository, JsonConnection, TrainerRepository};
use crate::storage::traits::{ActivityStorage, Removal, TrainerStorage};

/// Service for managing trainers and their hours
#[derive(Clone)]
pub struct TrainerService {
    trainer_repository: TrainerRepository,
    activity_repository: ActivityRepository,
}

impl TrainerService {
    pub fn new(connection: JsonConnection) -> Self {
        Self {
            trainer_repository: TrainerRepository::new(connection.clone()),
            activity_repository: ActivityRepository::new(connection),
        }
    }

    pub async fn list_trainers(&self, active_only: bool) -> DomainResult<Vec<Trainer>> {
        Ok(self.trainer_repository.list_trainers(active_only).await?)
    }

    pub async fn get_trainer(&self, trainer_id: &str) -> DomainResult<Trainer> {
        self.trainer_repository
            .get_trainer(trainer_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Trainer", trainer_id))
    }

    pub async fn create_trainer(&self, actor: &Actor, command: CreateTrainerCommand) -> DomainResult<Trainer> {
        actor.require_admin()?;
        info!("Creating trainer: name={}", command.name.trim());

        let name = validate_name(&command.name)?;
        validate_rate(command.hourly_rate)?;
        let email = clean(command.email);
        validate_email(email.as_deref())?;

        let now = Utc::now();
        let trainer = Trainer {
            id: generate_id(),
            name,
            email,
            phone: clean(command.phone),
            hourly_rate: command.hourly_rate,
            active: command.active,
            created_at: now,
            updated_at: now,
        };
        self.trainer_repository.store_trainer(&trainer).await?;

        info!("Created trainer {} with ID {}", trainer.name, trainer.id);
        Ok(trainer)
    }

    pub async fn update_trainer(
        &self,
        actor: &Actor,
        trainer_id: &str,
        command: UpdateTrainerCommand,
    ) -> DomainResult<Trainer> {
        actor.require_admin()?;
        info!("Updating trainer {}", trainer_id);
        let mut trainer = self.get_trainer(trainer_id).await?;

        if let Some(name) = command.name {
            trainer.name = validate_name(&name)?;
        }
        if let Some(email) = command.email {
            let email = clean(email);
            validate_email(email.as_deref())?;
            trainer.email = email;
        }
        if let Some(phone) = command.phone {
            trainer.phone = clean(phone);
        }
        if let Some(rate) = command.hourly_rate {
            validate_rate(rate)?;
            trainer.hourly_rate = rate;
        }
        if let Some(active) = command.active {
            trainer.active = active;
        }
        trainer.updated_at = Utc::now();
        self.trainer_repository.update_trainer(&trainer).await?;

        Ok(trainer)
    }

    pub async fn delete_trainer(&self, actor: &Actor, trainer_id: &str) -> DomainResult<()> {
        actor.require_admin()?;
        info!("Deleting trainer {}", trainer_id);
        match self.trainer_repository.delete_trainer(trainer_id).await? {
            Removal::Removed => Ok(()),
            Removal::NotFound => Err(DomainError::not_found("Trainer", trainer_id)),
            Removal::InUse(count) => {
                warn!("Trainer {} is still assigned to {} records", trainer_id, count);
                Err(DomainError::Conflict(format!(
                    "Trainer is still assigned to {} activities or series; deactivate it instead",
                    count
                )))
            }
        }
    }

    /// Hours and cost per trainer for activities in an inclusive date range
    pub async fn hours_summary(&self, query: TrainerHoursQuery) -> DomainResult<Vec<TrainerHours>> {
        if query.end < query.start {
            return Err(DomainError::validation("End date must not be before start date"));
        }
        let activities = self
            .activity_repository
            .list_activities(Some(query.start), Some(query.end))
            .await?;
        let trainers: HashMap<String, Trainer> = self
            .trainer_repository
            .list_trainers(false)
            .await?
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();
        Ok(budget::totals_by_trainer(&activities, &trainers))
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("Trainer name cannot be empty"));
    }
    if name.chars().count() > 100 {
        return Err(DomainError::validation("Trainer name cannot exceed 100 characters"));
    }
    Ok(name.to_string())
}

fn validate_rate(rate: f64) -> DomainResult<()> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(DomainError::validation("Hourly rate must be zero or positive"));
    }
    Ok(())
}

fn validate_email(email: Option<&str>) -> DomainResult<()> {
    match email {
        Some(email) if !email.contains('@') => Err(DomainError::Validation(format!(
            "Invalid email address: {}",
            email
        ))),
        _ => Ok(()),
    }
}

/// Trim optional text, treating blank as absent
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dates::parse_date;
    use crate::storage::json::test_utils::{sample_activity, sample_user, TestEnvironment};
    use shared::Role;

    fn admin() -> Actor {
        sample_user("admin", Role::Admin).actor()
    }

    fn create(name: &str, rate: f64) -> CreateTrainerCommand {
        CreateTrainerCommand {
            name: name.to_string(),
            email: Some(" anna@example.com ".to_string()),
            phone: Some("  ".to_string()),
            hourly_rate: rate,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_update_trainer() {
        let env = TestEnvironment::new().await.unwrap();
        let service = TrainerService::new(env.connection.clone());

        let trainer = service.create_trainer(&admin(), create(" Anna ", 20.0)).await.unwrap();
        assert_eq!(trainer.name, "Anna");
        assert_eq!(trainer.email.as_deref(), Some("anna@example.com"));
        assert_eq!(trainer.phone, None);

        let updated = service
            .update_trainer(
                &admin(),
                &trainer.id,
                UpdateTrainerCommand {
                    hourly_rate: Some(25.0),
                    active: Some(false),
                    email: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.hourly_rate, 25.0);
        assert!(!updated.active);
        assert_eq!(updated.email, None);
        assert!(service.list_trainers(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_and_permissions() {
        let env = TestEnvironment::new().await.unwrap();
        let service = TrainerService::new(env.connection.clone());

        assert!(service.create_trainer(&admin(), create("", 20.0)).await.is_err());
        assert!(service.create_trainer(&admin(), create("Anna", -1.0)).await.is_err());
        let trainer_actor = sample_user("coach", Role::Trainer).actor();
        assert!(matches!(
            service.create_trainer(&trainer_actor, create("Anna", 20.0)).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_referenced_trainer_conflicts() {
        let env = TestEnvironment::new().await.unwrap();
        let service = TrainerService::new(env.connection.clone());
        let trainer = service.create_trainer(&admin(), create("Anna", 20.0)).await.unwrap();
        env.seed_references(&["type"], &[]).await.unwrap();
        ActivityRepository::new(env.connection.clone())
            .store_activity(&sample_activity("2025-04-01", "type", &[&trainer.id]))
            .await
            .unwrap();

        assert!(matches!(
            service.delete_trainer(&admin(), &trainer.id).await,
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            service.delete_trainer(&admin(), "missing").await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_hours_summary() {
        let env = TestEnvironment::new().await.unwrap();
        let service = TrainerService::new(env.connection.clone());
        let anna = service.create_trainer(&admin(), create("Anna", 20.0)).await.unwrap();
        let activities = ActivityRepository::new(env.connection.clone());
        env.seed_references(&["type"], &[]).await.unwrap();
        for on in ["2025-04-01", "2025-04-15", "2025-05-01"] {
            let mut activity = sample_activity(on, "type", &[&anna.id]);
            activity.hours = 1.5;
            activities.store_activity(&activity).await.unwrap();
        }

        let summary = service
            .hours_summary(TrainerHoursQuery {
                start: parse_date("2025-04-01").unwrap(),
                end: parse_date("2025-04-30").unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].activity_count, 2);
        assert_eq!(summary[0].hours, 3.0);
        assert_eq!(summary[0].cost, 60.0);
    }
}
