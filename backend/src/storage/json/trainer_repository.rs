use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::info;

use super::connection::JsonConnection;
use crate::domain::models::Trainer;
use crate::storage::traits::{Removal, TrainerStorage};

#[derive(Clone)]
pub struct TrainerRepository {
    connection: JsonConnection,
}

impl TrainerRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl TrainerStorage for TrainerRepository {
    async fn store_trainer(&self, trainer: &Trainer) -> Result<()> {
        self.connection
            .write(|d| {
                d.trainers.push(trainer.clone());
                Ok(())
            })
            .await
    }

    async fn get_trainer(&self, trainer_id: &str) -> Result<Option<Trainer>> {
        Ok(self
            .connection
            .read(|d| d.trainers.iter().find(|t| t.id == trainer_id).cloned())
            .await)
    }

    async fn list_trainers(&self, active_only: bool) -> Result<Vec<Trainer>> {
        let mut trainers: Vec<Trainer> = self
            .connection
            .read(|d| {
                d.trainers
                    .iter()
                    .filter(|t| !active_only || t.active)
                    .cloned()
                    .collect()
            })
            .await;
        trainers.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(trainers)
    }

    async fn update_trainer(&self, trainer: &Trainer) -> Result<()> {
        self.connection
            .write(|d| {
                let slot = d
                    .trainers
                    .iter_mut()
                    .find(|t| t.id == trainer.id)
                    .ok_or_else(|| anyhow!("Trainer {} not found", trainer.id))?;
                *slot = trainer.clone();
                Ok(())
            })
            .await
    }

    async fn delete_trainer(&self, trainer_id: &str) -> Result<Removal> {
        let removal = self
            .connection
            .write(|d| {
                if !d.trainers.iter().any(|t| t.id == trainer_id) {
                    return Ok(Removal::NotFound);
                }
                let references = d.trainer_references(trainer_id);
                if references > 0 {
                    return Ok(Removal::InUse(references));
                }
                d.trainers.retain(|t| t.id != trainer_id);
                for training_type in &mut d.training_types {
                    if training_type.default_trainer_id.as_deref() == Some(trainer_id) {
                        training_type.default_trainer_id = None;
                    }
                }
                for user in &mut d.users {
                    if user.trainer_id.as_deref() == Some(trainer_id) {
                        user.trainer_id = None;
                    }
                }
                Ok(Removal::Removed)
            })
            .await?;
        if removal == Removal::Removed {
            info!("Deleted trainer {} and cleared its links", trainer_id);
        }
        Ok(removal)
    }
}
