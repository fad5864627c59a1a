use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::info;

use super::connection::JsonConnection;
use crate::domain::models::TrainingType;
use crate::storage::traits::{Removal, TrainingTypeStorage};

#[derive(Clone)]
pub struct TrainingTypeRepository {
    connection: JsonConnection,
}

impl TrainingTypeRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl TrainingTypeStorage for TrainingTypeRepository {
    async fn store_training_type(&self, training_type: &TrainingType) -> Result<()> {
        self.connection
            .write(|d| {
                d.require_unique_type_name(&training_type.name, &training_type.id)?;
                if let Some(trainer_id) = &training_type.default_trainer_id {
                    d.require_trainer(trainer_id)?;
                }
                d.training_types.push(training_type.clone());
                Ok(())
            })
            .await
    }

    async fn get_training_type(&self, type_id: &str) -> Result<Option<TrainingType>> {
        Ok(self
            .connection
            .read(|d| d.training_types.iter().find(|t| t.id == type_id).cloned())
            .await)
    }

    async fn find_training_type_by_name(&self, name: &str) -> Result<Option<TrainingType>> {
        let name = name.trim();
        Ok(self
            .connection
            .read(|d| {
                d.training_types
                    .iter()
                    .find(|t| t.name.eq_ignore_ascii_case(name))
                    .cloned()
            })
            .await)
    }

    async fn list_training_types(&self) -> Result<Vec<TrainingType>> {
        let mut types = self.connection.read(|d| d.training_types.clone()).await;
        types.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(types)
    }

    async fn update_training_type(&self, training_type: &TrainingType) -> Result<()> {
        self.connection
            .write(|d| {
                d.require_unique_type_name(&training_type.name, &training_type.id)?;
                if let Some(trainer_id) = &training_type.default_trainer_id {
                    d.require_trainer(trainer_id)?;
                }
                let slot = d
                    .training_types
                    .iter_mut()
                    .find(|t| t.id == training_type.id)
                    .ok_or_else(|| anyhow!("Training type {} not found", training_type.id))?;
                *slot = training_type.clone();
                Ok(())
            })
            .await
    }

    async fn delete_training_type(&self, type_id: &str) -> Result<Removal> {
        let removal = self
            .connection
            .write(|d| {
                if !d.training_types.iter().any(|t| t.id == type_id) {
                    return Ok(Removal::NotFound);
                }
                let references = d.training_type_references(type_id);
                if references > 0 {
                    return Ok(Removal::InUse(references));
                }
                d.training_types.retain(|t| t.id != type_id);
                for package in &mut d.packages {
                    package.training_type_ids.retain(|t| t != type_id);
                }
                Ok(Removal::Removed)
            })
            .await?;
        if removal == Removal::Removed {
            info!("Deleted training type {}", type_id);
        }
        Ok(removal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::test_utils::{sample_package, sample_series, sample_training_type, TestEnvironment};
    use crate::storage::json::{PackageRepository, SeriesRepository};
    use crate::storage::traits::{IntegrityError, PackageStorage, SeriesStorage};

    #[tokio::test]
    async fn test_find_by_name_ignores_case() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = TrainingTypeRepository::new(env.connection.clone());
        let youth = sample_training_type("Youth");
        repo.store_training_type(&youth).await.unwrap();
        repo.store_training_type(&sample_training_type("adults")).await.unwrap();

        let found = repo.find_training_type_by_name(" youth ").await.unwrap();
        assert_eq!(found.map(|t| t.id), Some(youth.id));

        let names: Vec<String> = repo
            .list_training_types()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["adults", "Youth"]);
    }

    #[tokio::test]
    async fn test_names_stay_unique_on_store_and_update() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = TrainingTypeRepository::new(env.connection.clone());
        repo.store_training_type(&sample_training_type("Youth")).await.unwrap();

        let err = repo
            .store_training_type(&sample_training_type("YOUTH"))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<IntegrityError>(),
            Some(&IntegrityError::DuplicateTrainingTypeName("Youth".to_string()))
        );

        let mut adults = sample_training_type("Adults");
        repo.store_training_type(&adults).await.unwrap();
        adults.name = "youth".to_string();
        assert!(repo.update_training_type(&adults).await.is_err());
        adults.name = "ADULTS".to_string();
        repo.update_training_type(&adults).await.unwrap();
        assert_eq!(repo.list_training_types().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_checks_series_and_unlinks_packages() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = TrainingTypeRepository::new(env.connection.clone());
        let series_repo = SeriesRepository::new(env.connection.clone());
        let packages = PackageRepository::new(env.connection.clone());

        let youth = sample_training_type("Youth");
        repo.store_training_type(&youth).await.unwrap();
        let series = sample_series(&youth.id, &[]);
        series_repo.store_series(&series, &[]).await.unwrap();
        let package = sample_package("Ten sessions", &[&youth.id]);
        packages.store_package(&package).await.unwrap();

        assert_eq!(repo.delete_training_type(&youth.id).await.unwrap(), Removal::InUse(1));

        series_repo.delete_series(&series.id).await.unwrap();
        assert_eq!(repo.delete_training_type(&youth.id).await.unwrap(), Removal::Removed);
        let package = packages.get_package(&package.id).await.unwrap().unwrap();
        assert!(package.training_type_ids.is_empty());
    }
}
