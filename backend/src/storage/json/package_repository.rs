use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::connection::JsonConnection;
use crate::domain::models::TrainingPackage;
use crate::storage::traits::PackageStorage;

#[derive(Clone)]
pub struct PackageRepository {
    connection: JsonConnection,
}

impl PackageRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl PackageStorage for PackageRepository {
    async fn store_package(&self, package: &TrainingPackage) -> Result<()> {
        self.connection
            .write(|d| {
                package
                    .training_type_ids
                    .iter()
                    .try_for_each(|t| d.require_training_type(t))?;
                d.packages.push(package.clone());
                Ok(())
            })
            .await
    }

    async fn get_package(&self, package_id: &str) -> Result<Option<TrainingPackage>> {
        Ok(self
            .connection
            .read(|d| d.packages.iter().find(|p| p.id == package_id).cloned())
            .await)
    }

    async fn list_packages(&self, active_only: bool) -> Result<Vec<TrainingPackage>> {
        let mut packages: Vec<TrainingPackage> = self
            .connection
            .read(|d| {
                d.packages
                    .iter()
                    .filter(|p| !active_only || p.active)
                    .cloned()
                    .collect()
            })
            .await;
        packages.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(packages)
    }

    async fn update_package(&self, package: &TrainingPackage) -> Result<()> {
        self.connection
            .write(|d| {
                package
                    .training_type_ids
                    .iter()
                    .try_for_each(|t| d.require_training_type(t))?;
                let slot = d
                    .packages
                    .iter_mut()
                    .find(|p| p.id == package.id)
                    .ok_or_else(|| anyhow!("Package {} not found", package.id))?;
                *slot = package.clone();
                Ok(())
            })
            .await
    }

    async fn delete_package(&self, package_id: &str) -> Result<bool> {
        self.connection
            .write(|d| {
                let before = d.packages.len();
                d.packages.retain(|p| p.id != package_id);
                Ok(d.packages.len() < before)
            })
            .await
    }
}
