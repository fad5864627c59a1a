use chrono::Utc;
use log::info;

use crate::domain::commands::packages::{CreatePackageCommand, UpdatePackageCommand};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::{generate_id, Actor, TrainingPackage};
use crate::storage::json::{JsonConnection, PackageRepository, TrainingTypeRepository};
use crate::storage::traits::{PackageStorage, TrainingTypeStorage};

/// Service for the training-package catalog
#[derive(Clone)]
pub struct PackageService {
    package_repository: PackageRepository,
    type_repository: TrainingTypeRepository,
}

impl PackageService {
    pub fn new(connection: JsonConnection) -> Self {
        Self {
            package_repository: PackageRepository::new(connection.clone()),
            type_repository: TrainingTypeRepository::new(connection),
        }
    }

    pub async fn list_packages(&self, active_only: bool) -> DomainResult<Vec<TrainingPackage>> {
        Ok(self.package_repository.list_packages(active_only).await?)
    }

    pub async fn get_package(&self, package_id: &str) -> DomainResult<TrainingPackage> {
        self.package_repository
            .get_package(package_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Package", package_id))
    }

    pub async fn create_package(&self, actor: &Actor, command: CreatePackageCommand) -> DomainResult<TrainingPackage> {
        actor.require_admin()?;
        info!("Creating package: name={}", command.name.trim());

        let name = validate_name(&command.name)?;
        validate_sessions(command.sessions)?;
        validate_price(command.price)?;
        validate_validity(command.validity_days)?;
        let training_type_ids = self.validate_types(command.training_type_ids).await?;

        let now = Utc::now();
        let package = TrainingPackage {
            id: generate_id(),
            name,
            description: clean(command.description),
            sessions: command.sessions,
            price: command.price,
            validity_days: command.validity_days,
            training_type_ids,
            active: command.active,
            created_at: now,
            updated_at: now,
        };
        self.package_repository.store_package(&package).await?;

        info!("Created package {} with ID {}", package.name, package.id);
        Ok(package)
    }

    pub async fn update_package(
        &self,
        actor: &Actor,
        package_id: &str,
        command: UpdatePackageCommand,
    ) -> DomainResult<TrainingPackage> {
        actor.require_admin()?;
        info!("Updating package {}", package_id);
        let mut package = self.get_package(package_id).await?;

        if let Some(name) = command.name {
            package.name = validate_name(&name)?;
        }
        if let Some(description) = command.description {
            package.description = clean(description);
        }
        if let Some(sessions) = command.sessions {
            validate_sessions(sessions)?;
            package.sessions = sessions;
        }
        if let Some(price) = command.price {
            validate_price(price)?;
            package.price = price;
        }
        if let Some(validity_days) = command.validity_days {
            validate_validity(validity_days)?;
            package.validity_days = validity_days;
        }
        if let Some(type_ids) = command.training_type_ids {
            package.training_type_ids = self.validate_types(type_ids).await?;
        }
        if let Some(active) = command.active {
            package.active = active;
        }
        package.updated_at = Utc::now();
        self.package_repository.update_package(&package).await?;

        Ok(package)
    }

    pub async fn delete_package(&self, actor: &Actor, package_id: &str) -> DomainResult<()> {
        actor.require_admin()?;
        info!("Deleting package {}", package_id);
        if !self.package_repository.delete_package(package_id).await? {
            return Err(DomainError::not_found("Package", package_id));
        }
        Ok(())
    }

    /// Every referenced type must exist; duplicates are dropped
    async fn validate_types(&self, type_ids: Vec<String>) -> DomainResult<Vec<String>> {
        let mut validated: Vec<String> = Vec::with_capacity(type_ids.len());
        for type_id in type_ids {
            if validated.contains(&type_id) {
                continue;
            }
            if self.type_repository.get_training_type(&type_id).await?.is_none() {
                return Err(DomainError::Validation(format!(
                    "Training type {} does not exist",
                    type_id
                )));
            }
            validated.push(type_id);
        }
        Ok(validated)
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("Package name cannot be empty"));
    }
    Ok(name.to_string())
}

fn validate_sessions(sessions: u32) -> DomainResult<()> {
    if sessions == 0 {
        return Err(DomainError::validation("A package needs at least one session"));
    }
    Ok(())
}

fn validate_price(price: f64) -> DomainResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::validation("Price must be zero or positive"));
    }
    Ok(())
}

fn validate_validity(validity_days: Option<u32>) -> DomainResult<()> {
    if validity_days == Some(0) {
        return Err(DomainError::validation("Validity must be at least one day"));
    }
    Ok(())
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
