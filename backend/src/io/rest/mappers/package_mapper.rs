use shared::{
    CreatePackageRequest, PackageListResponse, TrainingPackage as SharedPackage, UpdatePackageRequest,
};

use super::{format_timestamp, text_update};
use crate::domain::commands::packages::{CreatePackageCommand, UpdatePackageCommand};
use crate::domain::models::TrainingPackage as DomainPackage;

pub struct PackageMapper;

impl PackageMapper {
    pub fn to_dto(domain: DomainPackage) -> SharedPackage {
        let price_per_session = domain.price_per_session();
        SharedPackage {
            id: domain.id,
            name: domain.name,
            description: domain.description,
            sessions: domain.sessions,
            price: domain.price,
            validity_days: domain.validity_days,
            training_type_ids: domain.training_type_ids,
            active: domain.active,
            price_per_session,
            created_at: format_timestamp(domain.created_at),
            updated_at: format_timestamp(domain.updated_at),
        }
    }

    pub fn to_list_dto(packages: Vec<DomainPackage>) -> PackageListResponse {
        PackageListResponse {
            packages: packages.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_create_command(request: CreatePackageRequest) -> CreatePackageCommand {
        CreatePackageCommand {
            name: request.name,
            description: request.description,
            sessions: request.sessions,
            price: request.price,
            validity_days: request.validity_days,
            training_type_ids: request.training_type_ids,
            active: request.active,
        }
    }

    /// A validity of 0 days on update removes the limit
    pub fn to_update_command(request: UpdatePackageRequest) -> UpdatePackageCommand {
        UpdatePackageCommand {
            name: request.name,
            description: text_update(request.description),
            sessions: request.sessions,
            price: request.price,
            validity_days: request.validity_days.map(|days| (days > 0).then_some(days)),
            training_type_ids: request.training_type_ids,
            active: request.active,
        }
    }
}
