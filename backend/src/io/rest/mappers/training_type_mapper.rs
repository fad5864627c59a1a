use shared::{
    CreateTrainingTypeRequest, TrainingType as SharedTrainingType, TrainingTypeListResponse,
    UpdateTrainingTypeRequest,
};

use super::{format_timestamp, text_update};
use crate::domain::commands::training_types::{CreateTrainingTypeCommand, UpdateTrainingTypeCommand};
use crate::domain::models::TrainingType as DomainTrainingType;

pub struct TrainingTypeMapper;

impl TrainingTypeMapper {
    pub fn to_dto(domain: DomainTrainingType) -> SharedTrainingType {
        SharedTrainingType {
            id: domain.id,
            name: domain.name,
            color: domain.color,
            default_trainer_id: domain.default_trainer_id,
            default_hours: domain.default_hours,
            description: domain.description,
            created_at: format_timestamp(domain.created_at),
            updated_at: format_timestamp(domain.updated_at),
        }
    }

    pub fn to_list_dto(types: Vec<DomainTrainingType>) -> TrainingTypeListResponse {
        TrainingTypeListResponse {
            training_types: types.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_create_command(request: CreateTrainingTypeRequest) -> CreateTrainingTypeCommand {
        CreateTrainingTypeCommand {
            name: request.name,
            color: request.color,
            default_trainer_id: request.default_trainer_id.filter(|t| !t.trim().is_empty()),
            default_hours: request.default_hours,
            description: request.description,
        }
    }

    pub fn to_update_command(request: UpdateTrainingTypeRequest) -> UpdateTrainingTypeCommand {
        UpdateTrainingTypeCommand {
            name: request.name,
            color: request.color,
            default_trainer_id: text_update(request.default_trainer_id),
            default_hours: request.default_hours,
            description: text_update(request.description),
        }
    }
}
