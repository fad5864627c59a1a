use shared::{
    CreateTrainerRequest, Trainer as SharedTrainer, TrainerListResponse, UpdateTrainerRequest,
};

use super::{format_timestamp, text_update};
use crate::domain::commands::trainers::{CreateTrainerCommand, UpdateTrainerCommand};
use crate::domain::models::Trainer as DomainTrainer;

pub struct TrainerMapper;

impl TrainerMapper {
    pub fn to_dto(domain: DomainTrainer) -> SharedTrainer {
        SharedTrainer {
            id: domain.id,
            name: domain.name,
            email: domain.email,
            phone: domain.phone,
            hourly_rate: domain.hourly_rate,
            active: domain.active,
            created_at: format_timestamp(domain.created_at),
            updated_at: format_timestamp(domain.updated_at),
        }
    }

    pub fn to_list_dto(trainers: Vec<DomainTrainer>) -> TrainerListResponse {
        TrainerListResponse {
            trainers: trainers.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_create_command(request: CreateTrainerRequest) -> CreateTrainerCommand {
        CreateTrainerCommand {
            name: request.name,
            email: request.email,
            phone: request.phone,
            hourly_rate: request.hourly_rate,
            active: request.active,
        }
    }

    pub fn to_update_command(request: UpdateTrainerRequest) -> UpdateTrainerCommand {
        UpdateTrainerCommand {
            name: request.name,
            email: text_update(request.email),
            phone: text_update(request.phone),
            hourly_rate: request.hourly_rate,
            active: request.active,
        }
    }
}
