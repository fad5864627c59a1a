use shared::{CreateUserRequest, UpdateUserRequest, User as SharedUser, UserListResponse};

use super::{format_timestamp, text_update};
use crate::domain::commands::users::{CreateUserCommand, UpdateUserCommand};
use crate::domain::models::User as DomainUser;

/// Mapper between user accounts and their public DTO. The password hash
/// never leaves the domain.
pub struct UserMapper;

impl UserMapper {
    pub fn to_dto(domain: DomainUser) -> SharedUser {
        SharedUser {
            id: domain.id,
            username: domain.username,
            role: domain.role,
            trainer_id: domain.trainer_id,
            created_at: format_timestamp(domain.created_at),
            updated_at: format_timestamp(domain.updated_at),
        }
    }

    pub fn to_list_dto(users: Vec<DomainUser>) -> UserListResponse {
        UserListResponse {
            users: users.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_create_command(request: CreateUserRequest) -> CreateUserCommand {
        CreateUserCommand {
            username: request.username,
            password: request.password,
            role: request.role,
            trainer_id: request.trainer_id.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn to_update_command(request: UpdateUserRequest) -> UpdateUserCommand {
        UpdateUserCommand {
            role: request.role,
            password: request.password,
            trainer_id: text_update(request.trainer_id),
        }
    }
}
