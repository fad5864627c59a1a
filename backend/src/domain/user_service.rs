use chrono::Utc;
use log::{info, warn};
use shared::Role;

use crate::domain::auth_service::{hash_password, validate_password, verify_password};
use crate::domain::commands::users::{ChangePasswordCommand, CreateUserCommand, UpdateUserCommand};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::{generate_id, Actor, User};
use crate::storage::json::{JsonConnection, TrainerRepository, UserRepository};
use crate::storage::traits::{TrainerStorage, UserStorage};

const MAX_USERNAME_LENGTH: usize = 50;

/// Service for managing login accounts
#[derive(Clone)]
pub struct UserService {
    user_repository: UserRepository,
    trainer_repository: TrainerRepository,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(connection: JsonConnection, bcrypt_cost: u32) -> Self {
        Self {
            user_repository: UserRepository::new(connection.clone()),
            trainer_repository: TrainerRepository::new(connection),
            bcrypt_cost,
        }
    }

    pub async fn get_user(&self, user_id: &str) -> DomainResult<User> {
        self.user_repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))
    }

    pub async fn list_users(&self, actor: &Actor) -> DomainResult<Vec<User>> {
        actor.require_admin()?;
        let users = self.user_repository.list_users().await?;
        info!("Found {} users", users.len());
        Ok(users)
    }

    pub async fn create_user(&self, actor: &Actor, command: CreateUserCommand) -> DomainResult<User> {
        actor.require_admin()?;
        let username = command.username.trim().to_string();
        info!("Creating user {} with role {:?}", username, command.role);

        validate_username(&username)?;
        validate_password(&command.password)?;
        if self.user_repository.find_user_by_username(&username).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "Username {} is already taken",
                username
            )));
        }
        let trainer_id = normalize_link(command.trainer_id);
        if let Some(trainer_id) = &trainer_id {
            self.ensure_trainer_exists(trainer_id).await?;
        }

        let now = Utc::now();
        let user = User {
            id: generate_id(),
            username,
            password_hash: hash_password(&command.password, self.bcrypt_cost)?,
            role: command.role,
            trainer_id,
            created_at: now,
            updated_at: now,
        };
        self.user_repository.store_user(&user).await?;

        info!("Created user {} with ID {}", user.username, user.id);
        Ok(user)
    }

    pub async fn update_user(
        &self,
        actor: &Actor,
        user_id: &str,
        command: UpdateUserCommand,
    ) -> DomainResult<User> {
        actor.require_admin()?;
        info!("Updating user {}", user_id);
        let mut user = self.get_user(user_id).await?;

        if let Some(role) = command.role {
            if user.role == Role::Admin && role != Role::Admin {
                self.ensure_not_last_admin("demote").await?;
            }
            user.role = role;
        }
        if let Some(password) = command.password {
            validate_password(&password)?;
            user.password_hash = hash_password(&password, self.bcrypt_cost)?;
        }
        if let Some(trainer_id) = command.trainer_id {
            let trainer_id = normalize_link(trainer_id);
            if let Some(trainer_id) = &trainer_id {
                self.ensure_trainer_exists(trainer_id).await?;
            }
            user.trainer_id = trainer_id;
        }
        user.updated_at = Utc::now();
        self.user_repository.update_user(&user).await?;

        info!("Updated user {}", user.username);
        Ok(user)
    }

    pub async fn delete_user(&self, actor: &Actor, user_id: &str) -> DomainResult<()> {
        actor.require_admin()?;
        info!("Deleting user {}", user_id);

        if actor.user_id == user_id {
            return Err(DomainError::Conflict(
                "You cannot delete your own account".to_string(),
            ));
        }
        let user = self.get_user(user_id).await?;
        if user.role == Role::Admin {
            self.ensure_not_last_admin("delete").await?;
        }
        self.user_repository.delete_user(user_id).await?;

        info!("Deleted user {}", user.username);
        Ok(())
    }

    /// Any logged-in user may change their own password
    pub async fn change_password(&self, actor: &Actor, command: ChangePasswordCommand) -> DomainResult<()> {
        let mut user = self.get_user(&actor.user_id).await?;
        if !verify_password(&command.current_password, &user.password_hash) {
            warn!("Password change for {} rejected: wrong current password", user.username);
            return Err(DomainError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }
        validate_password(&command.new_password)?;

        user.password_hash = hash_password(&command.new_password, self.bcrypt_cost)?;
        user.updated_at = Utc::now();
        self.user_repository.update_user(&user).await?;
        info!("Password changed for {}", user.username);
        Ok(())
    }

    /// Create the first administrator when the store has no users at all
    pub async fn ensure_bootstrap_admin(&self, username: &str, password: &str) -> DomainResult<Option<User>> {
        if !self.user_repository.list_users().await?.is_empty() {
            return Ok(None);
        }
        let username = username.trim().to_string();
        validate_username(&username)?;
        validate_password(password)?;

        let now = Utc::now();
        let admin = User {
            id: generate_id(),
            username,
            password_hash: hash_password(password, self.bcrypt_cost)?,
            role: Role::Admin,
            trainer_id: None,
            created_at: now,
            updated_at: now,
        };
        self.user_repository.store_user(&admin).await?;
        warn!(
            "No users found, created administrator {}. Change its password after the first login.",
            admin.username
        );
        Ok(Some(admin))
    }

    async fn ensure_not_last_admin(&self, action: &str) -> DomainResult<()> {
        if self.user_repository.count_admins().await? <= 1 {
            return Err(DomainError::Conflict(format!(
                "Cannot {} the last administrator",
                action
            )));
        }
        Ok(())
    }

    async fn ensure_trainer_exists(&self, trainer_id: &str) -> DomainResult<()> {
        match self.trainer_repository.get_trainer(trainer_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::Validation(format!(
                "Trainer {} does not exist",
                trainer_id
            ))),
        }
    }
}

fn validate_username(username: &str) -> DomainResult<()> {
    if username.is_empty() {
        return Err(DomainError::validation("Username cannot be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(DomainError::Validation(format!(
            "Username cannot exceed {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(DomainError::validation("Username cannot contain spaces"));
    }
    Ok(())
}

/// Blank ids unlink
fn normalize_link(trainer_id: Option<String>) -> Option<String> {
    trainer_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::test_utils::{sample_trainer, TestEnvironment};

    const TEST_COST: u32 = 4;

    async fn setup() -> (TestEnvironment, UserService, Actor) {
        let env = TestEnvironment::new().await.unwrap();
        let service = UserService::new(env.connection.clone(), TEST_COST);
        let admin = service
            .ensure_bootstrap_admin("admin", "changeme123")
            .await
            .unwrap()
            .unwrap();
        (env, service, admin.actor())
    }

    fn create(username: &str, role: Role) -> CreateUserCommand {
        CreateUserCommand {
            username: username.to_string(),
            password: "password123".to_string(),
            role,
            trainer_id: None,
        }
    }

    #[tokio::test]
    async fn test_bootstrap_only_when_empty() {
        let (_env, service, admin) = setup().await;
        assert_eq!(admin.role, Role::Admin);
        assert!(service
            .ensure_bootstrap_admin("other", "changeme123")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_user_rules() {
        let (_env, service, admin) = setup().await;

        let user = service.create_user(&admin, create("member", Role::User)).await.unwrap();
        assert_ne!(user.password_hash, "password123");

        assert!(matches!(
            service.create_user(&admin, create("MEMBER", Role::User)).await,
            Err(DomainError::Conflict(_))
        ));

        let mut short = create("shorty", Role::User);
        short.password = "abc".to_string();
        assert!(matches!(
            service.create_user(&admin, short).await,
            Err(DomainError::Validation(_))
        ));

        assert!(matches!(
            service.create_user(&user.actor(), create("sneaky", Role::Admin)).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_trainer_link_must_exist() {
        let (env, service, admin) = setup().await;

        let mut command = create("coach", Role::Trainer);
        command.trainer_id = Some("missing".to_string());
        assert!(service.create_user(&admin, command).await.is_err());

        let trainer = sample_trainer("Anna", 20.0);
        TrainerRepository::new(env.connection.clone())
            .store_trainer(&trainer)
            .await
            .unwrap();
        let mut command = create("coach", Role::Trainer);
        command.trainer_id = Some(trainer.id.clone());
        let coach = service.create_user(&admin, command).await.unwrap();
        assert_eq!(coach.trainer_id, Some(trainer.id));

        let unlinked = service
            .update_user(
                &admin,
                &coach.id,
                UpdateUserCommand {
                    trainer_id: Some(Some(String::new())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unlinked.trainer_id, None);
    }

    #[tokio::test]
    async fn test_last_admin_is_protected() {
        let (_env, service, admin) = setup().await;
        let member = service.create_user(&admin, create("member", Role::User)).await.unwrap();

        let demote = UpdateUserCommand {
            role: Some(Role::User),
            ..Default::default()
        };
        assert!(matches!(
            service.update_user(&admin, &admin.user_id, demote.clone()).await,
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            service.delete_user(&admin, &admin.user_id).await,
            Err(DomainError::Conflict(_))
        ));

        let second = service.create_user(&admin, create("boss", Role::Admin)).await.unwrap();
        service.update_user(&admin, &second.id, demote).await.unwrap();
        service.delete_user(&admin, &member.id).await.unwrap();
        assert_eq!(service.list_users(&admin).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_admins_deleting_each_other_leave_one_admin() {
        let (_env, service, admin) = setup().await;
        let second = service.create_user(&admin, create("boss", Role::Admin)).await.unwrap();

        let second_actor = second.actor();
        let (a, b) = tokio::join!(
            service.delete_user(&admin, &second.id),
            service.delete_user(&second_actor, &admin.user_id)
        );
        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(DomainError::Conflict(_)))));

        let users = service.user_repository.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Admin);
    }

    #[tokio::test]
    async fn test_change_password() {
        let (_env, service, admin) = setup().await;

        let wrong = ChangePasswordCommand {
            current_password: "not it".to_string(),
            new_password: "newpassword".to_string(),
        };
        assert!(service.change_password(&admin, wrong).await.is_err());

        let right = ChangePasswordCommand {
            current_password: "changeme123".to_string(),
            new_password: "newpassword".to_string(),
        };
        service.change_password(&admin, right).await.unwrap();
        let stored = service.get_user(&admin.user_id).await.unwrap();
        assert!(verify_password("newpassword", &stored.password_hash));
    }
}
