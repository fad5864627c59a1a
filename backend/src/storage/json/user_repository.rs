use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use shared::Role;

use super::connection::JsonConnection;
use crate::domain::models::User;
use crate::storage::traits::{IntegrityError, UserStorage};

#[derive(Clone)]
pub struct UserRepository {
    connection: JsonConnection,
}

impl UserRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl UserStorage for UserRepository {
    async fn store_user(&self, user: &User) -> Result<()> {
        self.connection
            .write(|d| {
                if d.users.iter().any(|u| u.username.eq_ignore_ascii_case(&user.username)) {
                    return Err(IntegrityError::DuplicateUsername(user.username.clone()).into());
                }
                if let Some(trainer_id) = &user.trainer_id {
                    d.require_trainer(trainer_id)?;
                }
                d.users.push(user.clone());
                Ok(())
            })
            .await?;
        debug!("Stored user {}", user.username);
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self
            .connection
            .read(|d| d.users.iter().find(|u| u.id == user_id).cloned())
            .await)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let username = username.trim();
        Ok(self
            .connection
            .read(|d| {
                d.users
                    .iter()
                    .find(|u| u.username.eq_ignore_ascii_case(username))
                    .cloned()
            })
            .await)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users = self.connection.read(|d| d.users.clone()).await;
        users.sort_by_key(|u| u.username.to_lowercase());
        Ok(users)
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        self.connection
            .write(|d| {
                if let Some(trainer_id) = &user.trainer_id {
                    d.require_trainer(trainer_id)?;
                }
                let admins = d.admin_count();
                let slot = d
                    .users
                    .iter_mut()
                    .find(|u| u.id == user.id)
                    .ok_or_else(|| anyhow!("User {} not found", user.id))?;
                if slot.role == Role::Admin && user.role != Role::Admin && admins <= 1 {
                    return Err(IntegrityError::LastAdmin.into());
                }
                *slot = user.clone();
                Ok(())
            })
            .await
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool> {
        self.connection
            .write(|d| {
                let is_admin = d.users.iter().any(|u| u.id == user_id && u.role == Role::Admin);
                if is_admin && d.admin_count() <= 1 {
                    return Err(IntegrityError::LastAdmin.into());
                }
                let before = d.users.len();
                d.users.retain(|u| u.id != user_id);
                Ok(d.users.len() < before)
            })
            .await
    }

    async fn count_admins(&self) -> Result<usize> {
        Ok(self.connection.read(|d| d.admin_count()).await)
    }
}
