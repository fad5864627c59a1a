use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::Role;

use crate::domain::error::{DomainError, DomainResult};

/// Login account. `trainer_id` links the account to a trainer record so a
/// trainer can edit their own activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub trainer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.id.clone(),
            role: self.role,
            trainer_id: self.trainer_id.clone(),
        }
    }
}

/// The authenticated caller of a domain operation
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
    pub trainer_id: Option<String>,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> DomainResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "Administrator role required".to_string(),
            ))
        }
    }

    /// Admins edit everything; trainers only assignments that include their
    /// linked trainer record.
    pub fn can_edit_assignment(&self, trainer_ids: &[String]) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Trainer => self
                .trainer_id
                .as_ref()
                .is_some_and(|own| trainer_ids.contains(own)),
            Role::User => false,
        }
    }

    pub fn require_assignment(&self, trainer_ids: &[String]) -> DomainResult<()> {
        if self.can_edit_assignment(trainer_ids) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "Only admins or an assigned trainer may change this activity".to_string(),
            ))
        }
    }
}
