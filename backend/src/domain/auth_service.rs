//! Login, token issuing and token verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use shared::Role;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::User;
use crate::storage::json::{JsonConnection, UserRepository};
use crate::storage::traits::UserStorage;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

#[derive(Clone)]
struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

pub fn hash_password(password: &str, cost: u32) -> DomainResult<String> {
    bcrypt::hash(password, cost)
        .map_err(|e| DomainError::Storage(anyhow::anyhow!("Failed to hash password: {}", e)))
}

/// A malformed stored hash counts as a mismatch
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match bcrypt::verify(password, password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            warn!("Could not verify password hash: {}", e);
            false
        }
    }
}

pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Issues and checks HS256 session tokens
#[derive(Clone)]
pub struct AuthService {
    user_repository: UserRepository,
    keys: Keys,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(connection: JsonConnection, jwt_secret: &[u8], token_ttl_hours: i64) -> Self {
        Self {
            user_repository: UserRepository::new(connection),
            keys: Keys::new(jwt_secret),
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Check credentials and issue a token for the user
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<(User, String)> {
        info!("Login attempt for {}", username.trim());

        let user = self.user_repository.find_user_by_username(username).await?;
        let user = match user {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                warn!("Rejected login for {}", username.trim());
                return Err(DomainError::Unauthorized(
                    "Invalid username or password".to_string(),
                ));
            }
        };

        let token = self.issue_token(&user)?;
        info!("User {} logged in", user.username);
        Ok((user, token))
    }

    pub fn issue_token(&self, user: &User) -> DomainResult<String> {
        let exp = (Utc::now() + self.token_ttl).timestamp().max(0) as usize;
        let claims = Claims {
            sub: user.id.clone(),
            role: user.role,
            exp,
        };
        encode(&Header::default(), &claims, &self.keys.encoding)
            .map_err(|e| DomainError::Storage(anyhow::anyhow!("Failed to sign token: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> DomainResult<Claims> {
        decode::<Claims>(token, &self.keys.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                warn!("Rejected token: {}", e);
                DomainError::Unauthorized("Invalid or expired session".to_string())
            })
    }

    /// Verify a token and load the user it names. The stored role wins over
    /// the one in the claims.
    pub async fn authenticate(&self, token: &str) -> DomainResult<User> {
        let claims = self.verify_token(token)?;
        self.user_repository
            .get_user(&claims.sub)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("Account no longer exists".to_string()))
    }
}
