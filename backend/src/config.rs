//! Server configuration read from `CLUB_*` environment variables.
//!
//! `main` loads a `.env` file with dotenvy before calling
//! [`Config::from_env`], so either source works.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use log::warn;

pub const DEFAULT_DATA_FILE: &str = "data/club.json";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "changeme123";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON document holding all club data
    pub data_file: PathBuf,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Credentials of the admin created when the store has no users
    pub admin_username: String,
    pub admin_password: String,
    pub cors_origin: String,
    /// Built frontend served at `/` when set
    pub static_dir: Option<PathBuf>,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = match value("CLUB_JWT_SECRET") {
            Some(secret) => secret,
            None => {
                warn!("CLUB_JWT_SECRET is not set, generating a random secret; tokens will not survive a restart");
                format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
            }
        };

        let token_ttl_hours = parse_or(value("CLUB_TOKEN_TTL_HOURS"), "CLUB_TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        if token_ttl_hours <= 0 {
            return Err(anyhow!("CLUB_TOKEN_TTL_HOURS must be positive, got {}", token_ttl_hours));
        }

        let bcrypt_cost = parse_or(value("CLUB_BCRYPT_COST"), "CLUB_BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(anyhow!("CLUB_BCRYPT_COST must be between 4 and 31, got {}", bcrypt_cost));
        }

        let bind_addr = value("CLUB_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("CLUB_BIND_ADDR is not a socket address: {}", bind_addr))?;

        Ok(Self {
            data_file: value("CLUB_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            bind_addr,
            jwt_secret,
            token_ttl_hours,
            admin_username: value("CLUB_ADMIN_USERNAME").unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string()),
            admin_password: value("CLUB_ADMIN_PASSWORD").unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
            cors_origin: value("CLUB_CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            static_dir: value("CLUB_STATIC_DIR").map(PathBuf::from),
            bcrypt_cost,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{} has an invalid value {:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.data_file, PathBuf::from("data/club.json"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.admin_username, "admin");
        assert_eq!(config.admin_password, "changeme123");
        assert_eq!(config.cors_origin, "http://localhost:8080");
        assert_eq!(config.static_dir, None);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.jwt_secret.len(), 64);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CLUB_DATA_FILE", "/var/lib/club/data.json"),
            ("CLUB_BIND_ADDR", "0.0.0.0:8000"),
            ("CLUB_JWT_SECRET", "s3cret"),
            ("CLUB_TOKEN_TTL_HOURS", "2"),
            ("CLUB_STATIC_DIR", "dist"),
            ("CLUB_BCRYPT_COST", "6"),
        ])
        .unwrap();
        assert_eq!(config.data_file, PathBuf::from("/var/lib/club/data.json"));
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.token_ttl_hours, 2);
        assert_eq!(config.static_dir, Some(PathBuf::from("dist")));
        assert_eq!(config.bcrypt_cost, 6);
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        assert!(config_from(&[("CLUB_TOKEN_TTL_HOURS", "a day")]).is_err());
        assert!(config_from(&[("CLUB_TOKEN_TTL_HOURS", "0")]).is_err());
        assert!(config_from(&[("CLUB_BCRYPT_COST", "99")]).is_err());
        assert!(config_from(&[("CLUB_BIND_ADDR", "localhost")]).is_err());
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("CLUB_ADMIN_USERNAME", "  ")]).unwrap();
        assert_eq!(config.admin_username, "admin");
    }
}
