//! Test environment and record builders for storage and service tests.
//!
//! The temporary directory is removed when the `TestEnvironment` is dropped,
//! even if the test panics.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{NaiveDate, Utc, Weekday};
use shared::{MoneyFlow, Role, SectionKind};
use tempfile::TempDir;

use super::connection::JsonConnection;
use crate::domain::dates::parse_date;
use crate::domain::models::{
    generate_id, Activity, BudgetEntry, BudgetSection, RecurringSeries, Trainer, TrainingPackage,
    TrainingType, User,
};

pub struct TestEnvironment {
    /// Kept alive so the directory survives until drop
    _temp_dir: TempDir,
    pub connection: JsonConnection,
    pub data_file: PathBuf,
}

impl TestEnvironment {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let data_file = temp_dir.path().join("club.json");
        let connection = JsonConnection::open(&data_file).await?;
        Ok(Self {
            _temp_dir: temp_dir,
            connection,
            data_file,
        })
    }

    /// Store placeholder training types and trainers under exactly these
    /// ids, for tests that only need the references to resolve
    pub async fn seed_references(&self, type_ids: &[&str], trainer_ids: &[&str]) -> Result<()> {
        self.connection
            .write(|d| {
                for id in type_ids {
                    let mut training_type = sample_training_type(&format!("Type {}", id));
                    training_type.id = id.to_string();
                    d.training_types.push(training_type);
                }
                for id in trainer_ids {
                    let mut trainer = sample_trainer(&format!("Trainer {}", id), 10.0);
                    trainer.id = id.to_string();
                    d.trainers.push(trainer);
                }
                Ok(())
            })
            .await
    }
}

fn date(value: &str) -> NaiveDate {
    parse_date(value).unwrap_or_else(|| panic!("bad test date {}", value))
}

pub fn sample_user(username: &str, role: Role) -> User {
    User {
        id: generate_id(),
        username: username.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        role,
        trainer_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_trainer(name: &str, hourly_rate: f64) -> Trainer {
    Trainer {
        id: generate_id(),
        name: name.to_string(),
        email: None,
        phone: None,
        hourly_rate,
        active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_training_type(name: &str) -> TrainingType {
    TrainingType {
        id: generate_id(),
        name: name.to_string(),
        color: "#1e88e5".to_string(),
        default_trainer_id: None,
        default_hours: 1.5,
        description: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_activity(on: &str, type_id: &str, trainer_ids: &[&str]) -> Activity {
    Activity {
        id: generate_id(),
        date: date(on),
        training_type_id: type_id.to_string(),
        trainer_ids: trainer_ids.iter().map(|t| t.to_string()).collect(),
        hours: 1.0,
        start_time: None,
        notes: None,
        series_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Mondays from 2025-09-01 to 2025-09-29
pub fn sample_series(type_id: &str, trainer_ids: &[&str]) -> RecurringSeries {
    RecurringSeries {
        id: generate_id(),
        training_type_id: type_id.to_string(),
        trainer_ids: trainer_ids.iter().map(|t| t.to_string()).collect(),
        weekdays: vec![Weekday::Mon],
        start_date: date("2025-09-01"),
        end_date: date("2025-09-29"),
        hours: 1.0,
        start_time: None,
        notes: None,
        excluded_dates: Vec::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_package(name: &str, type_ids: &[&str]) -> TrainingPackage {
    TrainingPackage {
        id: generate_id(),
        name: name.to_string(),
        description: None,
        sessions: 10,
        price: 120.0,
        validity_days: Some(90),
        training_type_ids: type_ids.iter().map(|t| t.to_string()).collect(),
        active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_section(year: i32, name: &str, kind: SectionKind, type_id: Option<&str>) -> BudgetSection {
    BudgetSection {
        id: generate_id(),
        year,
        name: name.to_string(),
        kind,
        training_type_id: type_id.map(str::to_string),
        planned_amount: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_entry(section_id: &str, on: &str, amount: f64, flow: MoneyFlow) -> BudgetEntry {
    BudgetEntry {
        id: generate_id(),
        section_id: section_id.to_string(),
        date: date(on),
        description: "sample".to_string(),
        amount,
        flow,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
