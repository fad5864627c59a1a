//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer and are not
//! exposed over the public API. The REST layer maps the wire DTOs from the
//! `shared` crate onto them, parsing dates and times on the way in.
//!
//! On update commands `None` leaves a field unchanged. For optional fields
//! the inner `Option` distinguishes "set" from "clear".

pub mod users {
    use shared::Role;

    #[derive(Debug, Clone)]
    pub struct CreateUserCommand {
        pub username: String,
        pub password: String,
        pub role: Role,
        pub trainer_id: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateUserCommand {
        pub role: Option<Role>,
        pub password: Option<String>,
        pub trainer_id: Option<Option<String>>,
    }

    #[derive(Debug, Clone)]
    pub struct ChangePasswordCommand {
        pub current_password: String,
        pub new_password: String,
    }
}

pub mod trainers {
    use chrono::NaiveDate;

    #[derive(Debug, Clone)]
    pub struct CreateTrainerCommand {
        pub name: String,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub hourly_rate: f64,
        pub active: bool,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateTrainerCommand {
        pub name: Option<String>,
        pub email: Option<Option<String>>,
        pub phone: Option<Option<String>>,
        pub hourly_rate: Option<f64>,
        pub active: Option<bool>,
    }

    /// Inclusive date range for the hours summary
    #[derive(Debug, Clone)]
    pub struct TrainerHoursQuery {
        pub start: NaiveDate,
        pub end: NaiveDate,
    }
}

pub mod training_types {
    #[derive(Debug, Clone)]
    pub struct CreateTrainingTypeCommand {
        pub name: String,
        pub color: String,
        pub default_trainer_id: Option<String>,
        pub default_hours: f64,
        pub description: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateTrainingTypeCommand {
        pub name: Option<String>,
        pub color: Option<String>,
        pub default_trainer_id: Option<Option<String>>,
        pub default_hours: Option<f64>,
        pub description: Option<Option<String>>,
    }
}

pub mod activities {
    use chrono::{NaiveDate, NaiveTime};

    use crate::domain::conflicts::Conflict;
    use crate::domain::models::ActivityDetails;

    /// Filters for listing activities. Date bounds are inclusive.
    #[derive(Debug, Clone, Default)]
    pub struct ActivityQuery {
        pub start: Option<NaiveDate>,
        pub end: Option<NaiveDate>,
        pub trainer_id: Option<String>,
        pub training_type_id: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct CreateActivityCommand {
        pub date: NaiveDate,
        pub training_type_id: String,
        /// `None` falls back to the type's default trainer
        pub trainer_ids: Option<Vec<String>>,
        /// `None` falls back to the type's default hours
        pub hours: Option<f64>,
        pub start_time: Option<NaiveTime>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateActivityCommand {
        pub date: Option<NaiveDate>,
        pub training_type_id: Option<String>,
        pub trainer_ids: Option<Vec<String>>,
        pub hours: Option<f64>,
        pub start_time: Option<Option<NaiveTime>>,
        pub notes: Option<Option<String>>,
        pub detach: bool,
    }

    #[derive(Debug, Clone)]
    pub struct ConflictQuery {
        pub start: NaiveDate,
        pub end: NaiveDate,
        pub trainer_id: Option<String>,
    }

    /// A conflict with the name of the double-booked trainer
    #[derive(Debug, Clone, PartialEq)]
    pub struct ConflictDetails {
        pub conflict: Conflict,
        pub trainer_name: String,
    }

    /// Stored activity and the conflicts it takes part in
    #[derive(Debug, Clone)]
    pub struct ActivityWithConflicts {
        pub activity: ActivityDetails,
        pub conflicts: Vec<ConflictDetails>,
    }
}

pub mod series {
    use chrono::{NaiveDate, NaiveTime, Weekday};

    use super::activities::ConflictDetails;
    use crate::domain::models::RecurringSeries;

    #[derive(Debug, Clone)]
    pub struct CreateSeriesCommand {
        pub training_type_id: String,
        pub trainer_ids: Option<Vec<String>>,
        pub weekdays: Vec<Weekday>,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub hours: Option<f64>,
        pub start_time: Option<NaiveTime>,
        pub notes: Option<String>,
        pub excluded_dates: Vec<NaiveDate>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateSeriesCommand {
        pub training_type_id: Option<String>,
        pub trainer_ids: Option<Vec<String>>,
        pub weekdays: Option<Vec<Weekday>>,
        pub end_date: Option<NaiveDate>,
        pub hours: Option<f64>,
        pub start_time: Option<Option<NaiveTime>>,
        pub notes: Option<Option<String>>,
        pub excluded_dates: Option<Vec<NaiveDate>>,
        /// Occurrences on or after this date are regenerated; defaults to the
        /// series start
        pub from: Option<NaiveDate>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum DeleteSeriesScope {
        All,
        From(NaiveDate),
    }

    #[derive(Debug, Clone)]
    pub struct SeriesResult {
        pub series: RecurringSeries,
        pub activity_count: usize,
        pub conflicts: Vec<ConflictDetails>,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DeleteSeriesResult {
        pub deleted_activities: usize,
        pub series_removed: bool,
    }
}

pub mod packages {
    #[derive(Debug, Clone)]
    pub struct CreatePackageCommand {
        pub name: String,
        pub description: Option<String>,
        pub sessions: u32,
        pub price: f64,
        pub validity_days: Option<u32>,
        pub training_type_ids: Vec<String>,
        pub active: bool,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdatePackageCommand {
        pub name: Option<String>,
        pub description: Option<Option<String>>,
        pub sessions: Option<u32>,
        pub price: Option<f64>,
        pub validity_days: Option<Option<u32>>,
        pub training_type_ids: Option<Vec<String>>,
        pub active: Option<bool>,
    }
}

pub mod budget {
    use chrono::NaiveDate;
    use shared::{MoneyFlow, SectionKind};

    #[derive(Debug, Clone)]
    pub struct CreateSectionCommand {
        pub year: i32,
        pub name: String,
        pub kind: SectionKind,
        pub training_type_id: Option<String>,
        pub planned_amount: Option<f64>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateSectionCommand {
        pub name: Option<String>,
        /// `Some(None)` removes the plan
        pub planned_amount: Option<Option<f64>>,
        pub training_type_id: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct CreateEntryCommand {
        pub section_id: String,
        pub date: NaiveDate,
        pub description: String,
        pub amount: f64,
        pub flow: MoneyFlow,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateEntryCommand {
        pub date: Option<NaiveDate>,
        pub description: Option<String>,
        pub amount: Option<f64>,
        pub flow: Option<MoneyFlow>,
    }
}
