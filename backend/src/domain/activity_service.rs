//! Activities and recurring series.
//!
//! Writes never block on double-bookings: create and update hand back the
//! conflicts the written activities take part in, and the caller decides
//! what to do with the warning.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use log::{info, warn};

use crate::domain::commands::activities::{
    ActivityQuery, ActivityWithConflicts, ConflictDetails, ConflictQuery, CreateActivityCommand,
    UpdateActivityCommand,
};
use crate::domain::commands::series::{
    CreateSeriesCommand, DeleteSeriesResult, DeleteSeriesScope, SeriesResult, UpdateSeriesCommand,
};
use crate::domain::conflicts::{self, Conflict};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::{generate_id, Activity, ActivityDetails, Actor, RecurringSeries, Trainer, TrainingType};
use crate::domain::recurrence;
use crate::domain::training_type_service::validate_hours;
use crate::storage::json::{
    ActivityRepository, JsonConnection, SeriesRepository, TrainerRepository, TrainingTypeRepository,
};
use crate::storage::traits::{ActivityStorage, SeriesStorage, TrainerStorage, TrainingTypeStorage};

/// Trainers and training types by id, for enriching activities
struct Directory {
    trainers: HashMap<String, Trainer>,
    types: HashMap<String, TrainingType>,
}

impl Directory {
    fn details(&self, activity: Activity) -> ActivityDetails {
        let training_type = self.types.get(&activity.training_type_id).cloned();
        let trainers = activity
            .trainer_ids
            .iter()
            .filter_map(|id| self.trainers.get(id).cloned())
            .collect();
        ActivityDetails {
            activity,
            training_type,
            trainers,
        }
    }

    fn conflict_details(&self, conflicts: Vec<Conflict>) -> Vec<ConflictDetails> {
        conflicts
            .into_iter()
            .map(|conflict| {
                let trainer_name = self
                    .trainers
                    .get(&conflict.trainer_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| conflict.trainer_id.clone());
                ConflictDetails {
                    conflict,
                    trainer_name,
                }
            })
            .collect()
    }
}

/// Service for scheduling activities and recurring series
#[derive(Clone)]
pub struct ActivityService {
    activity_repository: ActivityRepository,
    series_repository: SeriesRepository,
    trainer_repository: TrainerRepository,
    type_repository: TrainingTypeRepository,
}

impl ActivityService {
    pub fn new(connection: JsonConnection) -> Self {
        Self {
            activity_repository: ActivityRepository::new(connection.clone()),
            series_repository: SeriesRepository::new(connection.clone()),
            trainer_repository: TrainerRepository::new(connection.clone()),
            type_repository: TrainingTypeRepository::new(connection),
        }
    }

    /// Activities matching the query, ordered by date and start time
    pub async fn list_activities(&self, query: &ActivityQuery) -> DomainResult<Vec<ActivityDetails>> {
        if let (Some(start), Some(end)) = (query.start, query.end) {
            validate_range(start, end)?;
        }
        let activities = self
            .activity_repository
            .list_activities(query.start, query.end)
            .await?;
        let directory = self.directory().await?;

        let details: Vec<ActivityDetails> = activities
            .into_iter()
            .filter(|a| query.trainer_id.as_deref().map_or(true, |t| a.has_trainer(t)))
            .filter(|a| {
                query
                    .training_type_id
                    .as_deref()
                    .map_or(true, |t| a.training_type_id == t)
            })
            .map(|a| directory.details(a))
            .collect();
        info!("Listed {} activities", details.len());
        Ok(details)
    }

    pub async fn get_activity(&self, activity_id: &str) -> DomainResult<ActivityDetails> {
        let activity = self.require_activity(activity_id).await?;
        Ok(self.directory().await?.details(activity))
    }

    pub async fn create_activity(
        &self,
        actor: &Actor,
        command: CreateActivityCommand,
    ) -> DomainResult<ActivityWithConflicts> {
        info!(
            "Creating activity: date={}, type={}",
            command.date, command.training_type_id
        );
        let training_type = self.require_training_type(&command.training_type_id).await?;
        let trainer_ids = self
            .validate_trainers(command.trainer_ids.unwrap_or_else(|| default_trainers(&training_type)))
            .await?;
        actor.require_assignment(&trainer_ids)?;
        let hours = command.hours.unwrap_or(training_type.default_hours);
        validate_hours(hours)?;

        let now = Utc::now();
        let activity = Activity {
            id: generate_id(),
            date: command.date,
            training_type_id: training_type.id.clone(),
            trainer_ids,
            hours,
            start_time: command.start_time,
            notes: clean(command.notes),
            series_id: None,
            created_at: now,
            updated_at: now,
        };
        self.activity_repository.store_activity(&activity).await?;
        info!("Created activity {} on {}", activity.id, activity.date);

        self.with_conflicts(activity).await
    }

    pub async fn update_activity(
        &self,
        actor: &Actor,
        activity_id: &str,
        command: UpdateActivityCommand,
    ) -> DomainResult<ActivityWithConflicts> {
        info!("Updating activity {}", activity_id);
        let mut activity = self.require_activity(activity_id).await?;
        actor.require_assignment(&activity.trainer_ids)?;

        if let Some(date) = command.date {
            activity.date = date;
        }
        if let Some(type_id) = command.training_type_id {
            activity.training_type_id = self.require_training_type(&type_id).await?.id;
        }
        if let Some(trainer_ids) = command.trainer_ids {
            activity.trainer_ids = self.validate_trainers(trainer_ids).await?;
        }
        if let Some(hours) = command.hours {
            validate_hours(hours)?;
            activity.hours = hours;
        }
        if let Some(start_time) = command.start_time {
            activity.start_time = start_time;
        }
        if let Some(notes) = command.notes {
            activity.notes = clean(notes);
        }
        if command.detach && activity.series_id.is_some() {
            info!("Detaching activity {} from its series", activity.id);
            activity.series_id = None;
        }
        actor.require_assignment(&activity.trainer_ids)?;

        activity.updated_at = Utc::now();
        self.activity_repository.update_activity(&activity).await?;

        self.with_conflicts(activity).await
    }

    pub async fn delete_activity(&self, actor: &Actor, activity_id: &str) -> DomainResult<()> {
        info!("Deleting activity {}", activity_id);
        let activity = self.require_activity(activity_id).await?;
        actor.require_assignment(&activity.trainer_ids)?;
        self.activity_repository.delete_activity(activity_id).await?;
        Ok(())
    }

    /// Double-bookings in an inclusive date range, optionally for one trainer
    pub async fn list_conflicts(&self, query: &ConflictQuery) -> DomainResult<Vec<ConflictDetails>> {
        validate_range(query.start, query.end)?;
        let activities = self
            .activity_repository
            .list_activities(Some(query.start), Some(query.end))
            .await?;
        let found: Vec<Conflict> = conflicts::detect_conflicts(&activities)
            .into_iter()
            .filter(|c| query.trainer_id.as_deref().map_or(true, |t| c.trainer_id == t))
            .collect();
        if !found.is_empty() {
            warn!(
                "Found {} conflicts between {} and {}",
                found.len(),
                query.start,
                query.end
            );
        }
        Ok(self.directory().await?.conflict_details(found))
    }

    pub async fn list_series(&self) -> DomainResult<Vec<RecurringSeries>> {
        Ok(self.series_repository.list_series().await?)
    }

    pub async fn get_series(&self, series_id: &str) -> DomainResult<SeriesResult> {
        let series = self.require_series(series_id).await?;
        let occurrences = self.activity_repository.list_series_activities(series_id).await?;
        let conflicts = self.conflicts_for(&occurrences).await?;
        Ok(SeriesResult {
            series,
            activity_count: occurrences.len(),
            conflicts,
        })
    }

    /// Store the template and one activity per occurrence
    pub async fn create_series(&self, actor: &Actor, command: CreateSeriesCommand) -> DomainResult<SeriesResult> {
        info!(
            "Creating series: type={}, {} to {}",
            command.training_type_id, command.start_date, command.end_date
        );
        let training_type = self.require_training_type(&command.training_type_id).await?;
        let trainer_ids = self
            .validate_trainers(command.trainer_ids.unwrap_or_else(|| default_trainers(&training_type)))
            .await?;
        actor.require_assignment(&trainer_ids)?;
        let hours = command.hours.unwrap_or(training_type.default_hours);
        validate_hours(hours)?;
        let weekdays = recurrence::normalize_weekdays(&command.weekdays);
        recurrence::validate_template(command.start_date, command.end_date, &weekdays)?;

        let now = Utc::now();
        let series = RecurringSeries {
            id: generate_id(),
            training_type_id: training_type.id.clone(),
            trainer_ids,
            weekdays,
            start_date: command.start_date,
            end_date: command.end_date,
            hours,
            start_time: command.start_time,
            notes: clean(command.notes),
            excluded_dates: normalize_dates(command.excluded_dates),
            created_at: now,
            updated_at: now,
        };
        let occurrences = series.materialize_from(series.start_date, now);
        if occurrences.is_empty() {
            return Err(DomainError::validation(
                "The series has no occurrences in its date range",
            ));
        }
        self.series_repository.store_series(&series, &occurrences).await?;

        let conflicts = self.conflicts_for(&occurrences).await?;
        Ok(SeriesResult {
            series,
            activity_count: occurrences.len(),
            conflicts,
        })
    }

    /// Update the template and regenerate occurrences on or after `from`.
    /// Earlier occurrences, including edited ones, stay as they are.
    pub async fn update_series(
        &self,
        actor: &Actor,
        series_id: &str,
        command: UpdateSeriesCommand,
    ) -> DomainResult<SeriesResult> {
        info!("Updating series {}", series_id);
        let mut series = self.require_series(series_id).await?;
        actor.require_assignment(&series.trainer_ids)?;

        if let Some(type_id) = command.training_type_id {
            series.training_type_id = self.require_training_type(&type_id).await?.id;
        }
        if let Some(trainer_ids) = command.trainer_ids {
            series.trainer_ids = self.validate_trainers(trainer_ids).await?;
        }
        if let Some(weekdays) = command.weekdays {
            series.weekdays = recurrence::normalize_weekdays(&weekdays);
        }
        if let Some(end_date) = command.end_date {
            series.end_date = end_date;
        }
        if let Some(hours) = command.hours {
            validate_hours(hours)?;
            series.hours = hours;
        }
        if let Some(start_time) = command.start_time {
            series.start_time = start_time;
        }
        if let Some(notes) = command.notes {
            series.notes = clean(notes);
        }
        if let Some(excluded) = command.excluded_dates {
            series.excluded_dates = normalize_dates(excluded);
        }
        recurrence::validate_template(series.start_date, series.end_date, &series.weekdays)?;
        actor.require_assignment(&series.trainer_ids)?;

        let from = command.from.unwrap_or(series.start_date).max(series.start_date);
        let now = Utc::now();
        series.updated_at = now;
        let regenerated = series.materialize_from(from, now);
        let removed = self
            .series_repository
            .replace_series_from(&series, from, &regenerated)
            .await?;
        info!(
            "Series {} regenerated from {}: {} removed, {} created",
            series.id,
            from,
            removed,
            regenerated.len()
        );

        let activity_count = self
            .activity_repository
            .list_series_activities(series_id)
            .await?
            .len();
        let conflicts = self.conflicts_for(&regenerated).await?;
        Ok(SeriesResult {
            series,
            activity_count,
            conflicts,
        })
    }

    pub async fn delete_series(
        &self,
        actor: &Actor,
        series_id: &str,
        scope: DeleteSeriesScope,
    ) -> DomainResult<DeleteSeriesResult> {
        info!("Deleting series {} ({:?})", series_id, scope);
        let series = self.require_series(series_id).await?;
        actor.require_assignment(&series.trainer_ids)?;

        let removal = match scope {
            DeleteSeriesScope::All => self.series_repository.delete_series(series_id).await?,
            DeleteSeriesScope::From(from) => {
                self.series_repository.truncate_series(series_id, from).await?
            }
        }
        .ok_or_else(|| DomainError::not_found("Series", series_id))?;

        info!(
            "Series {}: removed {} occurrences, template removed: {}",
            series_id, removal.deleted_activities, removal.series_removed
        );
        Ok(DeleteSeriesResult {
            deleted_activities: removal.deleted_activities,
            series_removed: removal.series_removed,
        })
    }

    async fn directory(&self) -> DomainResult<Directory> {
        let trainers = self
            .trainer_repository
            .list_trainers(false)
            .await?
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();
        let types = self
            .type_repository
            .list_training_types()
            .await?
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();
        Ok(Directory { trainers, types })
    }

    async fn with_conflicts(&self, activity: Activity) -> DomainResult<ActivityWithConflicts> {
        let conflicts = self.conflicts_for(std::slice::from_ref(&activity)).await?;
        if !conflicts.is_empty() {
            warn!("Activity {} conflicts with {} others", activity.id, conflicts.len());
        }
        Ok(ActivityWithConflicts {
            activity: self.directory().await?.details(activity),
            conflicts,
        })
    }

    /// Conflicts any of `activities` take part in
    async fn conflicts_for(&self, activities: &[Activity]) -> DomainResult<Vec<ConflictDetails>> {
        let (Some(start), Some(end)) = (
            activities.iter().map(|a| a.date).min(),
            activities.iter().map(|a| a.date).max(),
        ) else {
            return Ok(Vec::new());
        };
        let neighbours = self
            .activity_repository
            .list_activities(Some(start), Some(end))
            .await?;
        let ids: Vec<String> = activities.iter().map(|a| a.id.clone()).collect();
        let found = conflicts::conflicts_involving(&neighbours, &ids);
        Ok(self.directory().await?.conflict_details(found))
    }

    async fn require_activity(&self, activity_id: &str) -> DomainResult<Activity> {
        self.activity_repository
            .get_activity(activity_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Activity", activity_id))
    }

    async fn require_series(&self, series_id: &str) -> DomainResult<RecurringSeries> {
        self.series_repository
            .get_series(series_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Series", series_id))
    }

    async fn require_training_type(&self, type_id: &str) -> DomainResult<TrainingType> {
        self.type_repository
            .get_training_type(type_id)
            .await?
            .ok_or_else(|| DomainError::Validation(format!("Training type {} does not exist", type_id)))
    }

    /// Trimmed, deduplicated in order, and every trainer must exist
    async fn validate_trainers(&self, trainer_ids: Vec<String>) -> DomainResult<Vec<String>> {
        let mut validated: Vec<String> = Vec::with_capacity(trainer_ids.len());
        for trainer_id in trainer_ids {
            let trainer_id = trainer_id.trim().to_string();
            if trainer_id.is_empty() || validated.contains(&trainer_id) {
                continue;
            }
            if self.trainer_repository.get_trainer(&trainer_id).await?.is_none() {
                return Err(DomainError::Validation(format!(
                    "Trainer {} does not exist",
                    trainer_id
                )));
            }
            validated.push(trainer_id);
        }
        Ok(validated)
    }
}

fn default_trainers(training_type: &TrainingType) -> Vec<String> {
    training_type.default_trainer_id.iter().cloned().collect()
}

fn validate_range(start: NaiveDate, end: NaiveDate) -> DomainResult<()> {
    if end < start {
        return Err(DomainError::validation("End date must not be before start date"));
    }
    Ok(())
}

fn normalize_dates(mut dates: Vec<NaiveDate>) -> Vec<NaiveDate> {
    dates.sort();
    dates.dedup();
    dates
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
