use shared::{
    ActivityListResponse, ActivityResponse, ActivityView, Conflict as SharedConflict,
    ConflictListResponse, CreateActivityRequest, UpdateActivityRequest,
};

use super::{parse_date, parse_optional_date, parse_optional_time, parse_time_update, text_update};
use crate::domain::commands::activities::{
    ActivityWithConflicts, ConflictDetails, CreateActivityCommand, UpdateActivityCommand,
};
use crate::domain::dates::{format_date, format_time};
use crate::domain::models::ActivityDetails;
use crate::io::rest::error::ApiError;

/// Color used when an activity points at a training type that no longer exists
const FALLBACK_COLOR: &str = "#808080";

pub struct ActivityMapper;

impl ActivityMapper {
    /// Flatten an activity and its joined records into the calendar view
    pub fn to_view(details: ActivityDetails) -> ActivityView {
        let ActivityDetails {
            activity,
            training_type,
            trainers,
        } = details;
        let end_time = activity.end_time().map(format_time);
        let (training_type_name, color) = match training_type {
            Some(t) => (t.name, t.color),
            None => (activity.training_type_id.clone(), FALLBACK_COLOR.to_string()),
        };
        let trainer_names = activity
            .trainer_ids
            .iter()
            .map(|id| {
                trainers
                    .iter()
                    .find(|t| &t.id == id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| id.clone())
            })
            .collect();

        ActivityView {
            id: activity.id,
            date: format_date(activity.date),
            start_time: activity.start_time.map(format_time),
            end_time,
            hours: activity.hours,
            training_type_id: activity.training_type_id,
            training_type_name,
            color,
            trainer_ids: activity.trainer_ids,
            trainer_names,
            notes: activity.notes,
            series_id: activity.series_id,
        }
    }

    pub fn to_views(activities: Vec<ActivityDetails>) -> Vec<ActivityView> {
        activities.into_iter().map(Self::to_view).collect()
    }

    pub fn to_list_dto(activities: Vec<ActivityDetails>) -> ActivityListResponse {
        ActivityListResponse {
            activities: Self::to_views(activities),
        }
    }

    pub fn conflict_to_dto(details: ConflictDetails) -> SharedConflict {
        SharedConflict {
            date: format_date(details.conflict.date),
            trainer_id: details.conflict.trainer_id,
            trainer_name: details.trainer_name,
            first_activity_id: details.conflict.first_activity_id,
            second_activity_id: details.conflict.second_activity_id,
        }
    }

    pub fn conflicts_to_dto(conflicts: Vec<ConflictDetails>) -> Vec<SharedConflict> {
        conflicts.into_iter().map(Self::conflict_to_dto).collect()
    }

    pub fn to_conflict_list_dto(conflicts: Vec<ConflictDetails>) -> ConflictListResponse {
        ConflictListResponse {
            conflicts: Self::conflicts_to_dto(conflicts),
        }
    }

    pub fn to_response(result: ActivityWithConflicts) -> ActivityResponse {
        ActivityResponse {
            activity: Self::to_view(result.activity),
            conflicts: Self::conflicts_to_dto(result.conflicts),
        }
    }

    pub fn to_create_command(request: CreateActivityRequest) -> Result<CreateActivityCommand, ApiError> {
        Ok(CreateActivityCommand {
            date: parse_date("date", &request.date)?,
            training_type_id: request.training_type_id,
            trainer_ids: request.trainer_ids,
            hours: request.hours,
            start_time: parse_optional_time("start_time", request.start_time.as_deref())?,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
        })
    }

    pub fn to_update_command(request: UpdateActivityRequest) -> Result<UpdateActivityCommand, ApiError> {
        Ok(UpdateActivityCommand {
            date: parse_optional_date("date", request.date.as_deref())?,
            training_type_id: request.training_type_id,
            trainer_ids: request.trainer_ids,
            hours: request.hours,
            start_time: parse_time_update("start_time", request.start_time.as_deref())?,
            notes: text_update(request.notes),
            detach: request.detach,
        })
    }
}
