use shared::{
    CreateSeriesRequest, DeleteSeriesResponse, RecurringSeries as SharedSeries, SeriesListResponse,
    SeriesResponse, UpdateSeriesRequest,
};

use super::activity_mapper::ActivityMapper;
use super::{
    format_timestamp, parse_date, parse_dates, parse_optional_date, parse_optional_time,
    parse_time_update, parse_weekdays, text_update,
};
use crate::domain::commands::series::{
    CreateSeriesCommand, DeleteSeriesResult, SeriesResult, UpdateSeriesCommand,
};
use crate::domain::dates::{format_date, format_time, iso_from_weekday};
use crate::domain::models::RecurringSeries as DomainSeries;
use crate::io::rest::error::ApiError;

pub struct SeriesMapper;

impl SeriesMapper {
    pub fn to_dto(domain: DomainSeries) -> SharedSeries {
        SharedSeries {
            id: domain.id,
            training_type_id: domain.training_type_id,
            trainer_ids: domain.trainer_ids,
            weekdays: domain.weekdays.into_iter().map(iso_from_weekday).collect(),
            start_date: format_date(domain.start_date),
            end_date: format_date(domain.end_date),
            hours: domain.hours,
            start_time: domain.start_time.map(format_time),
            notes: domain.notes,
            excluded_dates: domain.excluded_dates.into_iter().map(format_date).collect(),
            created_at: format_timestamp(domain.created_at),
            updated_at: format_timestamp(domain.updated_at),
        }
    }

    pub fn to_list_dto(series: Vec<DomainSeries>) -> SeriesListResponse {
        SeriesListResponse {
            series: series.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_response(result: SeriesResult) -> SeriesResponse {
        SeriesResponse {
            series: Self::to_dto(result.series),
            activity_count: result.activity_count,
            conflicts: ActivityMapper::conflicts_to_dto(result.conflicts),
        }
    }

    pub fn to_delete_response(result: DeleteSeriesResult) -> DeleteSeriesResponse {
        DeleteSeriesResponse {
            deleted_activities: result.deleted_activities,
            series_removed: result.series_removed,
        }
    }

    pub fn to_create_command(request: CreateSeriesRequest) -> Result<CreateSeriesCommand, ApiError> {
        Ok(CreateSeriesCommand {
            training_type_id: request.training_type_id,
            trainer_ids: request.trainer_ids,
            weekdays: parse_weekdays(&request.weekdays)?,
            start_date: parse_date("start_date", &request.start_date)?,
            end_date: parse_date("end_date", &request.end_date)?,
            hours: request.hours,
            start_time: parse_optional_time("start_time", request.start_time.as_deref())?,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            excluded_dates: parse_dates("excluded_dates", &request.excluded_dates)?,
        })
    }

    /// `from` comes from the query string rather than the body
    pub fn to_update_command(
        request: UpdateSeriesRequest,
        from: Option<&str>,
    ) -> Result<UpdateSeriesCommand, ApiError> {
        Ok(UpdateSeriesCommand {
            training_type_id: request.training_type_id,
            trainer_ids: request.trainer_ids,
            weekdays: request.weekdays.as_deref().map(parse_weekdays).transpose()?,
            end_date: parse_optional_date("end_date", request.end_date.as_deref())?,
            hours: request.hours,
            start_time: parse_time_update("start_time", request.start_time.as_deref())?,
            notes: text_update(request.notes),
            excluded_dates: request
                .excluded_dates
                .as_deref()
                .map(|d| parse_dates("excluded_dates", d))
                .transpose()?,
            from: parse_optional_date("from", from)?,
        })
    }
}
