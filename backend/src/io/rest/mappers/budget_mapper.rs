use shared::{
    BudgetEntry as SharedEntry, BudgetEntryListResponse, BudgetSection as SharedSection,
    BudgetSectionListResponse, CreateBudgetEntryRequest, CreateBudgetSectionRequest,
    UpdateBudgetEntryRequest, UpdateBudgetSectionRequest,
};

use super::{format_timestamp, parse_date, parse_optional_date};
use crate::domain::commands::budget::{
    CreateEntryCommand, CreateSectionCommand, UpdateEntryCommand, UpdateSectionCommand,
};
use crate::domain::dates::format_date;
use crate::domain::models::{BudgetEntry as DomainEntry, BudgetSection as DomainSection};
use crate::io::rest::error::ApiError;

pub struct BudgetMapper;

impl BudgetMapper {
    pub fn section_to_dto(domain: DomainSection) -> SharedSection {
        SharedSection {
            id: domain.id,
            year: domain.year,
            name: domain.name,
            kind: domain.kind,
            training_type_id: domain.training_type_id,
            planned_amount: domain.planned_amount,
            created_at: format_timestamp(domain.created_at),
            updated_at: format_timestamp(domain.updated_at),
        }
    }

    pub fn to_section_list_dto(sections: Vec<DomainSection>) -> BudgetSectionListResponse {
        BudgetSectionListResponse {
            sections: sections.into_iter().map(Self::section_to_dto).collect(),
        }
    }

    pub fn entry_to_dto(domain: DomainEntry) -> SharedEntry {
        SharedEntry {
            id: domain.id,
            section_id: domain.section_id,
            date: format_date(domain.date),
            description: domain.description,
            amount: domain.amount,
            flow: domain.flow,
            created_at: format_timestamp(domain.created_at),
            updated_at: format_timestamp(domain.updated_at),
        }
    }

    pub fn to_entry_list_dto(entries: Vec<DomainEntry>) -> BudgetEntryListResponse {
        BudgetEntryListResponse {
            entries: entries.into_iter().map(Self::entry_to_dto).collect(),
        }
    }

    pub fn to_create_section_command(request: CreateBudgetSectionRequest) -> CreateSectionCommand {
        CreateSectionCommand {
            year: request.year,
            name: request.name,
            kind: request.kind,
            training_type_id: request.training_type_id.filter(|t| !t.trim().is_empty()),
            planned_amount: request.planned_amount,
        }
    }

    pub fn to_update_section_command(request: UpdateBudgetSectionRequest) -> UpdateSectionCommand {
        UpdateSectionCommand {
            name: request.name,
            planned_amount: request.planned_amount,
            training_type_id: request.training_type_id,
        }
    }

    /// The section comes from the path
    pub fn to_create_entry_command(
        section_id: String,
        request: CreateBudgetEntryRequest,
    ) -> Result<CreateEntryCommand, ApiError> {
        Ok(CreateEntryCommand {
            section_id,
            date: parse_date("date", &request.date)?,
            description: request.description,
            amount: request.amount,
            flow: request.flow,
        })
    }

    pub fn to_update_entry_command(request: UpdateBudgetEntryRequest) -> Result<UpdateEntryCommand, ApiError> {
        Ok(UpdateEntryCommand {
            date: parse_optional_date("date", request.date.as_deref())?,
            description: request.description,
            amount: request.amount,
            flow: request.flow,
        })
    }
}
