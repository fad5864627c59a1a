use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use log::{info, warn};
use shared::{BudgetReport, SectionKind};

use crate::domain::budget;
use crate::domain::dates::{self, MAX_YEAR, MIN_YEAR};
use crate::domain::commands::budget::{
    CreateEntryCommand, CreateSectionCommand, UpdateEntryCommand, UpdateSectionCommand,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::{generate_id, Actor, BudgetEntry, BudgetSection};
use crate::storage::json::{
    ActivityRepository, BudgetRepository, JsonConnection, TrainerRepository, TrainingTypeRepository,
};
use crate::storage::traits::{ActivityStorage, BudgetStorage, TrainerStorage, TrainingTypeStorage};

/// Service for budget sections, entries and the yearly report
#[derive(Clone)]
pub struct BudgetService {
    budget_repository: BudgetRepository,
    activity_repository: ActivityRepository,
    trainer_repository: TrainerRepository,
    type_repository: TrainingTypeRepository,
}

impl BudgetService {
    pub fn new(connection: JsonConnection) -> Self {
        Self {
            budget_repository: BudgetRepository::new(connection.clone()),
            activity_repository: ActivityRepository::new(connection.clone()),
            trainer_repository: TrainerRepository::new(connection.clone()),
            type_repository: TrainingTypeRepository::new(connection),
        }
    }

    /// Sections of a year, auto sections first
    pub async fn list_sections(&self, actor: &Actor, year: i32) -> DomainResult<Vec<BudgetSection>> {
        actor.require_admin()?;
        validate_year(year)?;
        let mut sections = self.budget_repository.list_sections(year).await?;
        budget::sort_sections(&mut sections);
        Ok(sections)
    }

    pub async fn create_section(&self, actor: &Actor, command: CreateSectionCommand) -> DomainResult<BudgetSection> {
        actor.require_admin()?;
        info!("Creating budget section {} for {}", command.name.trim(), command.year);

        validate_year(command.year)?;
        let name = validate_name(&command.name)?;
        validate_planned(command.planned_amount)?;
        let training_type_id = match command.kind {
            SectionKind::Auto => {
                let type_id = command.training_type_id.unwrap_or_default();
                self.validate_auto_type(command.year, &type_id, None).await?;
                Some(type_id)
            }
            SectionKind::Manual => {
                if command.training_type_id.is_some_and(|t| !t.trim().is_empty()) {
                    return Err(DomainError::validation(
                        "Manual sections cannot reference a training type",
                    ));
                }
                None
            }
        };

        let now = Utc::now();
        let section = BudgetSection {
            id: generate_id(),
            year: command.year,
            name,
            kind: command.kind,
            training_type_id,
            planned_amount: command.planned_amount,
            created_at: now,
            updated_at: now,
        };
        self.budget_repository.store_section(&section).await?;

        info!("Created budget section {} with ID {}", section.name, section.id);
        Ok(section)
    }

    pub async fn update_section(
        &self,
        actor: &Actor,
        section_id: &str,
        command: UpdateSectionCommand,
    ) -> DomainResult<BudgetSection> {
        actor.require_admin()?;
        info!("Updating budget section {}", section_id);
        let mut section = self.require_section(section_id).await?;

        if let Some(name) = command.name {
            section.name = validate_name(&name)?;
        }
        if let Some(planned) = command.planned_amount {
            validate_planned(planned)?;
            section.planned_amount = planned;
        }
        if let Some(type_id) = command.training_type_id {
            if section.kind == SectionKind::Manual {
                return Err(DomainError::validation(
                    "Manual sections cannot reference a training type",
                ));
            }
            self.validate_auto_type(section.year, &type_id, Some(section_id)).await?;
            section.training_type_id = Some(type_id);
        }
        section.updated_at = Utc::now();
        self.budget_repository.update_section(&section).await?;

        Ok(section)
    }

    pub async fn delete_section(&self, actor: &Actor, section_id: &str) -> DomainResult<()> {
        actor.require_admin()?;
        info!("Deleting budget section {}", section_id);
        match self.budget_repository.delete_section(section_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Budget section", section_id)),
        }
    }

    pub async fn list_entries(&self, actor: &Actor, section_id: &str) -> DomainResult<Vec<BudgetEntry>> {
        actor.require_admin()?;
        self.require_section(section_id).await?;
        Ok(self.budget_repository.list_entries(section_id).await?)
    }

    pub async fn create_entry(&self, actor: &Actor, command: CreateEntryCommand) -> DomainResult<BudgetEntry> {
        actor.require_admin()?;
        info!(
            "Creating budget entry in section {}: {} {:?}",
            command.section_id, command.amount, command.flow
        );
        let section = self.require_section(&command.section_id).await?;
        if section.kind != SectionKind::Manual {
            return Err(DomainError::validation(
                "Entries can only be added to manual sections",
            ));
        }
        validate_entry_date(&section, command.date)?;
        validate_amount(command.amount)?;
        let description = validate_description(&command.description)?;

        let now = Utc::now();
        let entry = BudgetEntry {
            id: generate_id(),
            section_id: section.id,
            date: command.date,
            description,
            amount: command.amount,
            flow: command.flow,
            created_at: now,
            updated_at: now,
        };
        self.budget_repository.store_entry(&entry).await?;
        Ok(entry)
    }

    pub async fn update_entry(
        &self,
        actor: &Actor,
        entry_id: &str,
        command: UpdateEntryCommand,
    ) -> DomainResult<BudgetEntry> {
        actor.require_admin()?;
        info!("Updating budget entry {}", entry_id);
        let mut entry = self
            .budget_repository
            .get_entry(entry_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Budget entry", entry_id))?;
        let section = self.require_section(&entry.section_id).await?;

        if let Some(date) = command.date {
            validate_entry_date(&section, date)?;
            entry.date = date;
        }
        if let Some(description) = command.description {
            entry.description = validate_description(&description)?;
        }
        if let Some(amount) = command.amount {
            validate_amount(amount)?;
            entry.amount = amount;
        }
        if let Some(flow) = command.flow {
            entry.flow = flow;
        }
        entry.updated_at = Utc::now();
        self.budget_repository.update_entry(&entry).await?;
        Ok(entry)
    }

    pub async fn delete_entry(&self, actor: &Actor, entry_id: &str) -> DomainResult<()> {
        actor.require_admin()?;
        info!("Deleting budget entry {}", entry_id);
        if !self.budget_repository.delete_entry(entry_id).await? {
            return Err(DomainError::not_found("Budget entry", entry_id));
        }
        Ok(())
    }

    /// Yearly rollup of activity costs and manual entries
    pub async fn report(&self, actor: &Actor, year: i32) -> DomainResult<BudgetReport> {
        actor.require_admin()?;
        validate_year(year)?;
        info!("Building budget report for {}", year);

        let (start, end) = year_bounds(year)?;
        let activities = self
            .activity_repository
            .list_activities(Some(start), Some(end))
            .await?;
        let trainers = self
            .trainer_repository
            .list_trainers(false)
            .await?
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect::<HashMap<_, _>>();
        let types = self
            .type_repository
            .list_training_types()
            .await?
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect::<HashMap<_, _>>();
        let mut sections = self.budget_repository.list_sections(year).await?;
        budget::sort_sections(&mut sections);
        let entries = self.budget_repository.list_entries_for_year(year).await?;

        let report = budget::build_report(year, &activities, &types, &trainers, &sections, &entries);
        info!(
            "Budget {}: costs {:.2}, income {:.2}, net {:.2}",
            year, report.total_costs, report.total_income, report.net
        );
        Ok(report)
    }

    /// Section lines of the report plus a totals row, as CSV
    pub async fn export_report_csv(&self, actor: &Actor, year: i32) -> DomainResult<String> {
        let report = self.report(actor, year).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["section", "kind", "costs", "income", "planned", "remaining"])
            .map_err(csv_error)?;
        for section in &report.sections {
            let kind = match section.kind {
                SectionKind::Auto => "auto",
                SectionKind::Manual => "manual",
            };
            writer
                .write_record([
                    section.name.clone(),
                    kind.to_string(),
                    format!("{:.2}", section.costs),
                    format!("{:.2}", section.income),
                    section.planned.map(|p| format!("{:.2}", p)).unwrap_or_default(),
                    section.remaining.map(|r| format!("{:.2}", r)).unwrap_or_default(),
                ])
                .map_err(csv_error)?;
        }
        writer
            .write_record([
                "Total".to_string(),
                String::new(),
                format!("{:.2}", report.total_costs),
                format!("{:.2}", report.total_income),
                String::new(),
                format!("{:.2}", report.net),
            ])
            .map_err(csv_error)?;

        let bytes = writer
            .into_inner()
            .map_err(|e| DomainError::Storage(anyhow::anyhow!("Failed to finish CSV: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| DomainError::Storage(anyhow::anyhow!("CSV is not UTF-8: {}", e)))
    }

    async fn require_section(&self, section_id: &str) -> DomainResult<BudgetSection> {
        self.budget_repository
            .get_section(section_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Budget section", section_id))
    }

    /// Type must exist and not already feed another auto section that year
    async fn validate_auto_type(&self, year: i32, type_id: &str, own_id: Option<&str>) -> DomainResult<()> {
        if type_id.trim().is_empty() {
            return Err(DomainError::validation(
                "Auto sections must reference a training type",
            ));
        }
        if self.type_repository.get_training_type(type_id).await?.is_none() {
            return Err(DomainError::Validation(format!(
                "Training type {} does not exist",
                type_id
            )));
        }
        if let Some(existing) = self.budget_repository.find_auto_section(year, type_id).await? {
            if Some(existing.id.as_str()) != own_id {
                warn!("Training type {} already has auto section {} in {}", type_id, existing.id, year);
                return Err(DomainError::Conflict(format!(
                    "{} already collects this training type for {}",
                    existing.name, year
                )));
            }
        }
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> DomainError {
    DomainError::Storage(anyhow::anyhow!("Failed to write CSV: {}", e))
}

fn year_bounds(year: i32) -> DomainResult<(NaiveDate, NaiveDate)> {
    match (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(DomainError::Validation(format!("Invalid year {}", year))),
    }
}

fn validate_year(year: i32) -> DomainResult<()> {
    if !dates::is_supported_year(year) {
        return Err(DomainError::Validation(format!(
            "Year must be between {} and {}",
            MIN_YEAR, MAX_YEAR
        )));
    }
    Ok(())
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("Section name cannot be empty"));
    }
    Ok(name.to_string())
}

fn validate_description(description: &str) -> DomainResult<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(DomainError::validation("Entry description cannot be empty"));
    }
    Ok(description.to_string())
}

fn validate_planned(planned: Option<f64>) -> DomainResult<()> {
    match planned {
        Some(p) if !p.is_finite() || p < 0.0 => Err(DomainError::validation(
            "Planned amount must be zero or positive",
        )),
        _ => Ok(()),
    }
}

fn validate_amount(amount: f64) -> DomainResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(DomainError::validation("Amount must be greater than zero"));
    }
    Ok(())
}

fn validate_entry_date(section: &BudgetSection, date: NaiveDate) -> DomainResult<()> {
    if date.year() != section.year {
        return Err(DomainError::Validation(format!(
            "Entry date {} is outside the section's year {}",
            date, section.year
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dates::parse_date;
    use crate::storage::json::test_utils::{
        sample_activity, sample_trainer, sample_training_type, sample_user, TestEnvironment,
    };
    use shared::{MoneyFlow, Role};

    fn admin() -> Actor {
        sample_user("admin", Role::Admin).actor()
    }

    fn section(year: i32, name: &str, kind: SectionKind, type_id: Option<String>) -> CreateSectionCommand {
        CreateSectionCommand {
            year,
            name: name.to_string(),
            kind,
            training_type_id: type_id,
            planned_amount: Some(500.0),
        }
    }

    fn entry(section_id: &str, on: &str, amount: f64, flow: MoneyFlow) -> CreateEntryCommand {
        CreateEntryCommand {
            section_id: section_id.to_string(),
            date: parse_date(on).unwrap(),
            description: "Membership fees".to_string(),
            amount,
            flow,
        }
    }

    async fn seeded() -> (TestEnvironment, BudgetService, String) {
        let env = TestEnvironment::new().await.unwrap();
        let trainer = sample_trainer("Anna", 20.0);
        TrainerRepository::new(env.connection.clone())
            .store_trainer(&trainer)
            .await
            .unwrap();
        let youth = sample_training_type("Youth");
        TrainingTypeRepository::new(env.connection.clone())
            .store_training_type(&youth)
            .await
            .unwrap();
        let activities = ActivityRepository::new(env.connection.clone());
        for on in ["2025-01-10", "2025-02-10", "2024-12-10"] {
            let mut activity = sample_activity(on, &youth.id, &[&trainer.id]);
            activity.hours = 2.0;
            activities.store_activity(&activity).await.unwrap();
        }
        let service = BudgetService::new(env.connection.clone());
        (env, service, youth.id)
    }

    #[tokio::test]
    async fn test_section_rules() {
        let (_env, service, youth_id) = seeded().await;

        service
            .create_section(&admin(), section(2025, "Youth", SectionKind::Auto, Some(youth_id.clone())))
            .await
            .unwrap();
        assert!(matches!(
            service
                .create_section(&admin(), section(2025, "Again", SectionKind::Auto, Some(youth_id.clone())))
                .await,
            Err(DomainError::Conflict(_))
        ));
        // A different year is fine
        service
            .create_section(&admin(), section(2026, "Youth", SectionKind::Auto, Some(youth_id.clone())))
            .await
            .unwrap();
        assert!(service
            .create_section(&admin(), section(2025, "No type", SectionKind::Auto, None))
            .await
            .is_err());
        assert!(service
            .create_section(&admin(), section(2025, "Fees", SectionKind::Manual, Some(youth_id)))
            .await
            .is_err());

        let member = sample_user("member", Role::User).actor();
        assert!(matches!(
            service.list_sections(&member, 2025).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_planned_amount_can_be_removed() {
        let (_env, service, _) = seeded().await;
        let fees = service
            .create_section(&admin(), section(2025, "Fees", SectionKind::Manual, None))
            .await
            .unwrap();

        let renamed = service
            .update_section(
                &admin(),
                &fees.id,
                UpdateSectionCommand {
                    name: Some("Membership".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.planned_amount, Some(500.0));

        let cleared = service
            .update_section(
                &admin(),
                &fees.id,
                UpdateSectionCommand {
                    planned_amount: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.planned_amount, None);

        assert!(matches!(
            service
                .update_section(
                    &admin(),
                    &fees.id,
                    UpdateSectionCommand {
                        planned_amount: Some(Some(-1.0)),
                        ..Default::default()
                    },
                )
                .await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_entry_rules() {
        let (_env, service, youth_id) = seeded().await;
        let auto = service
            .create_section(&admin(), section(2025, "Youth", SectionKind::Auto, Some(youth_id)))
            .await
            .unwrap();
        let fees = service
            .create_section(&admin(), section(2025, "Fees", SectionKind::Manual, None))
            .await
            .unwrap();

        assert!(service
            .create_entry(&admin(), entry(&auto.id, "2025-03-01", 10.0, MoneyFlow::Cost))
            .await
            .is_err());
        assert!(service
            .create_entry(&admin(), entry(&fees.id, "2024-03-01", 10.0, MoneyFlow::Cost))
            .await
            .is_err());
        assert!(service
            .create_entry(&admin(), entry(&fees.id, "2025-03-01", 0.0, MoneyFlow::Cost))
            .await
            .is_err());

        let created = service
            .create_entry(&admin(), entry(&fees.id, "2025-03-01", 10.0, MoneyFlow::Cost))
            .await
            .unwrap();
        let updated = service
            .update_entry(
                &admin(),
                &created.id,
                UpdateEntryCommand {
                    flow: Some(MoneyFlow::Income),
                    amount: Some(12.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.flow, MoneyFlow::Income);
        assert_eq!(service.list_entries(&admin(), &fees.id).await.unwrap().len(), 1);

        service.delete_section(&admin(), &fees.id).await.unwrap();
        assert!(matches!(
            service.delete_entry(&admin(), &created.id).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_report_and_csv_export() {
        let (_env, service, youth_id) = seeded().await;
        service
            .create_section(&admin(), section(2025, "Youth", SectionKind::Auto, Some(youth_id)))
            .await
            .unwrap();
        let fees = service
            .create_section(&admin(), section(2025, "Fees", SectionKind::Manual, None))
            .await
            .unwrap();
        service
            .create_entry(&admin(), entry(&fees.id, "2025-03-01", 300.0, MoneyFlow::Income))
            .await
            .unwrap();

        let report = service.report(&admin(), 2025).await.unwrap();
        assert_eq!(report.by_type[0].activity_count, 2);
        assert_eq!(report.by_type[0].cost, 80.0);
        assert_eq!(report.by_month[0].cost, 40.0);
        assert_eq!(report.sections.len(), 2);
        assert_eq!(report.sections[0].name, "Youth");
        assert_eq!(report.sections[0].remaining, Some(420.0));
        assert_eq!(report.total_costs, 80.0);
        assert_eq!(report.net, 220.0);

        let csv = service.export_report_csv(&admin(), 2025).await.unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "section,kind,costs,income,planned,remaining");
        assert_eq!(lines[1], "Youth,auto,80.00,0.00,500.00,420.00");
        assert_eq!(lines[2], "Fees,manual,0.00,300.00,500.00,500.00");
        assert_eq!(lines[3], "Total,,80.00,300.00,,220.00");
    }
}
