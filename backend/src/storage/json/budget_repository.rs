use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::info;
use shared::SectionKind;

use super::connection::JsonConnection;
use crate::domain::models::{BudgetEntry, BudgetSection};
use crate::storage::traits::BudgetStorage;

/// Budget sections and their entries
#[derive(Clone)]
pub struct BudgetRepository {
    connection: JsonConnection,
}

impl BudgetRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl BudgetStorage for BudgetRepository {
    async fn store_section(&self, section: &BudgetSection) -> Result<()> {
        self.connection
            .write(|d| {
                d.require_valid_auto_section(section)?;
                d.budget_sections.push(section.clone());
                Ok(())
            })
            .await
    }

    async fn get_section(&self, section_id: &str) -> Result<Option<BudgetSection>> {
        Ok(self
            .connection
            .read(|d| d.budget_sections.iter().find(|s| s.id == section_id).cloned())
            .await)
    }

    async fn list_sections(&self, year: i32) -> Result<Vec<BudgetSection>> {
        Ok(self
            .connection
            .read(|d| {
                d.budget_sections
                    .iter()
                    .filter(|s| s.year == year)
                    .cloned()
                    .collect()
            })
            .await)
    }

    async fn find_auto_section(&self, year: i32, type_id: &str) -> Result<Option<BudgetSection>> {
        Ok(self
            .connection
            .read(|d| {
                d.budget_sections
                    .iter()
                    .find(|s| {
                        s.year == year
                            && s.kind == SectionKind::Auto
                            && s.training_type_id.as_deref() == Some(type_id)
                    })
                    .cloned()
            })
            .await)
    }

    async fn update_section(&self, section: &BudgetSection) -> Result<()> {
        self.connection
            .write(|d| {
                d.require_valid_auto_section(section)?;
                let slot = d
                    .budget_sections
                    .iter_mut()
                    .find(|s| s.id == section.id)
                    .ok_or_else(|| anyhow!("Budget section {} not found", section.id))?;
                *slot = section.clone();
                Ok(())
            })
            .await
    }

    async fn delete_section(&self, section_id: &str) -> Result<Option<usize>> {
        let removed = self
            .connection
            .write(|d| {
                let before = d.budget_sections.len();
                d.budget_sections.retain(|s| s.id != section_id);
                if d.budget_sections.len() == before {
                    return Ok(None);
                }
                let before = d.budget_entries.len();
                d.budget_entries.retain(|e| e.section_id != section_id);
                Ok(Some(before - d.budget_entries.len()))
            })
            .await?;
        if let Some(entries) = removed {
            info!("Deleted budget section {} with {} entries", section_id, entries);
        }
        Ok(removed)
    }

    async fn store_entry(&self, entry: &BudgetEntry) -> Result<()> {
        self.connection
            .write(|d| {
                if !d.budget_sections.iter().any(|s| s.id == entry.section_id) {
                    return Err(anyhow!("Budget section {} not found", entry.section_id));
                }
                d.budget_entries.push(entry.clone());
                Ok(())
            })
            .await
    }

    async fn get_entry(&self, entry_id: &str) -> Result<Option<BudgetEntry>> {
        Ok(self
            .connection
            .read(|d| d.budget_entries.iter().find(|e| e.id == entry_id).cloned())
            .await)
    }

    async fn list_entries(&self, section_id: &str) -> Result<Vec<BudgetEntry>> {
        let mut entries: Vec<BudgetEntry> = self
            .connection
            .read(|d| {
                d.budget_entries
                    .iter()
                    .filter(|e| e.section_id == section_id)
                    .cloned()
                    .collect()
            })
            .await;
        entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(entries)
    }

    async fn list_entries_for_year(&self, year: i32) -> Result<Vec<BudgetEntry>> {
        Ok(self
            .connection
            .read(|d| {
                let section_ids: Vec<&str> = d
                    .budget_sections
                    .iter()
                    .filter(|s| s.year == year)
                    .map(|s| s.id.as_str())
                    .collect();
                d.budget_entries
                    .iter()
                    .filter(|e| section_ids.contains(&e.section_id.as_str()))
                    .cloned()
                    .collect()
            })
            .await)
    }

    async fn update_entry(&self, entry: &BudgetEntry) -> Result<()> {
        self.connection
            .write(|d| {
                let slot = d
                    .budget_entries
                    .iter_mut()
                    .find(|e| e.id == entry.id)
                    .ok_or_else(|| anyhow!("Budget entry {} not found", entry.id))?;
                *slot = entry.clone();
                Ok(())
            })
            .await
    }

    async fn delete_entry(&self, entry_id: &str) -> Result<bool> {
        self.connection
            .write(|d| {
                let before = d.budget_entries.len();
                d.budget_entries.retain(|e| e.id != entry_id);
                Ok(d.budget_entries.len() < before)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::test_utils::{sample_entry, sample_section, TestEnvironment};
    use crate::storage::traits::IntegrityError;
    use shared::MoneyFlow;

    #[tokio::test]
    async fn test_sections_by_year_and_auto_lookup() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = BudgetRepository::new(env.connection.clone());
        env.seed_references(&["youth"], &[]).await.unwrap();

        let auto = sample_section(2025, "Youth", SectionKind::Auto, Some("youth"));
        repo.store_section(&auto).await.unwrap();
        repo.store_section(&sample_section(2024, "Old", SectionKind::Manual, None))
            .await
            .unwrap();

        assert_eq!(repo.list_sections(2025).await.unwrap().len(), 1);
        let found = repo.find_auto_section(2025, "youth").await.unwrap();
        assert_eq!(found.map(|s| s.id), Some(auto.id));
        assert!(repo.find_auto_section(2024, "youth").await.unwrap().is_none());

        let twin = sample_section(2025, "Youth again", SectionKind::Auto, Some("youth"));
        let err = repo.store_section(&twin).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<IntegrityError>(),
            Some(&IntegrityError::DuplicateAutoSection {
                year: 2025,
                type_id: "youth".to_string()
            })
        );
        let unknown = sample_section(2025, "Adults", SectionKind::Auto, Some("adults"));
        assert!(repo.store_section(&unknown).await.is_err());
        repo.store_section(&sample_section(2026, "Youth", SectionKind::Auto, Some("youth")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_section_cascades_entries() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = BudgetRepository::new(env.connection.clone());

        let fees = sample_section(2025, "Fees", SectionKind::Manual, None);
        let gear = sample_section(2025, "Gear", SectionKind::Manual, None);
        repo.store_section(&fees).await.unwrap();
        repo.store_section(&gear).await.unwrap();
        repo.store_entry(&sample_entry(&fees.id, "2025-02-01", 100.0, MoneyFlow::Income))
            .await
            .unwrap();
        repo.store_entry(&sample_entry(&fees.id, "2025-01-01", 40.0, MoneyFlow::Cost))
            .await
            .unwrap();
        repo.store_entry(&sample_entry(&gear.id, "2025-03-01", 60.0, MoneyFlow::Cost))
            .await
            .unwrap();

        let entries = repo.list_entries(&fees.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].amount, 40.0);
        assert_eq!(repo.list_entries_for_year(2025).await.unwrap().len(), 3);

        assert_eq!(repo.delete_section(&fees.id).await.unwrap(), Some(2));
        assert_eq!(repo.delete_section(&fees.id).await.unwrap(), None);
        assert_eq!(repo.list_entries_for_year(2025).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_entry_requires_existing_section() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = BudgetRepository::new(env.connection.clone());
        let orphan = sample_entry("missing", "2025-01-01", 10.0, MoneyFlow::Cost);
        assert!(repo.store_entry(&orphan).await.is_err());
    }
}
