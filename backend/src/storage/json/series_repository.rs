use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use log::info;

use super::connection::JsonConnection;
use crate::domain::models::{Activity, RecurringSeries};
use crate::storage::traits::{SeriesRemoval, SeriesStorage};

#[derive(Clone)]
pub struct SeriesRepository {
    connection: JsonConnection,
}

impl SeriesRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl SeriesStorage for SeriesRepository {
    async fn store_series(&self, series: &RecurringSeries, activities: &[Activity]) -> Result<()> {
        self.connection
            .write(|d| {
                d.require_schedule_references(&series.training_type_id, &series.trainer_ids)?;
                d.series.push(series.clone());
                d.activities.extend(activities.iter().cloned());
                Ok(())
            })
            .await?;
        info!(
            "Stored series {} with {} occurrences",
            series.id,
            activities.len()
        );
        Ok(())
    }

    async fn get_series(&self, series_id: &str) -> Result<Option<RecurringSeries>> {
        Ok(self
            .connection
            .read(|d| d.series.iter().find(|s| s.id == series_id).cloned())
            .await)
    }

    async fn list_series(&self) -> Result<Vec<RecurringSeries>> {
        let mut series = self.connection.read(|d| d.series.clone()).await;
        series.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)));
        Ok(series)
    }

    async fn replace_series_from(
        &self,
        series: &RecurringSeries,
        from: NaiveDate,
        activities: &[Activity],
    ) -> Result<usize> {
        self.connection
            .write(|d| {
                d.require_schedule_references(&series.training_type_id, &series.trainer_ids)?;
                let slot = d
                    .series
                    .iter_mut()
                    .find(|s| s.id == series.id)
                    .ok_or_else(|| anyhow!("Series {} not found", series.id))?;
                *slot = series.clone();

                let before = d.activities.len();
                d.activities
                    .retain(|a| !(a.series_id.as_deref() == Some(series.id.as_str()) && a.date >= from));
                let removed = before - d.activities.len();
                d.activities.extend(activities.iter().cloned());
                Ok(removed)
            })
            .await
    }

    async fn truncate_series(&self, series_id: &str, from: NaiveDate) -> Result<Option<SeriesRemoval>> {
        self.connection
            .write(|d| {
                let Some(position) = d.series.iter().position(|s| s.id == series_id) else {
                    return Ok(None);
                };

                let before = d.activities.len();
                d.activities
                    .retain(|a| !(a.series_id.as_deref() == Some(series_id) && a.date >= from));
                let deleted_activities = before - d.activities.len();

                let remaining = d
                    .activities
                    .iter()
                    .filter(|a| a.series_id.as_deref() == Some(series_id))
                    .count();
                let new_end = from - Duration::days(1);
                let series_removed = remaining == 0 || new_end < d.series[position].start_date;
                if series_removed {
                    d.series.remove(position);
                } else if new_end < d.series[position].end_date {
                    let series = &mut d.series[position];
                    series.end_date = new_end;
                    series.updated_at = Utc::now();
                }

                Ok(Some(SeriesRemoval {
                    deleted_activities,
                    series_removed,
                }))
            })
            .await
    }

    async fn delete_series(&self, series_id: &str) -> Result<Option<SeriesRemoval>> {
        self.connection
            .write(|d| {
                let before = d.series.len();
                d.series.retain(|s| s.id != series_id);
                if d.series.len() == before {
                    return Ok(None);
                }
                let before = d.activities.len();
                d.activities.retain(|a| a.series_id.as_deref() != Some(series_id));
                Ok(Some(SeriesRemoval {
                    deleted_activities: before - d.activities.len(),
                    series_removed: true,
                }))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dates::parse_date;
    use crate::storage::json::test_utils::{sample_activity, sample_series, TestEnvironment};
    use crate::storage::json::ActivityRepository;
    use crate::storage::traits::ActivityStorage;

    fn occurrence(series: &RecurringSeries, date: &str) -> Activity {
        let mut activity = sample_activity(date, &series.training_type_id, &[]);
        activity.series_id = Some(series.id.clone());
        activity
    }

    #[tokio::test]
    async fn test_store_and_delete_series_with_occurrences() {
        let env = TestEnvironment::new().await.unwrap();
        env.seed_references(&["type"], &[]).await.unwrap();
        let repo = SeriesRepository::new(env.connection.clone());
        let activities = ActivityRepository::new(env.connection.clone());

        let series = sample_series("type", &[]);
        let occurrences = vec![occurrence(&series, "2025-09-01"), occurrence(&series, "2025-09-08")];
        repo.store_series(&series, &occurrences).await.unwrap();
        let loose = sample_activity("2025-09-02", "type", &[]);
        activities.store_activity(&loose).await.unwrap();

        assert_eq!(activities.list_series_activities(&series.id).await.unwrap().len(), 2);

        let removal = repo.delete_series(&series.id).await.unwrap().unwrap();
        assert_eq!(removal.deleted_activities, 2);
        assert!(removal.series_removed);
        assert_eq!(activities.list_activities(None, None).await.unwrap().len(), 1);
        assert!(repo.delete_series(&series.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_truncate_keeps_earlier_occurrences() {
        let env = TestEnvironment::new().await.unwrap();
        env.seed_references(&["type"], &[]).await.unwrap();
        let repo = SeriesRepository::new(env.connection.clone());
        let activities = ActivityRepository::new(env.connection.clone());

        let series = sample_series("type", &[]);
        let occurrences = vec![
            occurrence(&series, "2025-09-01"),
            occurrence(&series, "2025-09-08"),
            occurrence(&series, "2025-09-15"),
        ];
        repo.store_series(&series, &occurrences).await.unwrap();

        let removal = repo
            .truncate_series(&series.id, parse_date("2025-09-08").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(removal.deleted_activities, 2);
        assert!(!removal.series_removed);

        let stored = repo.get_series(&series.id).await.unwrap().unwrap();
        assert_eq!(stored.end_date, parse_date("2025-09-07").unwrap());
        assert_eq!(activities.list_series_activities(&series.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_truncate_from_start_removes_template() {
        let env = TestEnvironment::new().await.unwrap();
        env.seed_references(&["type"], &[]).await.unwrap();
        let repo = SeriesRepository::new(env.connection.clone());

        let series = sample_series("type", &[]);
        repo.store_series(&series, &[occurrence(&series, "2025-09-01")]).await.unwrap();

        let removal = repo
            .truncate_series(&series.id, series.start_date)
            .await
            .unwrap()
            .unwrap();
        assert!(removal.series_removed);
        assert!(repo.get_series(&series.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_series_from_swaps_later_occurrences() {
        let env = TestEnvironment::new().await.unwrap();
        env.seed_references(&["type"], &[]).await.unwrap();
        let repo = SeriesRepository::new(env.connection.clone());
        let activities = ActivityRepository::new(env.connection.clone());

        let mut series = sample_series("type", &[]);
        repo.store_series(
            &series,
            &[occurrence(&series, "2025-09-01"), occurrence(&series, "2025-09-08")],
        )
        .await
        .unwrap();

        series.hours = 2.0;
        let mut replacement = occurrence(&series, "2025-09-09");
        replacement.hours = 2.0;
        let removed = repo
            .replace_series_from(&series, parse_date("2025-09-05").unwrap(), &[replacement])
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let remaining = activities.list_series_activities(&series.id).await.unwrap();
        let dates: Vec<String> = remaining.iter().map(|a| a.date.to_string()).collect();
        assert_eq!(dates, vec!["2025-09-01", "2025-09-09"]);
        assert_eq!(repo.get_series(&series.id).await.unwrap().unwrap().hours, 2.0);
    }
}
