use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

use super::connection::JsonConnection;
use crate::domain::models::Activity;
use crate::storage::traits::ActivityStorage;

#[derive(Clone)]
pub struct ActivityRepository {
    connection: JsonConnection,
}

impl ActivityRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

/// Date, then start time with untimed activities first, then id
pub(crate) fn sort_activities(activities: &mut [Activity]) {
    activities.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.start_time.cmp(&b.start_time))
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[async_trait]
impl ActivityStorage for ActivityRepository {
    async fn store_activity(&self, activity: &Activity) -> Result<()> {
        self.connection
            .write(|d| {
                d.require_schedule_references(&activity.training_type_id, &activity.trainer_ids)?;
                d.activities.push(activity.clone());
                Ok(())
            })
            .await
    }

    async fn get_activity(&self, activity_id: &str) -> Result<Option<Activity>> {
        Ok(self
            .connection
            .read(|d| d.activities.iter().find(|a| a.id == activity_id).cloned())
            .await)
    }

    async fn list_activities(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Activity>> {
        let mut activities: Vec<Activity> = self
            .connection
            .read(|d| {
                d.activities
                    .iter()
                    .filter(|a| start.map_or(true, |s| a.date >= s))
                    .filter(|a| end.map_or(true, |e| a.date <= e))
                    .cloned()
                    .collect()
            })
            .await;
        sort_activities(&mut activities);
        Ok(activities)
    }

    async fn list_series_activities(&self, series_id: &str) -> Result<Vec<Activity>> {
        let mut activities: Vec<Activity> = self
            .connection
            .read(|d| {
                d.activities
                    .iter()
                    .filter(|a| a.series_id.as_deref() == Some(series_id))
                    .cloned()
                    .collect()
            })
            .await;
        sort_activities(&mut activities);
        Ok(activities)
    }

    async fn update_activity(&self, activity: &Activity) -> Result<()> {
        self.connection
            .write(|d| {
                d.require_schedule_references(&activity.training_type_id, &activity.trainer_ids)?;
                let slot = d
                    .activities
                    .iter_mut()
                    .find(|a| a.id == activity.id)
                    .ok_or_else(|| anyhow!("Activity {} not found", activity.id))?;
                *slot = activity.clone();
                Ok(())
            })
            .await
    }

    async fn delete_activity(&self, activity_id: &str) -> Result<bool> {
        self.connection
            .write(|d| {
                let before = d.activities.len();
                d.activities.retain(|a| a.id != activity_id);
                Ok(d.activities.len() < before)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dates::parse_time;
    use crate::storage::json::test_utils::{sample_activity, TestEnvironment};
    use crate::storage::traits::IntegrityError;

    #[tokio::test]
    async fn test_list_range_is_inclusive_and_sorted() {
        let env = TestEnvironment::new().await.unwrap();
        env.seed_references(&["type"], &["t1"]).await.unwrap();
        let repo = ActivityRepository::new(env.connection.clone());

        let mut evening = sample_activity("2025-03-04", "type", &["t1"]);
        evening.start_time = parse_time("18:00");
        let untimed = sample_activity("2025-03-04", "type", &["t1"]);
        let mut morning = sample_activity("2025-03-04", "type", &["t1"]);
        morning.start_time = parse_time("09:00");
        let first = sample_activity("2025-03-01", "type", &[]);
        let outside = sample_activity("2025-03-05", "type", &[]);
        for activity in [&evening, &untimed, &morning, &first, &outside] {
            repo.store_activity(activity).await.unwrap();
        }

        let listed = repo
            .list_activities(NaiveDate::from_ymd_opt(2025, 3, 1), NaiveDate::from_ymd_opt(2025, 3, 4))
            .await
            .unwrap();
        let ids: Vec<&str> = listed.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), untimed.id.as_str(), morning.id.as_str(), evening.id.as_str()]);

        assert_eq!(repo.list_activities(None, None).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let env = TestEnvironment::new().await.unwrap();
        env.seed_references(&["type"], &["t1"]).await.unwrap();
        let repo = ActivityRepository::new(env.connection.clone());

        let mut activity = sample_activity("2025-03-04", "type", &["t1"]);
        repo.store_activity(&activity).await.unwrap();

        activity.hours = 2.5;
        repo.update_activity(&activity).await.unwrap();
        let stored = repo.get_activity(&activity.id).await.unwrap().unwrap();
        assert_eq!(stored.hours, 2.5);

        assert!(repo.delete_activity(&activity.id).await.unwrap());
        assert!(repo.get_activity(&activity.id).await.unwrap().is_none());
        assert!(repo.update_activity(&activity).await.is_err());
    }

    #[tokio::test]
    async fn test_references_are_checked_inside_the_write() {
        let env = TestEnvironment::new().await.unwrap();
        env.seed_references(&["type"], &["t1"]).await.unwrap();
        let repo = ActivityRepository::new(env.connection.clone());

        let orphan = sample_activity("2025-03-04", "type", &["t1", "t2"]);
        let err = repo.store_activity(&orphan).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<IntegrityError>(),
            Some(&IntegrityError::MissingTrainer("t2".to_string()))
        );
        assert!(repo.list_activities(None, None).await.unwrap().is_empty());

        let mut activity = sample_activity("2025-03-04", "type", &["t1"]);
        repo.store_activity(&activity).await.unwrap();
        activity.training_type_id = "gone".to_string();
        let err = repo.update_activity(&activity).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<IntegrityError>(),
            Some(&IntegrityError::MissingTrainingType("gone".to_string()))
        );
        let stored = repo.get_activity(&activity.id).await.unwrap().unwrap();
        assert_eq!(stored.training_type_id, "type");
    }
}
