//! Fetch, match and reconcile one day of weight data.

use chrono::NaiveDate;
use garmin_notion_client::config::Config;
use garmin_notion_client::garmin::ReqwestGarminClient;
use garmin_notion_client::notion::ReqwestNotionClient;
use garmin_notion_client::{HealthProvider, RecordStore, utils};
use serde::Serialize;

use crate::SyncResult;
use crate::reconcile::{Outcome, Reconciler};

#[derive(Clone, Debug)]
pub struct SyncOptions {
    pub database_id: String,
    /// Fetched as a single-day range: start and end are both this date.
    pub day: NaiveDate,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub day: String,
    pub fetched: usize,
    pub outcomes: Vec<Outcome>,
}

impl SyncReport {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|&o| pred(o)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Created { .. }))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Updated { .. }))
    }

    pub fn up_to_date(&self) -> usize {
        self.count(|o| matches!(o, Outcome::UpToDate { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped))
    }
}

/// Run one sync against already-authenticated collaborators.
///
/// Records are handled in order and the first store error aborts the run.
pub async fn run_sync(
    provider: &dyn HealthProvider,
    store: &dyn RecordStore,
    options: &SyncOptions,
) -> SyncResult<SyncReport> {
    let records = provider.body_composition(options.day, options.day).await?;
    let mut report = SyncReport {
        day: utils::format_calendar_date(options.day),
        fetched: records.len(),
        outcomes: Vec::with_capacity(records.len()),
    };

    if records.is_empty() {
        tracing::warn!(
            "No weight data returned from Garmin for {}. Make sure you log weight in Garmin Connect.",
            report.day
        );
        return Ok(report);
    }

    let reconciler = Reconciler::new(store, &options.database_id);
    for record in &records {
        report.outcomes.push(reconciler.upsert(record).await?);
    }
    Ok(report)
}

/// Build the HTTP clients from `config`, log in to Garmin and sync `day`.
pub async fn run(config: &Config, day: NaiveDate) -> SyncResult<SyncReport> {
    let garmin = ReqwestGarminClient::new(&config.garmin_base_url, &config.garmin_sso_url)?;
    garmin
        .login(&config.garmin_email, &config.garmin_password)
        .await?;
    let notion = ReqwestNotionClient::new(&config.notion_base_url, config.notion_token.clone())?;

    let options = SyncOptions {
        database_id: config.database_id.clone(),
        day,
    };
    run_sync(&garmin, &notion, &options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyncError;
    use crate::test_utils::{FailingProvider, FakeStore, StaticProvider};
    use garmin_notion_client::{ClientError, WeightRecord};

    fn options() -> SyncOptions {
        SyncOptions {
            database_id: "db".into(),
            day: NaiveDate::from_ymd_opt(2024, 6, 1).expect("date"),
        }
    }

    fn june_first() -> WeightRecord {
        WeightRecord {
            calendar_date: Some("2024-06-01".into()),
            weight: Some(72300.0),
            bmi: Some(22.1),
            body_fat: Some(18.4),
        }
    }

    #[tokio::test]
    async fn empty_fetch_makes_no_store_calls() {
        let provider = StaticProvider::new(vec![]);
        let store = FakeStore::default();
        let report = run_sync(&provider, &store, &options()).await.expect("sync");
        assert_eq!(report.fetched, 0);
        assert!(report.outcomes.is_empty());
        assert_eq!(store.calls(), 0);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn record_without_date_makes_no_store_calls() {
        let provider = StaticProvider::new(vec![WeightRecord {
            weight: Some(72300.0),
            ..Default::default()
        }]);
        let store = FakeStore::default();
        let report = run_sync(&provider, &store, &options()).await.expect("sync");
        assert_eq!(report.skipped(), 1);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn repeated_runs_create_once_then_noop() {
        let provider = StaticProvider::new(vec![june_first()]);
        let store = FakeStore::default();

        let first = run_sync(&provider, &store, &options()).await.expect("sync");
        assert_eq!(first.created(), 1);

        for _ in 0..2 {
            let again = run_sync(&provider, &store, &options()).await.expect("sync");
            assert_eq!(again.created(), 0);
            assert_eq!(again.updated(), 0);
            assert_eq!(again.up_to_date(), 1);
        }
        assert_eq!(store.row_count().await, 1);
        assert_eq!(store.writes(), 1);

        let row = store.row("2024-06-01").await.expect("row");
        assert_eq!(row.weight_kg, Some(72.3));
        assert_eq!(row.weight_lbs, Some(159.4));
        assert_eq!(row.bmi, Some(22.1));
        assert_eq!(row.body_fat, Some(18.4));
    }

    #[tokio::test]
    async fn existing_matching_row_is_noop() {
        let provider = StaticProvider::new(vec![june_first()]);
        let store = FakeStore::with_row("2024-06-01", Some(72.3));
        let report = run_sync(&provider, &store, &options()).await.expect("sync");
        assert_eq!(report.up_to_date(), 1);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let store = FakeStore::default();
        let res = run_sync(&FailingProvider, &store, &options()).await;
        assert!(matches!(res, Err(SyncError::Client(ClientError::Auth(_)))));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn write_failure_stops_remaining_records() {
        let mut second = june_first();
        second.calendar_date = Some("2024-06-02".into());
        let provider = StaticProvider::new(vec![june_first(), second]);
        let store = FakeStore::failing_writes();
        let res = run_sync(&provider, &store, &options()).await;
        assert!(res.is_err());
        // Only the first record was looked up before the failed create.
        assert_eq!(store.calls(), 1);
    }

    #[test]
    fn report_serializes_outcomes_with_tag() {
        let report = SyncReport {
            day: "2024-06-01".into(),
            fetched: 1,
            outcomes: vec![Outcome::UpToDate {
                date: "2024-06-01".into(),
            }],
        };
        let v = serde_json::to_value(&report).expect("json");
        assert_eq!(v["outcomes"][0]["outcome"], "up_to_date");
    }
}
