//! In-memory provider and store used by the reconciler and pipeline tests.
#![cfg(test)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use garmin_notion_client::{
    ClientError, HealthProvider, RecordStore, StoredRow, WeightRecord, WeightValues,
};

/// Returns the same records for any date range and counts calls.
#[derive(Default)]
pub struct StaticProvider {
    records: Vec<WeightRecord>,
    calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new(records: Vec<WeightRecord>) -> Self {
        Self {
            records,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthProvider for StaticProvider {
    async fn body_composition(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<WeightRecord>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }
}

/// Always fails, like an expired provider session.
pub struct FailingProvider;

#[async_trait]
impl HealthProvider for FailingProvider {
    async fn body_composition(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<WeightRecord>, ClientError> {
        Err(ClientError::Auth("session expired".into()))
    }
}

/// Rows keyed by date, behaving like the Notion database for our purposes:
/// updates overwrite weights and only touch BMI / body fat when sent.
#[derive(Default)]
pub struct FakeStore {
    rows: Mutex<Vec<(String, StoredRow)>>,
    fail_writes: bool,
    queries: AtomicUsize,
    creates: AtomicUsize,
    updates: AtomicUsize,
}

impl FakeStore {
    pub fn with_row(date: &str, weight_kg: Option<f64>) -> Self {
        let row = StoredRow {
            id: "row-1".into(),
            weight_kg,
            ..Default::default()
        };
        Self {
            rows: Mutex::new(vec![(date.to_string(), row)]),
            ..Default::default()
        }
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub async fn row(&self, date: &str) -> Option<StoredRow> {
        let rows = self.rows.lock().await;
        rows.iter().find(|(d, _)| d == date).map(|(_, r)| r.clone())
    }

    pub async fn row_count(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.creates() + self.updates()
    }

    /// Every store call, reads included.
    pub fn calls(&self) -> usize {
        self.queries.load(Ordering::SeqCst) + self.writes()
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn find_row_by_date(
        &self,
        _database_id: &str,
        date: &str,
    ) -> Result<Option<StoredRow>, ClientError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.row(date).await)
    }

    async fn create_row(
        &self,
        _database_id: &str,
        date: &str,
        values: &WeightValues,
    ) -> Result<(), ClientError> {
        if self.fail_writes {
            return Err(ClientError::Api {
                status: 503,
                body: "unavailable".into(),
            });
        }
        self.creates.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().await;
        let row = StoredRow {
            id: format!("row-{}", rows.len() + 1),
            weight_kg: values.weight_kg,
            weight_lbs: values.weight_lbs,
            bmi: values.bmi,
            body_fat: values.body_fat,
        };
        rows.push((date.to_string(), row));
        Ok(())
    }

    async fn update_row(&self, row_id: &str, values: &WeightValues) -> Result<(), ClientError> {
        if self.fail_writes {
            return Err(ClientError::Api {
                status: 503,
                body: "unavailable".into(),
            });
        }
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().await;
        let (_, row) = rows
            .iter_mut()
            .find(|(_, r)| r.id == row_id)
            .ok_or_else(|| ClientError::NotFound(row_id.to_string()))?;
        row.weight_kg = values.weight_kg;
        row.weight_lbs = values.weight_lbs;
        if values.bmi.is_some() {
            row.bmi = values.bmi;
        }
        if values.body_fat.is_some() {
            row.body_fat = values.body_fat;
        }
        Ok(())
    }
}
