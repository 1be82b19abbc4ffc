//! Garmin Connect and Notion clients behind two small async traits.
//!
//! [`HealthProvider`] fetches body composition records, [`RecordStore`] reads and
//! writes the dated rows of a Notion weight database.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod config;
pub mod garmin;
pub mod notion;
pub mod utils;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unexpected payload: {0}")]
    Decode(String),
    #[error("api error ({status}): {body}")]
    Api { status: u16, body: String },
}

impl ClientError {
    /// Map a non-success status code to the matching error variant.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ClientError::Auth(body),
            404 => ClientError::NotFound(body),
            400 | 422 => ClientError::InvalidInput(body),
            _ => ClientError::Api { status, body },
        }
    }
}

/// Extract error information from a failed response.
pub(crate) async fn error_from_response(resp: reqwest::Response) -> ClientError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let body_snippet: String = body.chars().take(256).collect();
    ClientError::from_status(status, body_snippet)
}

/// One day's body composition entry as returned by Garmin Connect.
///
/// Every field is optional: the provider omits or nulls whatever the scale did
/// not measure.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecord {
    #[serde(default, deserialize_with = "deserialize_calendar_date")]
    pub calendar_date: Option<String>,
    /// Weight in grams.
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub bmi: Option<f64>,
    #[serde(default)]
    pub body_fat: Option<f64>,
}

impl WeightRecord {
    /// The record's date, if it carries a non-empty one.
    pub fn date(&self) -> Option<&str> {
        self.calendar_date.as_deref().filter(|d| !d.is_empty())
    }
}

/// Older payloads send `calendarDate` as epoch milliseconds; normalize those to
/// an ISO date so the store lookup sees one format.
fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => {
            let millis = n
                .as_i64()
                .ok_or_else(|| D::Error::custom(format!("invalid calendarDate timestamp {n}")))?;
            let date = chrono::DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| D::Error::custom(format!("calendarDate out of range: {millis}")))?;
            Ok(Some(utils::format_calendar_date(date.date_naive())))
        }
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Response of the weight-service date range endpoint.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BodyComposition {
    #[serde(default)]
    pub date_weight_list: Option<Vec<WeightRecord>>,
}

impl BodyComposition {
    pub fn into_entries(self) -> Vec<WeightRecord> {
        self.date_weight_list.unwrap_or_default()
    }
}

/// A dated row already present in the weight database.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoredRow {
    pub id: String,
    pub weight_kg: Option<f64>,
    pub weight_lbs: Option<f64>,
    pub bmi: Option<f64>,
    pub body_fat: Option<f64>,
}

/// Numeric properties written on create and update.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WeightValues {
    pub weight_kg: Option<f64>,
    pub weight_lbs: Option<f64>,
    pub bmi: Option<f64>,
    pub body_fat: Option<f64>,
}

#[async_trait]
pub trait HealthProvider: Send + Sync {
    /// Body composition entries between `start` and `end`, both inclusive.
    async fn body_composition(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WeightRecord>, ClientError>;
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// First row whose `Date` equals `date`, if any.
    async fn find_row_by_date(
        &self,
        database_id: &str,
        date: &str,
    ) -> Result<Option<StoredRow>, ClientError>;

    async fn create_row(
        &self,
        database_id: &str,
        date: &str,
        values: &WeightValues,
    ) -> Result<(), ClientError>;

    /// Overwrite the numeric properties of `row_id`. The date is left alone.
    async fn update_row(&self, row_id: &str, values: &WeightValues) -> Result<(), ClientError>;
}
