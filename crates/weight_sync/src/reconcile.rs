//! Create / update / skip decisions for one fetched weight record.

use garmin_notion_client::{ClientError, RecordStore, StoredRow, WeightRecord, WeightValues};
use serde::Serialize;

pub const LBS_PER_KG: f64 = 2.20462;

/// Round the exact binary value to `decimals` places, ties to even.
/// `40.025_f64` is really `40.02499...` and becomes `40.02`.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

/// Grams to `(kg, lbs)`: kg to 2 decimals, lbs derived from the rounded kg to 1
/// decimal. A missing or zero weight yields `(None, None)`.
///
/// Change detection compares the 2-decimal kg against what is stored, so this
/// must give the same answer for the same input on every run.
pub fn convert(weight_grams: Option<f64>) -> (Option<f64>, Option<f64>) {
    let kg = weight_grams
        .filter(|g| *g != 0.0)
        .map(|g| round_to(g / 1000.0, 2));
    let lbs = kg.map(|kg| round_to(kg * LBS_PER_KG, 1));
    (kg, lbs)
}

/// Whether the stored kg differs from the freshly converted one.
///
/// BMI and body fat are not compared: a change in those alone never causes a
/// write.
pub fn needs_update(existing: &StoredRow, record: &WeightRecord) -> bool {
    let (new_kg, _) = convert(record.weight);
    existing.weight_kg != new_kg
}

/// Everything written for `record`, with BMI and body fat to 1 decimal.
pub fn weight_values(record: &WeightRecord) -> WeightValues {
    let (weight_kg, weight_lbs) = convert(record.weight);
    WeightValues {
        weight_kg,
        weight_lbs,
        bmi: record.bmi.map(|v| round_to(v, 1)),
        body_fat: record.body_fat.map(|v| round_to(v, 1)),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Created {
        date: String,
        values: WeightValues,
    },
    Updated {
        date: String,
        row_id: String,
        values: WeightValues,
    },
    UpToDate {
        date: String,
    },
    /// The record carried no calendar date.
    Skipped,
}

pub struct Reconciler<'a> {
    store: &'a dyn RecordStore,
    database_id: &'a str,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn RecordStore, database_id: &'a str) -> Self {
        Self { store, database_id }
    }

    /// Create or update the row for `record`'s date, or leave it alone when the
    /// stored weight already matches.
    pub async fn upsert(&self, record: &WeightRecord) -> Result<Outcome, ClientError> {
        let Some(date) = record.date() else {
            tracing::debug!("skipping weight record without a calendar date");
            return Ok(Outcome::Skipped);
        };
        let values = weight_values(record);

        match self.store.find_row_by_date(self.database_id, date).await? {
            None => {
                self.store
                    .create_row(self.database_id, date, &values)
                    .await?;
                tracing::info!(
                    "Created weight entry for {}: {} lbs ({} kg)",
                    date,
                    fmt_value(values.weight_lbs),
                    fmt_value(values.weight_kg)
                );
                Ok(Outcome::Created {
                    date: date.to_string(),
                    values,
                })
            }
            Some(row) if needs_update(&row, record) => {
                self.store.update_row(&row.id, &values).await?;
                tracing::info!(
                    "Updated weight entry for {}: {} lbs ({} kg)",
                    date,
                    fmt_value(values.weight_lbs),
                    fmt_value(values.weight_kg)
                );
                Ok(Outcome::Updated {
                    date: date.to_string(),
                    row_id: row.id,
                    values,
                })
            }
            Some(_) => {
                tracing::info!("Weight entry for {} already up to date.", date);
                Ok(Outcome::UpToDate {
                    date: date.to_string(),
                })
            }
        }
    }
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}
