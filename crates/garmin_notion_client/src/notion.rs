//! Notion client for the weight database.
//!
//! Rows are Notion pages whose `Date` title holds the ISO calendar date; the
//! numeric columns are plain `number` properties.

use crate::{ClientError, RecordStore, StoredRow, WeightValues, error_from_response};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};

pub const NOTION_VERSION: &str = "2022-06-28";

/// Property names of the weight database.
pub mod properties {
    pub const DATE: &str = "Date";
    pub const WEIGHT_KG: &str = "Weight (kg)";
    pub const WEIGHT_LBS: &str = "Weight (lbs)";
    pub const BMI: &str = "BMI";
    pub const BODY_FAT: &str = "Body Fat (%)";
}

/// Client for the Notion REST API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestNotionClient {
    base_url: String,
    token: SecretString,
    client: reqwest::Client,
}

impl ReqwestNotionClient {
    pub fn new(base_url: &str, token: SecretString) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(self.token.expose_secret())
            .header("Notion-Version", NOTION_VERSION)
    }

    /// Execute a request and expect a JSON response.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(resp.json::<T>().await?)
    }

    /// Execute a request whose response body is not needed.
    async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<(), ClientError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(())
    }
}

/// Build the `properties` object for a create or update.
///
/// Weight columns are always sent (as `null` when unknown); BMI and body fat
/// only when the source record had them.
pub fn weight_properties(date: Option<&str>, values: &WeightValues) -> Map<String, Value> {
    let mut props = Map::new();
    if let Some(date) = date {
        props.insert(
            properties::DATE.into(),
            json!({"title": [{"text": {"content": date}}]}),
        );
    }
    props.insert(
        properties::WEIGHT_KG.into(),
        json!({"number": values.weight_kg}),
    );
    props.insert(
        properties::WEIGHT_LBS.into(),
        json!({"number": values.weight_lbs}),
    );
    if let Some(bmi) = values.bmi {
        props.insert(properties::BMI.into(), json!({"number": bmi}));
    }
    if let Some(body_fat) = values.body_fat {
        props.insert(properties::BODY_FAT.into(), json!({"number": body_fat}));
    }
    props
}

#[derive(serde::Deserialize)]
struct QueryPayload {
    #[serde(default)]
    results: Vec<PagePayload>,
}

#[derive(serde::Deserialize)]
struct PagePayload {
    id: String,
    #[serde(default)]
    properties: Map<String, Value>,
}

impl From<PagePayload> for StoredRow {
    fn from(page: PagePayload) -> Self {
        let number = |name: &str| {
            page.properties
                .get(name)
                .and_then(|p| p.get("number"))
                .and_then(Value::as_f64)
        };
        StoredRow {
            weight_kg: number(properties::WEIGHT_KG),
            weight_lbs: number(properties::WEIGHT_LBS),
            bmi: number(properties::BMI),
            body_fat: number(properties::BODY_FAT),
            id: page.id,
        }
    }
}

#[async_trait]
impl RecordStore for ReqwestNotionClient {
    async fn find_row_by_date(
        &self,
        database_id: &str,
        date: &str,
    ) -> Result<Option<StoredRow>, ClientError> {
        let url = format!("{}/v1/databases/{}/query", self.base_url, database_id);
        // Two is enough to notice a duplicate without paging through them.
        let body = json!({
            "filter": {"property": properties::DATE, "title": {"equals": date}},
            "page_size": 2,
        });
        let payload: QueryPayload = self
            .execute_json(self.request(reqwest::Method::POST, &url).json(&body))
            .await?;

        if payload.results.len() > 1 {
            tracing::warn!(
                "notion: more than one row dated {} in database {}; using the first",
                date,
                database_id
            );
        }
        Ok(payload.results.into_iter().next().map(StoredRow::from))
    }

    async fn create_row(
        &self,
        database_id: &str,
        date: &str,
        values: &WeightValues,
    ) -> Result<(), ClientError> {
        let url = format!("{}/v1/pages", self.base_url);
        let body = json!({
            "parent": {"database_id": database_id},
            "properties": weight_properties(Some(date), values),
        });
        self.execute_empty(self.request(reqwest::Method::POST, &url).json(&body))
            .await
    }

    async fn update_row(&self, row_id: &str, values: &WeightValues) -> Result<(), ClientError> {
        let url = format!("{}/v1/pages/{}", self.base_url, row_id);
        let body = json!({"properties": weight_properties(None, values)});
        self.execute_empty(self.request(reqwest::Method::PATCH, &url).json(&body))
            .await
    }
}
