//! Garmin Connect client.
//!
//! Authenticates through the SSO form login and keeps the resulting session in
//! reqwest's cookie store; every later request rides on that session.

use crate::{
    BodyComposition, ClientError, HealthProvider, WeightRecord, error_from_response, utils,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::sync::LazyLock;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)";

static TICKET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"ticket=(ST-[^"'&\s]+)"#).expect("ticket pattern is a valid regex")
});

static CSRF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name="_csrf"\s+value="([^"]+)""#).expect("csrf pattern is a valid regex")
});

/// Client for the Garmin Connect weight service using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestGarminClient {
    base_url: String,
    sso_url: String,
    client: reqwest::Client,
}

impl ReqwestGarminClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - Garmin Connect root (e.g., "https://connect.garmin.com")
    /// * `sso_url` - Garmin SSO root (e.g., "https://sso.garmin.com")
    pub fn new(base_url: &str, sso_url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            sso_url: sso_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn service_url(&self) -> String {
        format!("{}/modern", self.base_url)
    }

    /// Log in with account credentials and establish a session.
    ///
    /// Loads the sign-in form for its `_csrf` token, posts the credentials with
    /// it, then redeems the service ticket from the reply on Garmin Connect.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<(), ClientError> {
        let url = format!("{}/sso/signin", self.sso_url);
        let service = self.service_url();
        let signin_query = [("service", service.as_str()), ("embed", "false")];

        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&signin_query)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let referer = resp.url().to_string();
        let body = resp.text().await?;
        let csrf = extract_csrf(&body)
            .ok_or_else(|| ClientError::Auth("no csrf token in sign-in form".into()))?;
        tracing::debug!("garmin: sign-in form loaded");

        let form = [
            ("username", email),
            ("password", password.expose_secret()),
            ("embed", "false"),
            ("_csrf", csrf.as_str()),
        ];
        let resp = self
            .client
            .post(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::REFERER, referer)
            .query(&signin_query)
            .form(&form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let body = resp.text().await?;
        let ticket = extract_ticket(&body)
            .ok_or_else(|| ClientError::Auth("no service ticket in sign-in response".into()))?;

        let resp = self
            .client
            .get(format!("{service}/"))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[("ticket", ticket.as_str())])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        tracing::debug!("garmin: session established for {}", email);
        Ok(())
    }
}

#[async_trait]
impl HealthProvider for ReqwestGarminClient {
    async fn body_composition(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WeightRecord>, ClientError> {
        let url = format!(
            "{}/modern/proxy/weight-service/weight/dateRange",
            self.base_url
        );
        let qp = [
            ("startDate", utils::format_calendar_date(start)),
            ("endDate", utils::format_calendar_date(end)),
        ];
        let resp = self
            .client
            .get(&url)
            .header("NK", "NT")
            .query(&qp)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        // Read as text first so a shape mismatch reports what came back.
        let text = resp.text().await?;
        let payload = serde_json::from_str::<BodyComposition>(&text).map_err(|e| {
            let body_snippet: String = text.chars().take(512).collect();
            ClientError::Decode(format!("body composition: {} - body: {}", e, body_snippet))
        })?;
        let entries = payload.into_entries();
        tracing::debug!(
            "garmin: {} body composition entries for {}..{}",
            entries.len(),
            start,
            end
        );
        Ok(entries)
    }
}

fn extract_csrf(body: &str) -> Option<String> {
    CSRF_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn extract_ticket(body: &str) -> Option<String> {
    TICKET_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
