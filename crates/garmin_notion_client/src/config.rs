use crate::ClientError;
use secrecy::SecretString;

pub const DEFAULT_GARMIN_CONNECT_URL: &str = "https://connect.garmin.com";
pub const DEFAULT_GARMIN_SSO_URL: &str = "https://sso.garmin.com";
pub const DEFAULT_NOTION_URL: &str = "https://api.notion.com";

#[derive(Clone, Debug)]
pub struct Config {
    pub garmin_email: String,
    pub garmin_password: SecretString,
    pub notion_token: SecretString,
    pub database_id: String,
    pub garmin_base_url: String,
    pub garmin_sso_url: String,
    pub notion_base_url: String,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Returns `Ok(None)` when `NOTION_WEIGHT_DB_ID` is unset or empty: the sync
    /// is disabled and nothing else is validated.
    pub fn from_env() -> Result<Option<Self>, ClientError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Same as [`Config::from_env`] with an injectable lookup, so tests never
    /// touch the global environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Option<Self>, ClientError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut get = move |k: &str| get(k).filter(|v| !v.is_empty());

        let Some(database_id) = get("NOTION_WEIGHT_DB_ID") else {
            return Ok(None);
        };
        let garmin_email = get("GARMIN_EMAIL")
            .ok_or_else(|| ClientError::Config("GARMIN_EMAIL missing".into()))?;
        let garmin_password = get("GARMIN_PASSWORD")
            .ok_or_else(|| ClientError::Config("GARMIN_PASSWORD missing".into()))?;
        let notion_token = get("NOTION_TOKEN")
            .ok_or_else(|| ClientError::Config("NOTION_TOKEN missing".into()))?;

        Ok(Some(Self {
            garmin_email,
            garmin_password: SecretString::new(garmin_password.into()),
            notion_token: SecretString::new(notion_token.into()),
            database_id,
            garmin_base_url: get("GARMIN_CONNECT_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GARMIN_CONNECT_URL.into()),
            garmin_sso_url: get("GARMIN_SSO_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GARMIN_SSO_URL.into()),
            notion_base_url: get("NOTION_BASE_URL").unwrap_or_else(|| DEFAULT_NOTION_URL.into()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn full_env(k: &str) -> Option<String> {
        match k {
            "GARMIN_EMAIL" => Some("me@example.com".into()),
            "GARMIN_PASSWORD" => Some("hunter2".into()),
            "NOTION_TOKEN" => Some("secret_abc".into()),
            "NOTION_WEIGHT_DB_ID" => Some("db123".into()),
            _ => None,
        }
    }

    #[test]
    fn from_env_reads_values_and_defaults() {
        let cfg = Config::from_env_with(full_env)
            .expect("cfg")
            .expect("sync enabled");
        assert_eq!(cfg.database_id, "db123");
        assert_eq!(cfg.garmin_email, "me@example.com");
        assert_eq!(cfg.notion_token.expose_secret(), "secret_abc");
        assert_eq!(cfg.garmin_base_url, DEFAULT_GARMIN_CONNECT_URL);
        assert_eq!(cfg.notion_base_url, DEFAULT_NOTION_URL);
    }

    #[test]
    fn missing_database_id_disables_sync_without_checking_credentials() {
        let res = Config::from_env_with(|_| None).expect("no error");
        assert!(res.is_none());

        let empty = Config::from_env_with(|k| match k {
            "NOTION_WEIGHT_DB_ID" => Some(String::new()),
            _ => None,
        })
        .expect("no error");
        assert!(empty.is_none());
    }

    #[test]
    fn whitespace_database_id_still_enables_sync() {
        let res = Config::from_env_with(|k| match k {
            "NOTION_WEIGHT_DB_ID" => Some("  ".into()),
            _ => None,
        });
        assert!(matches!(res, Err(ClientError::Config(msg)) if msg.contains("GARMIN_EMAIL")));
    }

    #[test]
    fn from_env_missing_token() {
        let res = Config::from_env_with(|k| match k {
            "NOTION_TOKEN" => None,
            other => full_env(other),
        });
        assert!(matches!(res, Err(ClientError::Config(msg)) if msg.contains("NOTION_TOKEN")));
    }

    #[test]
    fn base_urls_can_be_overridden() {
        let cfg = Config::from_env_with(|k| match k {
            "NOTION_BASE_URL" => Some("http://localhost:9000".into()),
            "GARMIN_SSO_BASE_URL" => Some("http://localhost:9001".into()),
            other => full_env(other),
        })
        .expect("cfg")
        .expect("sync enabled");
        assert_eq!(cfg.notion_base_url, "http://localhost:9000");
        assert_eq!(cfg.garmin_sso_url, "http://localhost:9001");
    }
}
