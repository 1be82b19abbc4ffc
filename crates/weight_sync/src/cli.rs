use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Parser;
use garmin_notion_client::utils;

use crate::{SyncError, SyncResult};

/// Copy a day's Garmin Connect weigh-in into a Notion database.
#[derive(Debug, Parser)]
#[command(name = "weight-sync", version)]
pub struct Cli {
    /// Day to sync (YYYY-MM-DD). Defaults to yesterday.
    #[arg(long, value_parser = parse_day)]
    pub date: Option<NaiveDate>,

    /// Read environment variables from this file instead of `./.env`.
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Print the sync report as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn day(&self) -> NaiveDate {
        self.date.unwrap_or_else(utils::yesterday)
    }
}

fn parse_day(s: &str) -> SyncResult<NaiveDate> {
    utils::parse_calendar_date(s).ok_or_else(|| SyncError::InvalidDate(s.to_string()))
}

/// Load variables from `path`, or from `./.env` when present.
///
/// Variables already set in the process environment win. An explicit file
/// that cannot be read is an error; a missing `./.env` is not.
pub fn load_env(path: Option<&Path>) -> SyncResult<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }
    Ok(())
}
