use clap::Parser;
use garmin_notion_client::config::Config;

use weight_sync::cli::{self, Cli};
use weight_sync::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    cli::load_env(args.env_file.as_deref())?;
    logging::init();

    let Some(config) = Config::from_env()? else {
        tracing::warn!("NOTION_WEIGHT_DB_ID not set, skipping weight sync.");
        return Ok(());
    };

    let day = args.day();
    tracing::info!("weight_sync: syncing {}", day);
    let report = weight_sync::run(&config, day).await?;

    tracing::info!(
        "weight_sync: {} fetched, {} created, {} updated, {} up to date, {} skipped",
        report.fetched,
        report.created(),
        report.updated(),
        report.up_to_date(),
        report.skipped()
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
