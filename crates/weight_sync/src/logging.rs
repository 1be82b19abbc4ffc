use tracing_subscriber::EnvFilter;

pub const LOG_LEVEL_ENV: &str = "WEIGHT_SYNC_LOG_LEVEL";

/// Per-target overrides that keep HTTP internals quiet by default.
const QUIET_TARGETS: &str = "hyper=warn,reqwest=warn";

/// `WEIGHT_SYNC_LOG_LEVEL`, then `RUST_LOG`, then `info`.
pub fn log_level_with<F>(mut get: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    get(LOG_LEVEL_ENV)
        .or_else(|| get("RUST_LOG"))
        .unwrap_or_else(|| "info".to_string())
}

pub fn env_filter(log_env: &str) -> EnvFilter {
    EnvFilter::try_new(format!("{log_env},{QUIET_TARGETS}"))
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{QUIET_TARGETS}")))
}

/// Install the global subscriber: compact lines on stderr.
pub fn init() {
    let log_env = log_level_with(|k| std::env::var(k).ok());
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter(&log_env))
        .init();
    tracing::debug!("weight_sync: log filter: {}", log_env);
}
