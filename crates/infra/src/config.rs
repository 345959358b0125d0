use std::fmt::Display;
use std::str::FromStr;
use tracing::{info, warn};

/// Reconnect / retry policy for external calls (record store, push relay).
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the first retry
    pub initial_millis: u64,
    /// Upper bound for the exponentially growing delay
    pub max_millis: u64,
    /// Attempt cap for operations that are eventually abandoned. Stream
    /// reconnects ignore the cap and only respect the delay bound.
    pub max_attempts: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base url of the push relay that forwards messages to APNs / FCM
    pub push_relay_url: String,
    /// Shared key sent to the push relay on every request
    pub push_relay_key: String,
    /// How long before a session start the reminder should arrive
    pub reminder_lead_time_millis: i64,
    /// Width of one reminder scan window. This is also the sweep period so
    /// that consecutive windows tile without gaps or large overlap.
    pub reminder_scan_window_millis: i64,
    /// Ledger entries older than this are purged
    pub retention_horizon_days: i64,
    /// Fan-out bound when dispatching one workshop to its recipients
    pub dispatch_workers: usize,
    /// Per-call timeout for a single push send
    pub send_timeout_millis: u64,
    /// Poll period of the workshop change feed adapter
    pub stream_poll_period_millis: u64,
    pub backoff: BackoffConfig,
}

fn env_or<T: FromStr + Display>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    name, raw, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    pub fn new() -> Self {
        let push_relay_url = match std::env::var("PUSH_RELAY_URL") {
            Ok(url) => url,
            Err(_) => {
                info!("Did not find PUSH_RELAY_URL environment variable. Falling back to http://localhost:7700/push.");
                "http://localhost:7700/push".into()
            }
        };
        let push_relay_key = std::env::var("PUSH_RELAY_KEY").unwrap_or_default();

        Self {
            push_relay_url,
            push_relay_key,
            reminder_lead_time_millis: env_or("REMINDER_LEAD_TIME_HOURS", 24) * 60 * 60 * 1000,
            reminder_scan_window_millis: env_or("REMINDER_SCAN_WINDOW_MILLIS", 1000 * 60 * 60),
            retention_horizon_days: env_or("RETENTION_HORIZON_DAYS", 90),
            dispatch_workers: env_or("DISPATCH_WORKERS", 8),
            send_timeout_millis: env_or("SEND_TIMEOUT_MILLIS", 5000),
            stream_poll_period_millis: env_or("STREAM_POLL_PERIOD_MILLIS", 30_000),
            backoff: BackoffConfig {
                initial_millis: env_or("BACKOFF_INITIAL_MILLIS", 500),
                max_millis: env_or("BACKOFF_MAX_MILLIS", 60_000),
                max_attempts: env_or("BACKOFF_MAX_ATTEMPTS", 5),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
