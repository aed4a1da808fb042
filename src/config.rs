use std::{str::FromStr, time::Duration};

use anyhow::Context;

use crate::{domain::models::ServiceId, sync::FailurePolicy};

#[derive(Debug)]
pub struct Config {
    pub db_connection_string: String,
    pub bind_addr: String,
    pub network_probe_addr: String,
    pub network_probe_interval: Duration,
    pub sync_backoff_base: Duration,
    pub sync_failure_policy: FailurePolicy,
    pub tracker: TrackerConfig,
}

#[derive(Debug)]
pub struct TrackerConfig {
    pub id: ServiceId,
    pub name: String,
    pub base_url: String,
    pub api_key: String,
}

const DEFAULT_DB_CONNECTION_STRING: &str = "sqlite://tracking.sqlite?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_NETWORK_PROBE_ADDR: &str = "1.1.1.1:443";
const DEFAULT_NETWORK_PROBE_INTERVAL_SECS: u64 = 30;
const DEFAULT_SYNC_BACKOFF_BASE_SECS: u64 = 20;
const DEFAULT_TRACKER_ID: ServiceId = 1;
const DEFAULT_TRACKER_NAME: &str = "Tracker";

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid {}: {}", name, raw)),
        _ => Ok(default),
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let db_connection_string = var_or("DB_CONNECTION_STRING", DEFAULT_DB_CONNECTION_STRING);
        let bind_addr = var_or("BIND_ADDR", DEFAULT_BIND_ADDR);
        let network_probe_addr = var_or("NETWORK_PROBE_ADDR", DEFAULT_NETWORK_PROBE_ADDR);
        let network_probe_interval = Duration::from_secs(parse_var(
            "NETWORK_PROBE_INTERVAL_SECS",
            DEFAULT_NETWORK_PROBE_INTERVAL_SECS,
        )?);
        let sync_backoff_base = Duration::from_secs(parse_var(
            "SYNC_BACKOFF_BASE_SECS",
            DEFAULT_SYNC_BACKOFF_BASE_SECS,
        )?);
        let sync_failure_policy = parse_var("SYNC_FAILURE_POLICY", FailurePolicy::default())?;
        let tracker = TrackerConfig {
            id: parse_var("TRACKER_ID", DEFAULT_TRACKER_ID)?,
            name: var_or("TRACKER_NAME", DEFAULT_TRACKER_NAME),
            base_url: std::env::var("TRACKER_BASE_URL").unwrap_or_default(),
            api_key: std::env::var("TRACKER_API_KEY").unwrap_or_default(),
        };
        Ok(Config {
            db_connection_string,
            bind_addr,
            network_probe_addr,
            network_probe_interval,
            sync_backoff_base,
            sync_failure_policy,
            tracker,
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tracker.base_url.is_empty() {
            return Err("TRACKER_BASE_URL is missing".into());
        }
        if self.network_probe_interval.is_zero() {
            return Err("NETWORK_PROBE_INTERVAL_SECS must be positive".into());
        }
        if self.sync_backoff_base.is_zero() {
            return Err("SYNC_BACKOFF_BASE_SECS must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            db_connection_string: DEFAULT_DB_CONNECTION_STRING.into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            network_probe_addr: DEFAULT_NETWORK_PROBE_ADDR.into(),
            network_probe_interval: Duration::from_secs(30),
            sync_backoff_base: Duration::from_secs(20),
            sync_failure_policy: FailurePolicy::Absorb,
            tracker: TrackerConfig {
                id: 1,
                name: "Tracker".into(),
                base_url: "http://localhost:8080".into(),
                api_key: String::new(),
            },
        }
    }

    #[test]
    fn validate_accepts_defaults_with_tracker_url() {
        assert_eq!(config().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_missing_tracker_url() {
        let mut c = config();
        c.tracker.base_url.clear();
        assert_eq!(c.validate(), Err("TRACKER_BASE_URL is missing".into()));
    }

    #[test]
    fn validate_rejects_zero_backoff() {
        let mut c = config();
        c.sync_backoff_base = Duration::ZERO;
        assert!(c.validate().is_err());
    }

    #[test]
    fn parse_var_uses_default_when_unset() {
        let value: u64 = parse_var("DELAYED_TRACK_SYNC_TEST_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }
}
