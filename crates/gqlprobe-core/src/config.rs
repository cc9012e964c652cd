//! Run configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::endpoint::DEFAULT_ORIGIN;
use crate::error::{DoctorError, Result};

/// Default upper bound on a single probe.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;

pub const ORIGIN_ENV: &str = "GQLPROBE_ORIGIN";
pub const TIMEOUT_ENV: &str = "GQLPROBE_TIMEOUT_SECS";

/// Settings shared by every probe of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorConfig {
    /// Value sent as the `origin` header.
    pub origin: String,

    /// Longest wait for any single probe to settle.
    pub probe_timeout: Duration,

    /// User agent presented by the HTTP transport.
    pub user_agent: String,
}

impl Default for DoctorConfig {
    fn default() -> Self {
        DoctorConfig {
            origin: DEFAULT_ORIGIN.to_string(),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            user_agent: format!("gqlprobe/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl DoctorConfig {
    /// Defaults overridden by `GQLPROBE_ORIGIN` / `GQLPROBE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`DoctorConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(origin) = lookup(ORIGIN_ENV) {
            config = config.with_origin(&origin);
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                DoctorError::InvalidConfig(format!("{TIMEOUT_ENV}={raw:?}: {e}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs))?;
        }
        Ok(config)
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.trim().to_string();
        self
    }

    /// Set the per-probe bound. Zero is rejected: it would fail every probe.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(DoctorError::InvalidConfig(
                "probe timeout must be greater than zero".to_string(),
            ));
        }
        self.probe_timeout = timeout;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DoctorConfig::default();
        assert_eq!(config.origin, DEFAULT_ORIGIN);
        assert_eq!(config.probe_timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("gqlprobe/"));
    }

    #[test]
    fn test_with_origin_trims() {
        let config = DoctorConfig::default().with_origin(" http://localhost:3000 ");
        assert_eq!(config.origin, "http://localhost:3000");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = DoctorConfig::default()
            .with_timeout(Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, DoctorError::InvalidConfig(_)));
    }

    #[test]
    fn test_with_timeout() {
        let config = DoctorConfig::default()
            .with_timeout(Duration::from_secs(5))
            .unwrap();
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
    }

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_from_lookup_without_variables_is_default() {
        let config = DoctorConfig::from_lookup(vars(&[])).unwrap();
        assert_eq!(config, DoctorConfig::default());
    }

    #[test]
    fn test_from_lookup_reads_both_variables() {
        let config = DoctorConfig::from_lookup(vars(&[
            (ORIGIN_ENV, " http://localhost:3000 "),
            (TIMEOUT_ENV, " 7 "),
        ]))
        .unwrap();
        assert_eq!(config.origin, "http://localhost:3000");
        assert_eq!(config.probe_timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_from_lookup_rejects_unparsable_timeout() {
        let err = DoctorConfig::from_lookup(vars(&[(TIMEOUT_ENV, "soon")])).unwrap_err();
        match err {
            DoctorError::InvalidConfig(message) => assert!(message.contains(TIMEOUT_ENV)),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_from_lookup_rejects_zero_timeout() {
        let err = DoctorConfig::from_lookup(vars(&[(TIMEOUT_ENV, "0")])).unwrap_err();
        assert!(matches!(err, DoctorError::InvalidConfig(_)));
    }
}
