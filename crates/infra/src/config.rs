//! Runtime configuration loaded from the environment.

use anyhow::{Context, bail};

use agrocatalog_producers::Reputation;

pub const MIN_REPUTATION_ENV: &str = "CATALOG_MIN_REPUTATION";
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

pub const DEFAULT_MIN_REPUTATION: f32 = 4.0;
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// Reputation a producer needs to publish when a request names none.
    pub default_min_reputation: f32,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_min_reputation: DEFAULT_MIN_REPUTATION,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let default_min_reputation = match lookup(MIN_REPUTATION_ENV) {
            Some(raw) => {
                let value: f32 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{MIN_REPUTATION_ENV} is not a number: {raw:?}"))?;
                if Reputation::new(value).is_err() {
                    bail!("{MIN_REPUTATION_ENV} must be between 0 and 5, got {value}");
                }
                value
            }
            None => DEFAULT_MIN_REPUTATION,
        };

        let log_filter = lookup(LOG_FILTER_ENV)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            default_min_reputation,
            log_filter,
        })
    }

    pub fn default_min_reputation(&self) -> anyhow::Result<Reputation> {
        Reputation::new(self.default_min_reputation).map_err(anyhow::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = CatalogConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.default_min_reputation, 4.0);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn reads_overrides() {
        let config = CatalogConfig::from_lookup(lookup(&[
            (MIN_REPUTATION_ENV, " 3.5 "),
            (LOG_FILTER_ENV, "agrocatalog_infra=debug"),
        ]))
        .unwrap();
        assert_eq!(config.default_min_reputation, 3.5);
        assert_eq!(config.log_filter, "agrocatalog_infra=debug");
    }

    #[test]
    fn rejects_bad_min_reputation() {
        assert!(CatalogConfig::from_lookup(lookup(&[(MIN_REPUTATION_ENV, "high")])).is_err());
        assert!(CatalogConfig::from_lookup(lookup(&[(MIN_REPUTATION_ENV, "6")])).is_err());
        assert!(CatalogConfig::from_lookup(lookup(&[(MIN_REPUTATION_ENV, "NaN")])).is_err());
    }
}
