//! # Runtime Configuration
//!
//! Unified configuration for the services and the trigger dispatcher.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SG_FANOUT_CHUNK_SIZE` | `fanout.chunk_size` |
//! | `SG_TX_MAX_ATTEMPTS` | `follow.transaction.max_attempts` |
//! | `SG_HANDLER_DEADLINE_MS` | `dispatcher.handler_deadline` |
//! | `SG_MAX_DELIVERY_ATTEMPTS` | `dispatcher.max_delivery_attempts` |

use std::str::FromStr;
use std::time::Duration;

use sg_04_follow_requests::FollowConfig;
use sg_05_post_fanout::{FanoutConfig, FanoutError};
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name}={value} is not a valid value")]
    InvalidVar { name: &'static str, value: String },

    #[error("Invalid fanout configuration: {0}")]
    Fanout(#[from] FanoutError),

    #[error("{0} must be at least 1")]
    Zero(&'static str),
}

/// Trigger dispatch configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Deadline of a single handler invocation; exceeding it counts as a
    /// failed, redeliverable invocation.
    pub handler_deadline: Duration,
    /// Deliveries of one event to one handler before it is dead-lettered.
    pub max_delivery_attempts: u32,
    /// Base delay between redeliveries (multiplied by the attempt number).
    pub redelivery_backoff: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            handler_deadline: Duration::from_secs(60),
            max_delivery_attempts: 5,
            redelivery_backoff: Duration::from_millis(500),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub fanout: FanoutConfig,
    pub follow: FollowConfig,
    pub dispatcher: DispatcherConfig,
    /// Events buffered per bus subscriber.
    pub bus_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fanout: FanoutConfig::default(),
            follow: FollowConfig::default(),
            dispatcher: DispatcherConfig::default(),
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl RuntimeConfig {
    /// Create a config for testing (no delays, short deadlines).
    pub fn for_testing() -> Self {
        Self {
            fanout: FanoutConfig::default(),
            follow: FollowConfig::for_testing(),
            dispatcher: DispatcherConfig {
                handler_deadline: Duration::from_secs(5),
                max_delivery_attempts: 3,
                redelivery_backoff: Duration::ZERO,
            },
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(size) = parse(&lookup, "SG_FANOUT_CHUNK_SIZE")? {
            config.fanout.chunk_size = size;
        }
        if let Some(attempts) = parse(&lookup, "SG_TX_MAX_ATTEMPTS")? {
            config.follow.transaction.max_attempts = attempts;
        }
        if let Some(ms) = parse::<u64>(&lookup, "SG_HANDLER_DEADLINE_MS")? {
            config.dispatcher.handler_deadline = Duration::from_millis(ms);
        }
        if let Some(attempts) = parse(&lookup, "SG_MAX_DELIVERY_ATTEMPTS")? {
            config.dispatcher.max_delivery_attempts = attempts;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fanout.validate()?;
        if self.follow.transaction.max_attempts == 0 {
            return Err(ConfigError::Zero("SG_TX_MAX_ATTEMPTS"));
        }
        if self.dispatcher.handler_deadline.is_zero() {
            return Err(ConfigError::Zero("SG_HANDLER_DEADLINE_MS"));
        }
        if self.dispatcher.max_delivery_attempts == 0 {
            return Err(ConfigError::Zero("SG_MAX_DELIVERY_ATTEMPTS"));
        }
        if self.bus_capacity == 0 {
            return Err(ConfigError::Zero("bus_capacity"));
        }
        Ok(())
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fanout.chunk_size, 450);
        assert_eq!(config.dispatcher.max_delivery_attempts, 5);
        assert!(RuntimeConfig::for_testing().validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("SG_FANOUT_CHUNK_SIZE", "100"),
            ("SG_TX_MAX_ATTEMPTS", "9"),
            ("SG_HANDLER_DEADLINE_MS", "250"),
            ("SG_MAX_DELIVERY_ATTEMPTS", " 2 "),
        ]))
        .unwrap();
        assert_eq!(config.fanout.chunk_size, 100);
        assert_eq!(config.follow.transaction.max_attempts, 9);
        assert_eq!(config.dispatcher.handler_deadline, Duration::from_millis(250));
        assert_eq!(config.dispatcher.max_delivery_attempts, 2);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = RuntimeConfig::from_lookup(lookup(&[("SG_FANOUT_CHUNK_SIZE", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { name: "SG_FANOUT_CHUNK_SIZE", .. }));

        let err = RuntimeConfig::from_lookup(lookup(&[("SG_FANOUT_CHUNK_SIZE", "501")])).unwrap_err();
        assert!(matches!(err, ConfigError::Fanout(_)));

        let err = RuntimeConfig::from_lookup(lookup(&[("SG_MAX_DELIVERY_ATTEMPTS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Zero("SG_MAX_DELIVERY_ATTEMPTS")));
    }
}
