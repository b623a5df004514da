//! Configuration management for Guard Service
//!
//! Loads settings from:
//! 1. Environment variables
//! 2. .env file (local development)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub redis: RedisSettings,
    pub guard: GuardSettings,
    pub sampler: SamplerSettings,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self> {
        // Load .env file in development
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        Ok(Settings {
            redis: RedisSettings::from_env()?,
            guard: GuardSettings::from_env()?,
            sampler: SamplerSettings::from_env()?,
        })
    }
}

/// Shared expiring store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisSettings {
    pub url: String,
    pub command_timeout_ms: u64,
}

impl RedisSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("REDIS_URL").context("REDIS_URL must be set")?,
            command_timeout_ms: env::var("REDIS_COMMAND_TIMEOUT_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .context("Invalid REDIS_COMMAND_TIMEOUT_MS")?,
        })
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

/// Credential guard settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardSettings {
    /// Consecutive failures before the identity is locked
    pub max_failures: u32,
    /// Seconds an identity stays locked after crossing the threshold
    pub lockout_window_secs: u64,
    /// Report `Unlocked` (with a warning) when the store cannot be reached,
    /// instead of failing the login path with a 503
    pub fail_open: bool,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            max_failures: 5,
            lockout_window_secs: 900, // 15 minutes
            fail_open: true,
        }
    }
}

impl GuardSettings {
    fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_failures: env::var("GUARD_MAX_FAILURES")
                .unwrap_or_else(|_| defaults.max_failures.to_string())
                .parse()
                .context("Invalid GUARD_MAX_FAILURES")?,
            lockout_window_secs: env::var("GUARD_LOCKOUT_WINDOW_SECS")
                .unwrap_or_else(|_| defaults.lockout_window_secs.to_string())
                .parse()
                .context("Invalid GUARD_LOCKOUT_WINDOW_SECS")?,
            fail_open: env::var("GUARD_FAIL_OPEN")
                .unwrap_or_else(|_| defaults.fail_open.to_string())
                .parse()
                .context("Invalid GUARD_FAIL_OPEN")?,
        })
    }

    pub fn lockout_window(&self) -> Duration {
        Duration::from_secs(self.lockout_window_secs)
    }
}

/// Host metrics sampler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerSettings {
    /// Seconds between host metric captures
    pub sample_interval_secs: u64,
    /// Number of snapshots retained in the history buffer
    pub history_capacity: usize,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            sample_interval_secs: 30,
            history_capacity: 100,
        }
    }
}

impl SamplerSettings {
    fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            sample_interval_secs: env::var("METRICS_SAMPLE_INTERVAL_SECS")
                .unwrap_or_else(|_| defaults.sample_interval_secs.to_string())
                .parse()
                .context("Invalid METRICS_SAMPLE_INTERVAL_SECS")?,
            history_capacity: env::var("METRICS_HISTORY_CAPACITY")
                .unwrap_or_else(|_| defaults.history_capacity.to_string())
                .parse()
                .context("Invalid METRICS_HISTORY_CAPACITY")?,
        })
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.sample_interval_secs)
    }
}
