//! Tuning for the scorer and the selector.
//!
//! Defaults live in code; an optional JSON file and a handful of environment variables
//! override them. Missing files fall back to defaults, broken ones are reported.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "quartermaster.json";
pub const CONFIG_PATH_ENV: &str = "QUARTERMASTER_CONFIG";

const ABSTAIN_THRESHOLD_ENV: &str = "QUARTERMASTER_ABSTAIN_THRESHOLD";
const PURSUE_GROWTH_ENV: &str = "QUARTERMASTER_PURSUE_GROWTH";
const HONOR_CHECKPOINT_ENV: &str = "QUARTERMASTER_HONOR_CHECKPOINT";
const LATENCY_BUDGET_ENV: &str = "QUARTERMASTER_LATENCY_BUDGET_MS";

/// Weights of the action scorer. Penalties must outweigh rewards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Reward per unit of restored health or crew.
    pub gain: Decimal,
    /// Reward per unit of capacity growth.
    pub capacity_gain: Decimal,
    /// Penalty per unit of lost health or crew.
    pub current_penalty: Decimal,
    /// Penalty per unit of lost capacity.
    pub capacity_penalty: Decimal,
    /// Extra reward for restoring the less threatened resource.
    pub trade_off_bonus: Decimal,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            gain: Decimal::ONE,
            capacity_gain: Decimal::new(12, 1),
            current_penalty: Decimal::new(175, 2),
            capacity_penalty: Decimal::new(25, 1),
            trade_off_bonus: Decimal::new(1, 1),
        }
    }
}

impl ScoringWeights {
    /// Checks `capacity_penalty > current_penalty > gain <= capacity_gain`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let all = [
            self.gain,
            self.capacity_gain,
            self.current_penalty,
            self.capacity_penalty,
            self.trade_off_bonus,
        ];
        if all.iter().any(|w| *w < Decimal::ZERO) {
            return Err(ConfigError::Weights("weights must be non-negative".to_string()));
        }
        if self.capacity_penalty <= self.current_penalty {
            return Err(ConfigError::Weights(format!(
                "capacity_penalty {} must exceed current_penalty {}",
                self.capacity_penalty, self.current_penalty
            )));
        }
        if self.current_penalty <= self.gain {
            return Err(ConfigError::Weights(format!(
                "current_penalty {} must exceed gain {}",
                self.current_penalty, self.gain
            )));
        }
        if self.gain > self.capacity_gain {
            return Err(ConfigError::Weights(format!(
                "gain {} must not exceed capacity_gain {}",
                self.gain, self.capacity_gain
            )));
        }
        Ok(())
    }
}

/// Policy gates of the selector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    /// Selections whose summed score stays below this, without gaining more than the
    /// projected loss, are dropped entirely.
    pub abstain_threshold: Decimal,
    /// Select capacity growth for a saturated resource even when nothing threatens it.
    pub pursue_capacity_growth: bool,
    /// Keep actions that alone bring the vessel up to the next checkpoint.
    pub honor_checkpoint: bool,
    /// Second pass over leftover actions when the first one leaves loss unmitigated.
    pub fallback_pass: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            abstain_threshold: Decimal::ONE,
            pursue_capacity_growth: true,
            honor_checkpoint: true,
            fallback_pass: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: ScoringWeights,
    pub policy: SelectionPolicy,
    /// Decisions slower than this are reported; they are never cut short.
    pub latency_budget_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            policy: SelectionPolicy::default(),
            latency_budget_ms: 50,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config: EngineConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_string(),
                source,
            })?;
        config.weights.validate()?;
        Ok(config)
    }

    /// Load from `QUARTERMASTER_CONFIG` (or the default path), then apply env overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides looked up by `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ABSTAIN_THRESHOLD_ENV) {
            self.policy.abstain_threshold = parse_env(ABSTAIN_THRESHOLD_ENV, &raw)?;
        }
        if let Some(raw) = lookup(PURSUE_GROWTH_ENV) {
            self.policy.pursue_capacity_growth = parse_flag(PURSUE_GROWTH_ENV, &raw)?;
        }
        if let Some(raw) = lookup(HONOR_CHECKPOINT_ENV) {
            self.policy.honor_checkpoint = parse_flag(HONOR_CHECKPOINT_ENV, &raw)?;
        }
        if let Some(raw) = lookup(LATENCY_BUDGET_ENV) {
            self.latency_budget_ms = parse_env(LATENCY_BUDGET_ENV, &raw)?;
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::Env {
        key,
        value: raw.to_string(),
    })
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Env {
            key,
            value: raw.to_string(),
        }),
    }
}
