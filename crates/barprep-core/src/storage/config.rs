//! TOML-based application configuration.
//!
//! Stores the tunables of the onboarding and engagement flow:
//! - Free-trial quota, sampled areas and optional sampling seed
//! - Demo question filter
//! - Home-panel ceilings and the social-proof drift interval
//!
//! Configuration is stored at `~/.config/barprep/config.toml`.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, CoreError};
use crate::question::QuestionFilter;

/// Free-exploration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialConfig {
    #[serde(default = "default_trial_limit")]
    pub limit: usize,
    #[serde(default = "default_trial_areas")]
    pub areas: Vec<String>,
    /// Pool size fetched per trial, as a multiple of `limit`.
    #[serde(default = "default_pool_factor")]
    pub pool_factor: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// First-question demo settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_demo_area")]
    pub area: String,
    #[serde(default = "default_demo_candidates")]
    pub candidates: usize,
}

/// Home-tab engagement settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// Quick-wins panel shows while `questions_answered <=` this.
    #[serde(default = "default_achievements_ceiling")]
    pub achievements_ceiling: u64,
    #[serde(default = "default_journey_ceiling")]
    pub journey_ceiling: u64,
    #[serde(default = "default_social_proof_ceiling")]
    pub social_proof_ceiling: u64,
    #[serde(default = "default_social_proof_interval_secs")]
    pub social_proof_interval_secs: u64,
    /// Mount returning visitors into the returning-welcome screen.
    #[serde(default)]
    pub returning_welcome: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/barprep/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub trial: TrialConfig,
    #[serde(default)]
    pub demo: DemoConfig,
    #[serde(default)]
    pub engagement: EngagementConfig,
}

// Default functions
fn default_trial_limit() -> usize {
    crate::trial::FREE_LIMIT
}
fn default_trial_areas() -> Vec<String> {
    vec![
        "Direito Constitucional".into(),
        "Direito Civil".into(),
        "Direito Penal".into(),
    ]
}
fn default_pool_factor() -> usize {
    2
}
fn default_demo_area() -> String {
    "Direito Constitucional".into()
}
fn default_demo_candidates() -> usize {
    5
}
fn default_achievements_ceiling() -> u64 {
    10
}
fn default_journey_ceiling() -> u64 {
    15
}
fn default_social_proof_ceiling() -> u64 {
    5
}
fn default_social_proof_interval_secs() -> u64 {
    30
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            limit: default_trial_limit(),
            areas: default_trial_areas(),
            pool_factor: default_pool_factor(),
            seed: None,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            area: default_demo_area(),
            candidates: default_demo_candidates(),
        }
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            achievements_ceiling: default_achievements_ceiling(),
            journey_ceiling: default_journey_ceiling(),
            social_proof_ceiling: default_social_proof_ceiling(),
            social_proof_interval_secs: default_social_proof_interval_secs(),
            returning_welcome: false,
        }
    }
}

impl TrialConfig {
    /// Filter for the candidate pool of one trial.
    pub fn pool_filter(&self) -> QuestionFilter {
        QuestionFilter::areas(self.areas.iter().cloned())
            .with_limit(self.limit.max(1).saturating_mul(self.pool_factor.max(1)))
    }
}

impl EngagementConfig {
    /// Drift interval of the social-proof banner, saturating at the largest
    /// representable duration.
    pub fn social_proof_interval(&self) -> Duration {
        i64::try_from(self.social_proof_interval_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }
}

impl DemoConfig {
    pub fn filter(&self) -> QuestionFilter {
        QuestionFilter::areas([self.area.clone()]).with_limit(self.candidates.max(1))
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    // Unset optionals accept JSON, then fall back to a plain string.
                    serde_json::Value::Null => serde_json::from_str(value)
                        .unwrap_or_else(|_| serde_json::Value::String(value.into())),
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into()
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "config unavailable, using defaults");
            Self::default()
        })
    }
}
