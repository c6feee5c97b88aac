use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use vectordive_link::{ConnectionParameters, LinkConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundStationConfig {
    pub heartbeat_timeout_s: f64,
    pub estimator_period_ms: u64,
    pub actuator_period_ms: u64,
    pub inertial_poll_timeout_ms: u64,
    pub actuator_poll_timeout_ms: u64,
    pub connection: ConnectionParameters,
}

impl Default for GroundStationConfig {
    fn default() -> Self {
        Self {
            heartbeat_timeout_s: 5.0,
            estimator_period_ms: 100,
            actuator_period_ms: 2000,
            inertial_poll_timeout_ms: 10,
            actuator_poll_timeout_ms: 10,
            connection: ConnectionParameters::default(),
        }
    }
}

impl GroundStationConfig {
    pub fn load() -> Result<Self> {
        let config = Self::try_load();
        if config.is_ok() {
            return config;
        }

        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    pub fn try_load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)?;
        let config = toml::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        let config_str = toml::to_string_pretty(self)?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(config_path, config_str)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "VectorDive", "vectordive")
            .ok_or_else(|| anyhow!("no home directory to store the configuration in"))?;
        Ok(dirs.config_dir().join("ground-station.toml"))
    }

    pub fn link_config(&self) -> Result<LinkConfig> {
        let heartbeat_timeout = Duration::try_from_secs_f64(self.heartbeat_timeout_s)
            .with_context(|| format!("invalid heartbeat_timeout_s {}", self.heartbeat_timeout_s))?;
        Ok(LinkConfig { heartbeat_timeout })
    }

    pub fn estimator_period(&self) -> Result<Duration> {
        non_zero_period("estimator_period_ms", self.estimator_period_ms)
    }

    pub fn actuator_period(&self) -> Result<Duration> {
        non_zero_period("actuator_period_ms", self.actuator_period_ms)
    }

    pub fn inertial_poll_timeout(&self) -> Duration {
        Duration::from_millis(self.inertial_poll_timeout_ms)
    }

    pub fn actuator_poll_timeout(&self) -> Duration {
        Duration::from_millis(self.actuator_poll_timeout_ms)
    }
}

fn non_zero_period(name: &str, ms: u64) -> Result<Duration> {
    if ms == 0 {
        return Err(anyhow!("{} must be greater than zero", name));
    }
    Ok(Duration::from_millis(ms))
}
