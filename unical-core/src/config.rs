//! Server configuration.
//!
//! Read from an optional TOML file (`~/.config/unical/config.toml` unless a
//! path is given) and overridden by `UNICAL_` environment variables, with
//! `__` between section and key (e.g. `UNICAL_CACHE__TTL=5m`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer};

use crate::error::{UnicalError, UnicalResult};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnicalConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub timetable: TimetableSettings,
    #[serde(default)]
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            address: default_address(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:8080".to_string()
}

/// Location of the open-data snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_courses_path")]
    pub courses: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        DataSettings {
            courses: default_courses_path(),
        }
    }
}

impl DataSettings {
    /// Snapshot path with `~` expanded.
    pub fn courses_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.courses).into_owned())
    }
}

fn default_courses_path() -> String {
    "~/.local/share/unical/courses.json".to_string()
}

/// How timetables are fetched from course websites.
#[derive(Debug, Clone, Deserialize)]
pub struct TimetableSettings {
    /// Path appended to the course URL to reach its timetable JSON.
    #[serde(default = "default_timetable_path")]
    pub path: String,
    /// IANA zone the published times are expressed in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_timeout", deserialize_with = "human_duration")]
    pub timeout: Duration,
}

impl Default for TimetableSettings {
    fn default() -> Self {
        TimetableSettings {
            path: default_timetable_path(),
            timezone: default_timezone(),
            timeout: default_timeout(),
        }
    }
}

fn default_timetable_path() -> String {
    "orario-lezioni/@@orario_reale_json".to_string()
}

fn default_timezone() -> String {
    "Europe/Rome".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(15)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// How long a synthesized calendar is served before being rebuilt.
    #[serde(default = "default_ttl", deserialize_with = "human_duration")]
    pub ttl: Duration,
    /// Entries not read for this long are dropped by the sweep.
    #[serde(default = "default_idle", deserialize_with = "human_duration")]
    pub idle: Duration,
    #[serde(default = "default_sweep_interval", deserialize_with = "human_duration")]
    pub sweep_interval: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            ttl: default_ttl(),
            idle: default_idle(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

fn default_ttl() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_idle() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

fn human_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(&s).map_err(serde::de::Error::custom)
}

impl UnicalConfig {
    pub fn config_path() -> UnicalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| UnicalError::Config("Could not determine config directory".into()))?
            .join("unical");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration. An explicitly given file must exist; the default
    /// one is optional.
    pub fn load(path: Option<&Path>) -> UnicalResult<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::config_path()?, false),
        };

        let config: UnicalConfig = Config::builder()
            .add_source(File::from(path).required(required))
            .add_source(Environment::with_prefix("UNICAL").separator("__"))
            .build()
            .map_err(|e| UnicalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| UnicalError::Config(e.to_string()))?;

        if config.cache.sweep_interval.is_zero() {
            return Err(UnicalError::Config(
                "cache.sweep_interval must be greater than zero".into(),
            ));
        }

        Ok(config)
    }
}
