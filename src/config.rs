//! Configuration: defaults → JSON file → environment → command line.
//!
//! Default file: ~/.evmap/config.json (optional). API keys are never built in;
//! set them in the file or via EVMAP_STATION_API_KEY / EVMAP_GEOCODER_API_KEY.

use crate::geocode::vworld::DEFAULT_VWORLD_URL;
use crate::map::cluster::MAX_ZOOM;
use crate::map::{ClusterOptions, MapOptions};
use crate::station::kepco::DEFAULT_KEPCO_URL;
use crate::station::PageRequest;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const STATION_KEY_VAR: &str = "EVMAP_STATION_API_KEY";
pub const GEOCODER_KEY_VAR: &str = "EVMAP_GEOCODER_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unknown timezone '{0}'. Use IANA format (e.g. Asia/Seoul)")]
    Timezone(String),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationsConfig {
    pub base_url: String,
    pub api_key: String,
    /// Metropolitan-area code (11 = Seoul)
    pub metro_code: String,
    pub page_size: u32,
    pub page_no: u32,
}

impl Default for StationsConfig {
    fn default() -> Self {
        let page = PageRequest::default();
        Self {
            base_url: DEFAULT_KEPCO_URL.into(),
            api_key: String::new(),
            metro_code: page.metro_code,
            page_size: page.page_size,
            page_no: page.page_no,
        }
    }
}

impl StationsConfig {
    pub fn page(&self) -> PageRequest {
        PageRequest {
            metro_code: self.metro_code.clone(),
            page_size: self.page_size,
            page_no: self.page_no,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_VWORLD_URL.into(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub stations: StationsConfig,
    pub geocoder: GeocoderConfig,
    pub map: MapOptions,
    pub cluster: ClusterOptions,
    pub server: ServerConfig,
    /// Zone used when showing the load time
    pub display_tz: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stations: StationsConfig::default(),
            geocoder: GeocoderConfig::default(),
            map: MapOptions::default(),
            cluster: ClusterOptions::default(),
            server: ServerConfig::default(),
            display_tz: "Asia/Seoul".into(),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".evmap")
            .join("config.json")
    }

    /// Load from `path`, or from the default path if it exists, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::read_file(p),
            None => {
                let p = Self::default_path();
                if p.exists() {
                    Self::read_file(&p)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override API keys from the environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var(STATION_KEY_VAR).filter(|k| !k.trim().is_empty()) {
            self.stations.api_key = key;
        }
        if let Some(key) = var(GEOCODER_KEY_VAR).filter(|k| !k.trim().is_empty()) {
            self.geocoder.api_key = key;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.display_zone()?;
        if self.stations.page_size == 0 {
            return Err(ConfigError::Invalid("stations.page_size must be at least 1".into()));
        }
        if self.stations.page_no == 0 {
            return Err(ConfigError::Invalid("stations.page_no starts at 1".into()));
        }
        if self.map.zoom > MAX_ZOOM {
            return Err(ConfigError::Invalid(format!("map.zoom must be 0..={}", MAX_ZOOM)));
        }
        if !self.map.center.is_valid() {
            return Err(ConfigError::Invalid("map.center is not a valid coordinate".into()));
        }
        Ok(())
    }

    pub fn display_zone(&self) -> Result<Tz, ConfigError> {
        self.display_tz
            .parse()
            .map_err(|_| ConfigError::Timezone(self.display_tz.clone()))
    }

    /// Names of API keys that are still empty.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.stations.api_key.is_empty() {
            missing.push(STATION_KEY_VAR);
        }
        if self.geocoder.api_key.is_empty() {
            missing.push(GEOCODER_KEY_VAR);
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::Coordinate;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.stations.metro_code, "11");
        assert_eq!(cfg.stations.page_size, 20);
        assert_eq!(cfg.map.center, Coordinate::new(37.5665, 126.9780));
        assert_eq!(cfg.server.port, 3000);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.missing_keys(), vec![STATION_KEY_VAR, GEOCODER_KEY_VAR]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"stations": {"api_key": "abc", "metro_code": "26"}, "map": {"zoom": 11}, "cluster": {"max_cluster_radius": 60}}"#,
        )
        .unwrap();

        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.stations.api_key, "abc");
        assert_eq!(cfg.stations.metro_code, "26");
        assert_eq!(cfg.stations.page_size, 20);
        assert_eq!(cfg.map.zoom, 11);
        assert_eq!(cfg.map.tile_url, MapOptions::default().tile_url);
        assert_eq!(cfg.cluster.max_cluster_radius, 60.0);
        assert_eq!(cfg.cluster.disable_clustering_at_zoom, 18);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_env_overrides_keys() {
        let mut cfg = Config::default();
        cfg.stations.api_key = "from-file".into();
        cfg.apply_vars(|name| match name {
            GEOCODER_KEY_VAR => Some("vw-key".into()),
            STATION_KEY_VAR => Some("   ".into()),
            _ => None,
        });
        assert_eq!(cfg.stations.api_key, "from-file");
        assert_eq!(cfg.geocoder.api_key, "vw-key");
        assert!(cfg.missing_keys().is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.display_tz = "Mars/Olympus".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::Timezone(_))));

        let mut cfg = Config::default();
        cfg.stations.page_size = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.map.zoom = 25;
        assert!(cfg.validate().is_err());
    }
}
