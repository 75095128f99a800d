//! Configuration management for flysafe.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::YearRange;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "flysafe";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLYSAFE_`, sections split by `__`)
/// 2. TOML config file at `~/.config/flysafe/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input table locations.
    pub data: DataConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Dashboard defaults and limits.
    pub dashboard: DashboardConfig,
}

/// Where the three input tables and the image assets live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory the file names below are resolved against.
    pub data_dir: PathBuf,
    /// Geocoded accident records.
    pub accidents_file: PathBuf,
    /// Accident to regulation impact records.
    pub impacts_file: PathBuf,
    /// Cleaned records used for aggregates, capacity and the heatmap.
    pub aggregates_file: PathBuf,
    /// Directory holding `aircraft/*.svg`.
    pub assets_dir: PathBuf,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_address: String,
    /// Port to listen on.
    pub port: u16,
    /// Seconds a session may go unused before it is dropped.
    pub session_idle_secs: u64,
}

/// Dashboard defaults and limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// First year kept by the loader.
    pub year_min: i32,
    /// Last year kept by the loader.
    pub year_max: i32,
    /// Default start of the aircraft card range.
    pub card_year_start: i32,
    /// Default end of the aircraft card range.
    pub card_year_end: i32,
    /// Number of aircraft types shown as cards.
    pub top_aircraft: usize,
    /// Number of rows in the recent accidents table.
    pub recent_limit: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            accidents_file: PathBuf::from("geocoded_new_data.csv"),
            impacts_file: PathBuf::from("airplane_accidents_sankey.csv"),
            aggregates_file: PathBuf::from("cleaned_flight_accidents.csv"),
            assets_dir: PathBuf::from("assets"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8050,
            session_idle_secs: 30 * 60,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            year_min: 1960,
            year_max: 2025,
            card_year_start: 2010,
            card_year_end: 2025,
            top_aircraft: 3,
            recent_limit: 5,
        }
    }
}

impl DataConfig {
    /// Resolved path of the accidents table.
    #[must_use]
    pub fn accidents_path(&self) -> PathBuf {
        self.data_dir.join(&self.accidents_file)
    }

    /// Resolved path of the impacts table.
    #[must_use]
    pub fn impacts_path(&self) -> PathBuf {
        self.data_dir.join(&self.impacts_file)
    }

    /// Resolved path of the cleaned aggregates table.
    #[must_use]
    pub fn aggregates_path(&self) -> PathBuf {
        self.data_dir.join(&self.aggregates_file)
    }

    /// Resolved assets directory.
    #[must_use]
    pub fn assets_path(&self) -> PathBuf {
        self.data_dir.join(&self.assets_dir)
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FLYSAFE_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let dash = &self.dashboard;

        if dash.year_min > dash.year_max {
            return Err(Error::ConfigValidation {
                message: format!(
                    "year_min ({}) cannot be greater than year_max ({})",
                    dash.year_min, dash.year_max
                ),
            });
        }

        let window = dash.year_min..=dash.year_max;
        if !window.contains(&dash.card_year_start) || !window.contains(&dash.card_year_end) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "card range {}..={} must lie within {}..={}",
                    dash.card_year_start, dash.card_year_end, dash.year_min, dash.year_max
                ),
            });
        }

        if dash.top_aircraft == 0 {
            return Err(Error::ConfigValidation {
                message: "top_aircraft must be greater than 0".to_string(),
            });
        }

        if dash.recent_limit == 0 {
            return Err(Error::ConfigValidation {
                message: "recent_limit must be greater than 0".to_string(),
            });
        }

        if self.server.session_idle_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "session_idle_secs must be greater than 0".to_string(),
            });
        }

        if self.socket_addr().is_err() {
            return Err(Error::ConfigValidation {
                message: format!("invalid bind_address: {}", self.server.bind_address),
            });
        }

        Ok(())
    }

    /// The year window the loader keeps.
    ///
    /// # Errors
    ///
    /// Returns an error if `year_min > year_max`.
    pub fn window(&self) -> Result<YearRange> {
        YearRange::new(self.dashboard.year_min, self.dashboard.year_max)
    }

    /// How long an unused session is kept.
    #[must_use]
    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.server.session_idle_secs)
    }

    /// The address the HTTP server listens on.
    ///
    /// # Errors
    ///
    /// Returns an error if `bind_address` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip = self
            .server
            .bind_address
            .parse()
            .map_err(|_| Error::ConfigValidation {
                message: format!("invalid bind_address: {}", self.server.bind_address),
            })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.dashboard.year_min, 1960);
        assert_eq!(config.dashboard.year_max, 2025);
        assert_eq!(config.server.port, 8050);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_dashboard_config() {
        let dash = DashboardConfig::default();

        assert_eq!(dash.card_year_start, 2010);
        assert_eq!(dash.card_year_end, 2025);
        assert_eq!(dash.top_aircraft, 3);
        assert_eq!(dash.recent_limit, 5);
    }

    #[test]
    fn test_data_paths_resolve_against_data_dir() {
        let mut data = DataConfig::default();
        data.data_dir = PathBuf::from("/srv/flysafe");

        assert_eq!(
            data.accidents_path(),
            PathBuf::from("/srv/flysafe/geocoded_new_data.csv")
        );
        assert_eq!(
            data.impacts_path(),
            PathBuf::from("/srv/flysafe/airplane_accidents_sankey.csv")
        );
        assert_eq!(
            data.aggregates_path(),
            PathBuf::from("/srv/flysafe/cleaned_flight_accidents.csv")
        );
        assert_eq!(data.assets_path(), PathBuf::from("/srv/flysafe/assets"));
    }

    #[test]
    fn test_validate_inverted_window() {
        let mut config = Config::default();
        config.dashboard.year_min = 2030;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("year_min"));
    }

    #[test]
    fn test_validate_card_range_outside_window() {
        let mut config = Config::default();
        config.dashboard.card_year_start = 1950;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("card range"));
    }

    #[test]
    fn test_validate_zero_limits() {
        let mut config = Config::default();
        config.dashboard.top_aircraft = 0;
        assert!(config.validate().unwrap_err().to_string().contains("top_aircraft"));

        let mut config = Config::default();
        config.dashboard.recent_limit = 0;
        assert!(config.validate().unwrap_err().to_string().contains("recent_limit"));
    }

    #[test]
    fn test_session_idle_timeout() {
        let mut config = Config::default();
        assert_eq!(config.session_idle_timeout(), Duration::from_secs(1800));

        config.server.session_idle_secs = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("session_idle_secs"));
    }

    #[test]
    fn test_validate_bad_bind_address() {
        let mut config = Config::default();
        config.server.bind_address = "not-an-ip".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("bind_address"));
    }

    #[test]
    fn test_window() {
        let config = Config::default();
        assert_eq!(config.window().unwrap(), YearRange::new(1960, 2025).unwrap());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::default();
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8050");
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("flysafe"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_toml_sections() {
        let dir = std::env::temp_dir().join(format!("flysafe-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "[data]\ndata_dir = \"/srv/data\"\n\n[dashboard]\ntop_aircraft = 5\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.data.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.dashboard.top_aircraft, 5);
        assert_eq!(config.server.port, 8050);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_dashboard_config_deserialize() {
        let json = r#"{"year_min": 1970, "recent_limit": 10}"#;
        let dash: DashboardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(dash.year_min, 1970);
        assert_eq!(dash.recent_limit, 10);
        assert_eq!(dash.year_max, 2025);
    }

    #[test]
    fn test_server_config_serialize() {
        let json = serde_json::to_string(&ServerConfig::default()).unwrap();
        assert!(json.contains("bind_address"));
        assert!(json.contains("8050"));
    }
}
