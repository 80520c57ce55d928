use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;
use crate::records::{Catalog, Instrument, Visualizer};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub socket: SocketConfig,
}

/// Instruments and visualizers the client knows about.  Navigation can only
/// select entries listed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_instruments")]
    pub instruments: Vec<Instrument>,
    #[serde(default = "default_visualizers")]
    pub visualizers: Vec<Visualizer>,
}

impl CatalogConfig {
    pub fn instrument_catalog(&self) -> Catalog<Instrument> {
        Catalog::new(self.instruments.iter().cloned())
    }

    pub fn visualizer_catalog(&self) -> Catalog<Visualizer> {
        Catalog::new(self.visualizers.iter().cloned())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Log file name inside the data directory.
    #[serde(default = "default_log_file_name")]
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            instruments: default_instruments(),
            visualizers: default_visualizers(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file_name: default_log_file_name(),
        }
    }
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

fn default_instruments() -> Vec<Instrument> {
    vec![
        Instrument::new("piano", "Acoustic grand piano"),
        Instrument::new("flute", "Concert flute"),
        Instrument::new("xylophone", "Wooden xylophone"),
        Instrument::new("violin", "Solo violin"),
    ]
}

fn default_visualizers() -> Vec<Visualizer> {
    vec![
        Visualizer::new("waves", "Oscilloscope trace"),
        Visualizer::new("bars", "Spectrum bars"),
        Visualizer::new("spiral", "Polar spectrum"),
    ]
}

fn default_log_filter() -> String {
    "debug".to_string()
}

fn default_log_file_name() -> String {
    "jukebox.log".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    4000
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load from `path`, writing the defaults there first if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    pub fn log_path(&self) -> PathBuf {
        platform::data_dir().join(&self.logging.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.socket.connect_timeout_ms, 4000);
        assert!(config.catalog.instrument_catalog().find("piano").is_some());
        assert!(config.catalog.visualizer_catalog().find("bars").is_some());
    }

    #[test]
    fn test_load_writes_defaults_then_reads_them_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let first = Config::load_from(&path).unwrap();
        assert!(path.exists());

        let second = Config::load_from(&path).unwrap();
        assert_eq!(second.catalog.instruments, first.catalog.instruments);
        assert_eq!(second.logging.file_name, "jukebox.log");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[catalog]\ninstruments = [{ name = \"harp\" }]\n\n[socket]\nconnect_timeout_ms = 250\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        let instruments = config.catalog.instrument_catalog();
        assert_eq!(instruments.len(), 1);
        assert_eq!(instruments.find("harp").unwrap().description, "");
        assert_eq!(config.catalog.visualizers.len(), 3);
        assert_eq!(config.socket.connect_timeout_ms, 250);
        assert_eq!(config.logging.filter, "debug");
    }
}
