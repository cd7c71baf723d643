use crate::data::{DataSource, Resources};
use crate::error::ConfigError;
use crate::scene::{SceneOptions, CITY_RADIUS, MIN_COUNT};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "node-map.toml";

/// Data directory used when neither a directory nor a URL is configured
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub map: MapConfig,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct SourceConfig {
    /// Local directory holding the resources
    pub dir: Option<PathBuf>,
    /// Base URL the resources are served under
    pub url: Option<String>,
    #[serde(flatten)]
    pub resources: Resources,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub min_count: u64,
    pub city_radius: u16,
    /// Initial view center as [lat, lon]
    pub center: [f64; 2],
    pub zoom: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            min_count: MIN_COUNT,
            city_radius: CITY_RADIUS,
            center: [20.0, 0.0],
            zoom: 1.0,
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.source.dir.is_some() && config.source.url.is_some() {
            return Err(ConfigError::ConflictingSource);
        }
        Ok(config)
    }

    /// Load `path` if given, else the default file if it exists, else defaults
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load_from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Resource location; an explicit URL wins, then the directory, then `./data`
    pub fn data_source(&self) -> DataSource {
        match (&self.source.url, &self.source.dir) {
            (Some(url), _) => DataSource::http(url.clone()),
            (None, Some(dir)) => DataSource::dir(dir.clone()),
            (None, None) => DataSource::dir(DEFAULT_DATA_DIR),
        }
    }

    pub fn scene_options(&self) -> SceneOptions {
        SceneOptions {
            min_count: self.map.min_count,
            city_radius: self.map.city_radius,
        }
    }
}
