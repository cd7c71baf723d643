use std::path::PathBuf;
use thiserror::Error;

/// Failures while fetching or decoding the map resources.
///
/// Every variant is fatal to the render; nothing is retried.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {resource}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request for {resource} failed")]
    Http {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error! status: {status} ({resource})")]
    Status { resource: String, status: u16 },

    #[error("malformed JSON in {resource}")]
    Json {
        resource: String,
        #[source]
        source: simd_json::Error,
    },

    #[error("malformed GeoJSON in {resource}")]
    GeoJson {
        resource: String,
        #[source]
        source: Box<geojson::Error>,
    },

    #[error("Invalid or empty GeoJSON data in {resource}")]
    EmptyGeoJson { resource: String },
}

/// Failures while reading the optional TOML config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config sets both source.dir and source.url")]
    ConflictingSource,
}
