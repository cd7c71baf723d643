use crate::error::LoadError;
use reqwest::blocking::Client;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Anything that can hand back the raw bytes of a named resource
pub trait Fetch {
    fn fetch(&self, resource: &str) -> Result<Vec<u8>, LoadError>;
}

/// Where the map resources live
pub enum DataSource {
    /// Files inside a local directory
    Dir(PathBuf),
    /// Files served relative to a base URL
    Http { base: String, client: Client },
}

impl DataSource {
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        DataSource::Dir(path.into())
    }

    pub fn http(base: impl Into<String>) -> Self {
        DataSource::Http {
            base: base.into(),
            client: Client::new(),
        }
    }

    /// Human readable location of a resource (path or URL)
    pub fn locate(&self, resource: &str) -> String {
        match self {
            DataSource::Dir(dir) => dir.join(resource).display().to_string(),
            DataSource::Http { base, .. } => join_url(base, resource),
        }
    }
}

impl Fetch for DataSource {
    fn fetch(&self, resource: &str) -> Result<Vec<u8>, LoadError> {
        debug!(location = %self.locate(resource), "fetching");
        match self {
            DataSource::Dir(dir) => fs::read(dir.join(resource)).map_err(|source| LoadError::Io {
                resource: resource.to_string(),
                source,
            }),
            DataSource::Http { base, client } => {
                let http_err = |source| LoadError::Http {
                    resource: resource.to_string(),
                    source,
                };
                let response = client.get(join_url(base, resource)).send().map_err(http_err)?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        resource: resource.to_string(),
                        status: status.as_u16(),
                    });
                }
                Ok(response.bytes().map_err(http_err)?.to_vec())
            }
        }
    }
}

fn join_url(base: &str, resource: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), resource.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://h/maps/", "all_counts.json"), "http://h/maps/all_counts.json");
        assert_eq!(join_url("http://h/maps", "/coordinates.json"), "http://h/maps/coordinates.json");
    }

    #[test]
    fn test_dir_missing_file() {
        let src = DataSource::dir(std::env::temp_dir().join("node-map-does-not-exist"));
        let err = src.fetch("all_counts.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { ref resource, .. } if resource == "all_counts.json"));
    }
}
