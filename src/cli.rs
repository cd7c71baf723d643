use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

/// Terminal choropleth of node counts per country and city
#[derive(Debug, Parser)]
#[command(name = "node-map", version, about)]
pub struct CliArgs {
    /// Directory holding all_counts.json, coordinates.json and countries.geojson
    #[arg(short = 'd', long = "data", value_name = "DIR", conflicts_with = "url")]
    pub data: Option<PathBuf>,

    /// Base URL the data files are served under
    #[arg(short = 'u', long = "url", value_name = "BASE")]
    pub url: Option<String>,

    /// TOML config file (defaults to ./node-map.toml when present)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log file; the terminal itself is taken by the map
    #[arg(long = "log-file", value_name = "FILE", default_value = "node-map.log")]
    pub log_file: PathBuf,

    /// Only count above this gets a marker or popup
    #[arg(long = "min-count")]
    pub min_count: Option<u64>,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CliArgs {
    /// Flags override whatever the config file said
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.data {
            config.source.dir = Some(dir.clone());
            config.source.url = None;
        }
        if let Some(url) = &self.url {
            config.source.url = Some(url.clone());
            config.source.dir = None;
        }
        if let Some(min_count) = self.min_count {
            config.map.min_count = min_count;
        }
    }

    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = CliArgs::try_parse_from(["node-map", "--url", "http://localhost:8000", "--min-count", "5", "-vv"]).unwrap();
        let mut config = AppConfig::default();
        config.source.dir = Some(PathBuf::from("data"));
        args.apply(&mut config);

        assert_eq!(config.source.url.as_deref(), Some("http://localhost:8000"));
        assert!(config.source.dir.is_none());
        assert_eq!(config.map.min_count, 5);
        assert_eq!(args.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["node-map"]).unwrap();
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert!(config.source.dir.is_none() && config.source.url.is_none());
        assert_eq!(config.map.min_count, 10);
        assert_eq!(args.log_file, PathBuf::from("node-map.log"));
        assert_eq!(args.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_dir_and_url_conflict() {
        assert!(CliArgs::try_parse_from(["node-map", "--data", "d", "--url", "http://x"]).is_err());
    }
}
