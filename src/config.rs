use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::classify::Policy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    FileRead(String, String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("no output path configured, set [output] path or pass --output")]
    MissingOutputPath,
}

/// Settings of one run, read from a TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub querylog: QuerylogConfig,
    pub geosite: GeositeConfig,
    pub geoip: GeoipConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuerylogConfig {
    /// Newline delimited JSON query log
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeositeConfig {
    pub path: PathBuf,

    #[serde(default)]
    pub exclude_codes: Vec<String>,

    #[serde(default)]
    pub exclude_domains: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoipConfig {
    pub path: PathBuf,

    #[serde(default)]
    pub include_codes: Vec<String>,

    #[serde(default)]
    pub exclude_codes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a specific file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.display().to_string(), e.to_string()))?;
        contents.parse()
    }

    pub fn output_path(&self) -> Result<&Path, ConfigError> {
        self.output
            .path
            .as_deref()
            .ok_or(ConfigError::MissingOutputPath)
    }

    /// Classification rules, codes are compared lower case
    pub fn policy(&self) -> Policy {
        let lower = |codes: &Vec<String>| -> Vec<String> {
            codes.iter().map(|c| c.to_lowercase()).collect()
        };
        Policy {
            geosite_exclude_codes: lower(&self.geosite.exclude_codes),
            geosite_exclude_domains: self.geosite.exclude_domains.clone(),
            geoip_include_codes: lower(&self.geoip.include_codes),
            geoip_exclude_codes: lower(&self.geoip.exclude_codes),
        }
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
