use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::bencode::{DecodeOptions, DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};

pub const DEFAULT_CONFIG_PATH: &str = "bencodec.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_depth: usize,
    pub strict: bool,
    pub pretty: bool, // pretty-print JSON output
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict: false,
            pretty: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Reads the TOML file at `path`, falling back to defaults when it does not exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("checking config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth > MAX_DEPTH_LIMIT {
            bail!("max_depth {} exceeds the limit of {}", self.max_depth, MAX_DEPTH_LIMIT);
        }
        Ok(())
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            max_depth: self.max_depth,
            strict: self.strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.decode_options(), DecodeOptions::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bencodec.toml");
        fs::write(&path, "strict = true\nmax_depth = 8\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.strict);
        assert!(!config.pretty);
        assert_eq!(config.decode_options(), DecodeOptions { max_depth: 8, strict: true });
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bencodec.toml");
        fs::write(&path, "max_depth = \"deep\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_excessive_max_depth_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bencodec.toml");
        fs::write(&path, format!("max_depth = {}\n", MAX_DEPTH_LIMIT + 1)).unwrap();
        assert!(Config::load_from(&path).is_err());

        fs::write(&path, format!("max_depth = {}\n", MAX_DEPTH_LIMIT)).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().max_depth, MAX_DEPTH_LIMIT);
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = Config { max_depth: 3, strict: true, pretty: true };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(toml::from_str::<Config>(&text).unwrap(), config);
    }
}
