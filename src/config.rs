use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use anyhow::Context;
use log::debug;

use crate::bencode::{DecodeOptions, DEFAULT_MAX_DEPTH};

pub const DEFAULT_CONFIG_PATH: &str = "rusbencode.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_depth: usize,
    pub utf8_keys: bool,
    pub require_sorted_keys: bool,
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            utf8_keys: false,
            require_sorted_keys: false,
            pretty: false,
        }
    }
}

impl Config {
    /// Loads `path` if given, else `rusbencode.toml` in the working directory
    /// when it exists, else the defaults. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))
            }
            None => {
                debug!("no {} found, using defaults", DEFAULT_CONFIG_PATH);
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            max_depth: self.max_depth,
            utf8_keys: self.utf8_keys,
            require_sorted_keys: self.require_sorted_keys,
        }
    }
}
