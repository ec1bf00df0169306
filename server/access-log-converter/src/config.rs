//! Converter configuration with sane defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming a config file when none is passed explicitly.
pub const CONFIG_ENV: &str = "ACCESS_LOG_CONVERTER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("cannot read config {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid config {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid transformer spec `{0}`: expected FIELD=KIND")]
  Pair(String),
}

/// Settings for the converter binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Field name -> transformer kind. Applied in ascending field order.
  pub transformers: BTreeMap<String, String>,
  /// Source identifier handed to the converter with every record.
  pub topic: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      transformers: BTreeMap::new(),
      topic: "access_log".to_string(),
    }
  }
}

impl Config {
  /// Load `{"transformers": {...}, "topic": "..."}` from a JSON file.
  pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: display.clone(),
      source,
    })?;
    serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
      path: display,
      source,
    })
  }

  /// Config file from the explicit path, else from `ACCESS_LOG_CONVERTER_CONFIG`, else defaults.
  pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
    match path {
      Some(p) => Self::from_json_file(p),
      None => match std::env::var_os(CONFIG_ENV) {
        Some(p) if !p.is_empty() => Self::from_json_file(p),
        _ => Ok(Self::default()),
      },
    }
  }

  /// Merge `FIELD=KIND` pairs on top of the current transformers (later pairs win).
  pub fn with_pairs<I, S>(mut self, pairs: I) -> Result<Self, ConfigError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    for pair in pairs {
      let pair = pair.as_ref();
      let (field, kind) = pair
        .split_once('=')
        .map(|(f, k)| (f.trim(), k.trim()))
        .filter(|(f, k)| !f.is_empty() && !k.is_empty())
        .ok_or_else(|| ConfigError::Pair(pair.to_string()))?;
      self.transformers.insert(field.to_string(), kind.to_string());
    }
    Ok(self)
  }
}
