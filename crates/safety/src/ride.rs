use std::path::Path;

use board::BoardState;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ConfigError, SafetyConfig};

/// Loading of TOML documents with a post-parse validation hook.
pub trait ConfigLoader: Sized + DeserializeOwned {
    /// Semantic checks run after parsing. Accepts everything by default.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let value: Self = toml::from_str(text)?;
        value.validate()?;
        Ok(value)
    }

    fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "loading ride file");
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Io { source: e }
            }
        })?;
        Self::from_toml_str(&text)
    }
}

/// A saved ride: controller thresholds plus a telemetry snapshot.
///
/// ```toml
/// [config]
/// tiltback_duty = 0.8
///
/// [state]
/// duty = 0.7
/// mosfetTemp = 60
/// ```
///
/// Missing tables and keys take the stock defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RideFile {
    pub config: SafetyConfig,
    pub state: BoardState,
}

impl ConfigLoader for RideFile {
    fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }
}
