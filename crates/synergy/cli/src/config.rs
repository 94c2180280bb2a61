//! Replay configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use synergy_state::EngineConfig;
use synergy_types::Token;

use crate::error::{CliError, CliResult};

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "synergy.toml";

/// A member signed in at epoch zero, before the feed starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisMember {
    pub handle: String,
    pub token: Token,
}

/// Replay configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// State machine tunables
    pub engine: EngineConfig,

    /// Members present at genesis
    pub members: Vec<GenesisMember>,
}

impl ReplayConfig {
    /// Load configuration from file. A missing file yields the defaults.
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if config_path.exists() {
            Self::from_file(&config_path)
        } else {
            Ok(ReplayConfig::default())
        }
    }

    fn from_file(path: &Path) -> CliResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ReplayConfig =
            toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.engine.reactions_count == 0 {
            return Err(CliError::Config("reactions_count must be positive".into()));
        }
        for (i, member) in self.members.iter().enumerate() {
            let duplicate = self.members[..i]
                .iter()
                .any(|m| m.handle == member.handle || m.token == member.token);
            if duplicate {
                return Err(CliError::Config(format!(
                    "genesis member {} is listed twice",
                    member.handle
                )));
            }
        }
        Ok(())
    }
}
