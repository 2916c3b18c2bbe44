//! Engine configuration.
//!
//! The relation catalog itself is code-level configuration
//! ([`crate::catalog::RelationCatalog::carelink`]); this module only carries
//! the tunables a deployment may want to adjust, loaded from YAML next to the
//! rest of the backend's config files.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Default traversal depth bound.
pub const DEFAULT_MAX_WALK_DEPTH: usize = 3;

/// Upper limit for the configurable depth bound.
pub const MAX_WALK_DEPTH_LIMIT: usize = 16;

/// Tunables for the cascade engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Depth bound for dependency traversal. Exceeding it aborts the walk
    /// with a suspected-cycle error instead of looping.
    #[serde(rename = "max-walk-depth", default = "default_max_walk_depth")]
    pub max_walk_depth: usize,
}

fn default_max_walk_depth() -> usize {
    DEFAULT_MAX_WALK_DEPTH
}

impl EngineConfig {
    /// Load configuration from a YAML file.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Validate configured values.
    pub fn validate(&self) -> Result<()> {
        if self.max_walk_depth == 0 {
            return Err(Error::Config(
                "max-walk-depth must be at least 1".to_string(),
            ));
        }
        if self.max_walk_depth > MAX_WALK_DEPTH_LIMIT {
            return Err(Error::Config(format!(
                "max-walk-depth cannot exceed {MAX_WALK_DEPTH_LIMIT}"
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_walk_depth: DEFAULT_MAX_WALK_DEPTH,
        }
    }
}
