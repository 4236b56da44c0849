//! # Generator Configuration
//!
//! TOML-backed settings for a generation run. Every field has a default, so
//! an empty document is a valid configuration.
//!
//! ```toml
//! module_root = "Graphics.GL"
//! constant_prefix = "GL_"
//! function_prefix = "gl"
//! collision_policy = "warn"
//! ```

use crate::GenError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maximum configuration file size (64 KiB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// What to do when two registry names canonicalize to the same identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Log the collision and keep the last declaration.
    #[default]
    Warn,
    /// Abort the run on the first collision.
    Reject,
}

/// Settings for a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Namespace every module path is qualified under.
    pub module_root: String,
    /// Public tag prefixed to canonical constant names.
    pub constant_prefix: String,
    /// Public tag prefixed to canonical function names.
    pub function_prefix: String,
    pub collision_policy: CollisionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            module_root: "Graphics.GL".to_string(),
            constant_prefix: "GL_".to_string(),
            function_prefix: "gl".to_string(),
            collision_policy: CollisionPolicy::Warn,
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, GenError> {
        let config: Self =
            toml::from_str(source).map_err(|e| GenError::Config(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, GenError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            GenError::Io(format!("Cannot read metadata of '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(GenError::Config(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let source = std::fs::read_to_string(path)
            .map_err(|e| GenError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Reject settings that would produce unusable names.
    pub fn validate(&self) -> Result<(), GenError> {
        if self.module_root.trim().is_empty() {
            return Err(GenError::Config("module_root must not be empty".to_string()));
        }
        if self.constant_prefix.is_empty() {
            return Err(GenError::Config(
                "constant_prefix must not be empty".to_string(),
            ));
        }
        if self.function_prefix.is_empty() {
            return Err(GenError::Config(
                "function_prefix must not be empty".to_string(),
            ));
        }
        if self.constant_prefix.starts_with(&self.function_prefix)
            || self.function_prefix.starts_with(&self.constant_prefix)
        {
            return Err(GenError::Config(format!(
                "constant_prefix `{}` and function_prefix `{}` overlap",
                self.constant_prefix, self.function_prefix
            )));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
