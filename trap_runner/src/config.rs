//! Runner configuration.
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! log_level = "info"
//! service_name = "trap-runner"
//!
//! [trap]
//! mode = "checkpoint-resume"
//!
//! [[unit]]
//! name = "parse"
//! depth = 3
//!
//! [[unit]]
//! name = "lower"
//! depth = 12
//! checkpoint_at = 4
//! fail = "unsupported construct"
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use trap_common::config::{ConfigError, ConfigLoader, SharedConfig, TrapConfig};
use trap_common::consts::MAX_UNIT_DEPTH;

fn default_depth() -> u32 {
    1
}

/// One unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitConfig {
    /// Unique unit name, used in reports.
    pub name: String,

    /// How many nested calls the unit makes before it bottoms out.
    #[serde(default = "default_depth")]
    pub depth: u32,

    /// Level at which the unit establishes its own inner checkpoint.
    #[serde(default)]
    pub checkpoint_at: Option<u32>,

    /// Signal this fatal error at the bottom of the nesting.
    #[serde(default)]
    pub fail: Option<String>,
}

/// Complete runner configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Shared logging/service settings.
    pub shared: SharedConfig,

    /// Fatal-error mode selection.
    #[serde(default)]
    pub trap: TrapConfig,

    /// Units, run in file order.
    #[serde(default, rename = "unit")]
    pub units: Vec<UnitConfig>,
}

impl RunnerConfig {
    /// Load and validate a runner configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `service_name` is empty
    /// - a unit name is empty or repeated
    /// - a unit is deeper than `MAX_UNIT_DEPTH`
    /// - `checkpoint_at` lies below the unit's depth
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        let mut seen = HashSet::new();
        for unit in &self.units {
            if unit.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "unit name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(unit.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate unit name '{}'",
                    unit.name
                )));
            }
            if unit.depth > MAX_UNIT_DEPTH {
                return Err(ConfigError::ValidationError(format!(
                    "unit '{}': depth {} exceeds {MAX_UNIT_DEPTH}",
                    unit.name, unit.depth
                )));
            }
            if let Some(level) = unit.checkpoint_at {
                if level > unit.depth {
                    return Err(ConfigError::ValidationError(format!(
                        "unit '{}': checkpoint_at {level} is below depth {}",
                        unit.name, unit.depth
                    )));
                }
            }
        }
        Ok(())
    }
}
