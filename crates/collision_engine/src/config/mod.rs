//! Configuration system

pub use serde::{Deserialize, Serialize};

use crate::foundation::math::constants;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_str_with_format(&contents, path)
    }

    /// Parse configuration text, choosing the format from `path`'s extension
    fn from_str_with_format(contents: &str, path: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value parsed fine but is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for a collision world
///
/// `cell_size` usually matches the level's tile size. Larger cells mean fewer
/// buckets but more false positives handed to the narrowphase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollisionConfig {
    /// Edge length of one spatial partition cell, in world units
    pub cell_size: f32,

    /// Upper bound on contact resolutions within a single `move_body` call
    pub max_resolution_iterations: u32,

    /// Vertical offset used by `is_grounded`
    pub ground_probe: f32,

    /// Response velocities shorter than this end the movement
    pub min_velocity: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            cell_size: 16.0,
            max_resolution_iterations: 16,
            ground_probe: 1.0,
            min_velocity: constants::MIN_VELOCITY,
        }
    }
}

impl CollisionConfig {
    /// Config with a specific cell size and defaults elsewhere
    pub fn with_cell_size(cell_size: f32) -> Self {
        Self {
            cell_size,
            ..Self::default()
        }
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "cell_size must be positive and finite, got {}",
                self.cell_size
            )));
        }
        if self.max_resolution_iterations == 0 {
            return Err(ConfigError::Invalid(
                "max_resolution_iterations must be at least 1".to_string(),
            ));
        }
        if !self.min_velocity.is_finite() || self.min_velocity < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_velocity must be non-negative, got {}",
                self.min_velocity
            )));
        }
        if !self.ground_probe.is_finite() {
            return Err(ConfigError::Invalid("ground_probe must be finite".to_string()));
        }
        Ok(())
    }
}

impl Config for CollisionConfig {}
