use std::{num::NonZeroUsize, path::Path};

use serde::{Deserialize, Serialize};

use crate::domain::department::LevelPolicy;

/// Tunables for the registrar.
///
/// Holds the default capacities new sections are created with, the cap on
/// an instructor's taught-section list, and the level-classification
/// thresholds. The serialized form is versioned so the file format can
/// evolve without breaking the domain type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct RegistrarConfig {
    /// Seat capacity for sections created from this configuration.
    section_capacity: NonZeroUsize,

    /// Waitlist capacity for sections created from this configuration.
    /// Zero disables the waitlist: overflow admissions fail outright.
    waitlist_capacity: usize,

    /// The cap on sections an instructor teaches at once.
    roster_limit: usize,

    /// Thresholds mapping course numbers to levels.
    levels: LevelPolicy,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            section_capacity: default_section_capacity(),
            waitlist_capacity: default_waitlist_capacity(),
            roster_limit: default_roster_limit(),
            levels: LevelPolicy::default(),
        }
    }
}

impl RegistrarConfig {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or the TOML
    /// content is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be serialized
    /// or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The seat capacity for new sections.
    #[must_use]
    pub const fn section_capacity(&self) -> NonZeroUsize {
        self.section_capacity
    }

    /// The waitlist capacity for new sections.
    #[must_use]
    pub const fn waitlist_capacity(&self) -> usize {
        self.waitlist_capacity
    }

    /// The cap on sections an instructor teaches at once.
    #[must_use]
    pub const fn roster_limit(&self) -> usize {
        self.roster_limit
    }

    /// The level-classification thresholds.
    #[must_use]
    pub const fn levels(&self) -> LevelPolicy {
        self.levels
    }

    /// Sets the seat capacity for new sections.
    pub const fn set_section_capacity(&mut self, capacity: NonZeroUsize) {
        self.section_capacity = capacity;
    }

    /// Sets the waitlist capacity for new sections.
    pub const fn set_waitlist_capacity(&mut self, capacity: usize) {
        self.waitlist_capacity = capacity;
    }

    /// Sets the cap on sections an instructor teaches at once.
    pub const fn set_roster_limit(&mut self, limit: usize) {
        self.roster_limit = limit;
    }

    /// Replaces the level-classification thresholds.
    pub const fn set_levels(&mut self, levels: LevelPolicy) {
        self.levels = levels;
    }
}

/// Errors that can occur when loading or saving the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for any known version.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

const fn default_section_capacity() -> NonZeroUsize {
    NonZeroUsize::new(30).unwrap()
}

const fn default_waitlist_capacity() -> usize {
    30
}

const fn default_roster_limit() -> usize {
    10
}

/// The serialized versions of the configuration.
/// This allows for future changes to the file format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_section_capacity")]
        section_capacity: NonZeroUsize,

        #[serde(default = "default_waitlist_capacity")]
        waitlist_capacity: usize,

        #[serde(default = "default_roster_limit")]
        roster_limit: usize,

        #[serde(default)]
        levels: LevelPolicy,
    },
}

impl From<Versions> for RegistrarConfig {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                section_capacity,
                waitlist_capacity,
                roster_limit,
                levels,
            } => Self {
                section_capacity,
                waitlist_capacity,
                roster_limit,
                levels,
            },
        }
    }
}

impl From<RegistrarConfig> for Versions {
    fn from(config: RegistrarConfig) -> Self {
        Self::V1 {
            section_capacity: config.section_capacity,
            waitlist_capacity: config.waitlist_capacity,
            roster_limit: config.roster_limit,
            levels: config.levels,
        }
    }
}
