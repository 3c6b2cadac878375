use std::{num::NonZeroUsize, path::Path};

use serde::{Deserialize, Serialize};

/// Configuration for a curriculum store.
///
/// This struct holds settings that control how the snapshot is stored and
/// how the index behaves on insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The name of the JSON snapshot file inside the store root.
    snapshot_file: String,

    /// An optional limit on the number of questions per concept.
    ///
    /// When set, inserting into a full concept is declined with a warning.
    max_questions_per_concept: Option<NonZeroUsize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_file: default_snapshot_file(),
            max_questions_per_concept: None,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or
    /// if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The name of the snapshot file inside the store root.
    #[must_use]
    pub fn snapshot_file(&self) -> &str {
        &self.snapshot_file
    }

    /// The per-concept question cap, if configured.
    #[must_use]
    pub const fn max_questions_per_concept(&self) -> Option<NonZeroUsize> {
        self.max_questions_per_concept
    }

    /// Sets the per-concept question cap. `None` removes it.
    pub const fn set_max_questions_per_concept(&mut self, cap: Option<NonZeroUsize>) {
        self.max_questions_per_concept = cap;
    }
}

fn default_snapshot_file() -> String {
    "topics.json".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the
/// domain type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_snapshot_file")]
        snapshot_file: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_questions_per_concept: Option<NonZeroUsize>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                snapshot_file,
                max_questions_per_concept,
            } => Self {
                snapshot_file,
                max_questions_per_concept,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            snapshot_file: config.snapshot_file,
            max_questions_per_concept: config.max_questions_per_concept,
        }
    }
}
