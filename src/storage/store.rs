//! A filesystem backed curriculum store.
//!
//! The [`Store`] wraps a root directory holding a `config.toml` and a JSON
//! snapshot. It is a thin shell around the filesystem-agnostic
//! [`Topics`] index: open loads the whole snapshot, mutations happen in
//! memory, and [`Store::flush`] writes the snapshot back.

use std::{
    io,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    domain::{topics::Topics, Config},
    storage::snapshot,
};

/// A filesystem backed store for a curriculum index.
#[derive(Debug)]
pub struct Store {
    /// The root directory the curriculum is stored in.
    root: PathBuf,
    config: Config,
    topics: Topics,
}

/// Errors that can occur when opening a store.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// The snapshot file exists but could not be read.
    #[error("failed to read snapshot: {0}")]
    Io(#[from] io::Error),
    /// The snapshot file could not be parsed.
    #[error("failed to parse snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Errors that can occur when flushing a store.
#[derive(Debug, thiserror::Error)]
pub enum FlushError {
    /// The snapshot file could not be written.
    #[error("failed to write snapshot: {0}")]
    Io(#[from] io::Error),
    /// The index could not be serialized.
    #[error("failed to serialize snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl Store {
    /// Opens the store rooted at the given directory.
    ///
    /// A missing config falls back to defaults, and a missing snapshot file
    /// yields an empty index; both are normal for a fresh directory. The
    /// configured question cap is applied to the loaded index.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot file is present but unreadable or
    /// unparseable.
    pub fn open(root: PathBuf) -> Result<Self, OpenError> {
        let config = load_config(&root);
        let snapshot_path = root.join(config.snapshot_file());

        let mut topics = if snapshot_path.exists() {
            let document = std::fs::read_to_string(&snapshot_path)?;
            snapshot::from_json(&document)?
        } else {
            debug!(path = %snapshot_path.display(), "no snapshot file; starting empty");
            Topics::new()
        };
        topics.set_question_cap(config.max_questions_per_concept());

        Ok(Self {
            root,
            config,
            topics,
        })
    }

    /// The store's configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The store's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The path of the snapshot file.
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(self.config.snapshot_file())
    }

    /// The in-memory index.
    #[must_use]
    pub const fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Mutable access to the in-memory index.
    ///
    /// Changes are not persisted until [`Self::flush`] is called.
    pub const fn topics_mut(&mut self) -> &mut Topics {
        &mut self.topics
    }

    /// Write the snapshot back to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be serialized or the file cannot
    /// be written.
    pub fn flush(&self) -> Result<(), FlushError> {
        let document = snapshot::to_json(&self.topics)?;
        std::fs::write(self.snapshot_path(), document)?;
        Ok(())
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join("config.toml");
    Config::load(&path).unwrap_or_else(|e| {
        debug!("Failed to load config: {e}");
        Config::default()
    })
}
