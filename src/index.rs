//! The prefix-level index: which checkpoint directories exist and
//! whether each one is complete.

use crate::config::Config;
use crate::error::{IndexError, StoreError, SummaryError};
use crate::model::CheckpointId;
use crate::store;
use crate::summary;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the index file inside the prefix directory.
pub const INDEX_FILENAME: &str = "index.scr";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub ckpt_id: CheckpointId,
    pub complete: bool,
}

/// Registry of checkpoint directories, keyed by directory name
/// relative to the prefix.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    dirs: BTreeMap<String, IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Index::default()
    }

    /// Loads the index from the prefix directory. A missing index
    /// starts empty; an unreadable one is logged and also starts
    /// empty, to be rewritten on the next successful update.
    pub fn read(prefix: &Path) -> Self {
        let path = prefix.join(INDEX_FILENAME);
        if !path.exists() {
            return Index::new();
        }
        match store::read(&path) {
            Ok(index) => index,
            Err(err) => {
                warn!("unreadable index {}: {err}, starting empty", path.display());
                Index::new()
            }
        }
    }

    /// Persists the index into the prefix directory.
    pub fn write(&self, prefix: &Path) -> Result<(), StoreError> {
        store::write(&prefix.join(INDEX_FILENAME), self)
    }

    pub fn contains(&self, dir: &str) -> bool {
        self.dirs.contains_key(dir)
    }

    pub fn get(&self, dir: &str) -> Option<&IndexEntry> {
        self.dirs.get(dir)
    }

    pub fn add(&mut self, dir: &str, ckpt_id: CheckpointId, complete: bool) {
        self.dirs
            .insert(dir.to_string(), IndexEntry { ckpt_id, complete });
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

/// Adds the checkpoint directory `dir` (a name relative to `prefix`)
/// to the prefix-level index, building its summary first if needed.
///
/// Succeeds whether the checkpoint turns out complete or not; the
/// completeness lands in the index entry. An already-indexed
/// directory succeeds immediately without touching the set directory
/// or rewriting the index.
pub fn add_dir(prefix: &Path, dir: &str, config: &Config) -> Result<(), IndexError> {
    let mut index = Index::read(prefix);

    if index.contains(dir) {
        debug!("{dir} is already indexed");
        return Ok(());
    }

    let ckpt_dir = prefix.join(dir);
    let summary = match summary::read(&ckpt_dir) {
        Ok(summary) => summary,
        Err(_) => {
            summary::build_summary(&ckpt_dir, config).map_err(|source| {
                IndexError::SummaryUnavailable {
                    dir: dir.to_string(),
                    source,
                }
            })?;
            summary::read(&ckpt_dir)
                .map_err(|err| IndexError::SummaryUnavailable {
                    dir: dir.to_string(),
                    source: SummaryError::Store(err),
                })?
        }
    };

    index.add(dir, summary.ckpt_id, summary.complete);
    index.write(prefix)?;
    Ok(())
}
