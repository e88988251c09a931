//! The `.scrfilemap` collaborator.
//!
//! Each rank's filemap declares, per checkpoint id, how many files
//! that rank wrote. The scanner uses these declarations to know how
//! many observations to expect before a rank counts as complete.

use crate::error::StoreError;
use crate::model::{CheckpointId, RankId};
use crate::store;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Filename suffix that marks a filemap.
pub const FILEMAP_SUFFIX: &str = ".scrfilemap";

/// Expected file counts, keyed checkpoint id → rank id.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filemap {
    checkpoints: BTreeMap<CheckpointId, BTreeMap<RankId, u64>>,
}

impl Filemap {
    pub fn new() -> Self {
        Filemap::default()
    }

    /// Reads a filemap with the given read-buffer capacity.
    pub fn read(path: &Path, capacity: usize) -> Result<Self, StoreError> {
        store::read_with_capacity(path, capacity)
    }

    pub fn write(&self, path: &Path) -> Result<(), StoreError> {
        store::write(path, self)
    }

    /// Checkpoint ids this filemap declares, ascending.
    pub fn checkpoints(&self) -> impl Iterator<Item = CheckpointId> + '_ {
        self.checkpoints.keys().copied()
    }

    /// Rank ids declared for one checkpoint, ascending.
    pub fn ranks(&self, ckpt_id: CheckpointId) -> impl Iterator<Item = RankId> + '_ {
        self.checkpoints
            .get(&ckpt_id)
            .into_iter()
            .flat_map(|ranks| ranks.keys().copied())
    }

    /// The declared file count for one (checkpoint, rank) pair.
    pub fn expected_files(&self, ckpt_id: CheckpointId, rank_id: RankId) -> Option<u64> {
        self.checkpoints.get(&ckpt_id)?.get(&rank_id).copied()
    }

    pub fn set_expected_files(&mut self, ckpt_id: CheckpointId, rank_id: RankId, files: u64) {
        self.checkpoints
            .entry(ckpt_id)
            .or_default()
            .insert(rank_id, files);
    }
}
