//! The in-memory scan model.
//!
//! One `ScanModel` describes everything a scan observed inside a
//! checkpoint directory: per-rank file observations, per-XOR-set
//! membership, and the diagnostics the inspector derives from them.
//! The model is created empty, populated by the scanner, annotated by
//! the inspector, read by the rebuild planner, and finally trimmed
//! into a [`crate::summary::Summary`] for persistence. It never
//! leaves memory itself.

use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};

/// Positive integer identifying a checkpoint across the job.
pub type CheckpointId = u32;
/// Integer in `[0, ranks)` identifying one participant.
pub type RankId = u32;
/// Positive integer naming an XOR redundancy group.
pub type XorSetId = u32;
/// 1-based position within an XOR set, in `[1, members]`.
pub type MemberIndex = u32;

/// One observed data file, as recorded by its sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Size in bytes, as recorded and verified against disk.
    pub size: u64,
    /// CRC32 carried forward from the sidecar; never computed here.
    pub crc32: Option<u32>,
    /// Tri-state completion: `None` when the sidecar said nothing.
    pub complete: Option<bool>,
}

/// Everything observed for one rank.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RankEntry {
    /// Declared expected-file counts for this rank. Normally a single
    /// value; disagreeing filemaps leave more than one and invalidate
    /// the checkpoint.
    pub files_expected: BTreeSet<u64>,
    /// Observed files keyed by name.
    pub files: BTreeMap<String, FileRecord>,
}

/// One XOR parity member observed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorMember {
    /// Name of the parity file, relative to the checkpoint directory.
    pub xor_filename: String,
    /// Rank whose data this member protects.
    pub rank_id: RankId,
}

/// One XOR redundancy group.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct XorSetEntry {
    /// Declared member count, parsed from the parity file names.
    pub members_declared: u32,
    /// Observed members keyed by 1-based member index.
    pub members: BTreeMap<MemberIndex, XorMember>,
}

/// One rebuild invocation, argv in final order. The first element is
/// the repair binary itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildCommand {
    pub argv: SmallVec<[String; 8]>,
}

/// Observed state plus diagnostics for one checkpoint.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CheckpointSet {
    /// Declared rank counts. Exactly one value on a healthy set.
    pub ranks_declared: BTreeSet<u32>,
    /// Observed ranks in ascending order.
    pub ranks: BTreeMap<RankId, RankEntry>,
    /// Observed XOR groups in ascending id order.
    pub xor_sets: BTreeMap<XorSetId, XorSetEntry>,

    // Diagnostics, owned by the inspector and rebuild planner.
    /// Declarations contradict themselves; the set is beyond repair.
    pub invalid: bool,
    /// Ranks with fewer observations than declared.
    pub missing_ranks: BTreeSet<RankId>,
    /// XOR sets that lost two or more members.
    pub unrecoverable_xor: BTreeSet<XorSetId>,
    /// Planned repair invocations.
    pub build_commands: Vec<RebuildCommand>,
    /// Valid and nothing missing.
    pub complete: bool,
}

impl CheckpointSet {
    /// Observed-or-declared rank entry, created on first touch.
    pub fn rank_mut(&mut self, rank_id: RankId) -> &mut RankEntry {
        self.ranks.entry(rank_id).or_default()
    }

    /// XOR set entry, created on first touch.
    pub fn xor_set_mut(&mut self, set_id: XorSetId) -> &mut XorSetEntry {
        self.xor_sets.entry(set_id).or_default()
    }

    /// Drops everything the inspector or planner derived, leaving only
    /// scanner observations.
    pub fn reset_diagnostics(&mut self) {
        self.invalid = false;
        self.missing_ranks.clear();
        self.unrecoverable_xor.clear();
        self.build_commands.clear();
        self.complete = false;
    }
}

/// Root of the scan: every checkpoint id seen in one directory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanModel {
    pub checkpoints: BTreeMap<CheckpointId, CheckpointSet>,
}

impl ScanModel {
    pub fn new() -> Self {
        ScanModel::default()
    }

    /// Checkpoint set, created on first touch.
    pub fn checkpoint_mut(&mut self, ckpt_id: CheckpointId) -> &mut CheckpointSet {
        self.checkpoints.entry(ckpt_id).or_default()
    }

    /// Forgets everything, ahead of a rescan.
    pub fn clear(&mut self) {
        self.checkpoints.clear();
    }

    /// The sole checkpoint, if the scan settled on exactly one id.
    pub fn single_checkpoint(&self) -> Option<(CheckpointId, &CheckpointSet)> {
        if self.checkpoints.len() == 1 {
            self.checkpoints.iter().next().map(|(id, set)| (*id, set))
        } else {
            None
        }
    }
}
