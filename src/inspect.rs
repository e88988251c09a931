//! Model inspection: derive the diagnostics from scanned observations.
//!
//! Inspection never fails fatally. Every anomaly is recorded on the
//! checkpoint set itself, where the rebuild planner and the summary
//! builder pick it up: contradictory declarations mark the set
//! `invalid`, shortfalls land ranks in `missing_ranks`, and `complete`
//! is set iff neither happened.

use crate::model::{CheckpointId, CheckpointSet, RankId, ScanModel};
use log::error;
use std::collections::BTreeSet;

/// Aggregate verdict over every checkpoint in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectOutcome {
    /// Every checkpoint set is complete.
    Ok,
    /// At least one set is invalid or missing ranks.
    MissingOrInvalid,
}

/// Inspects every checkpoint set in ascending id order.
pub fn inspect_scan(model: &mut ScanModel) -> InspectOutcome {
    let mut all_complete = true;
    for (&ckpt_id, set) in &mut model.checkpoints {
        inspect_checkpoint(ckpt_id, set);
        if !set.complete {
            all_complete = false;
        }
    }
    if all_complete {
        InspectOutcome::Ok
    } else {
        InspectOutcome::MissingOrInvalid
    }
}

fn inspect_checkpoint(ckpt_id: CheckpointId, set: &mut CheckpointSet) {
    set.reset_diagnostics();

    // A set that cannot even agree on its rank count is beyond
    // reasoning about; leave it invalid with no further diagnosis.
    if set.ranks_declared.len() != 1 {
        error!(
            "checkpoint {ckpt_id} has {} values for its rank count",
            set.ranks_declared.len()
        );
        set.invalid = true;
        return;
    }
    let ranks = *set.ranks_declared.iter().next().expect("one declared value");

    let mut valid = true;
    let mut missing: BTreeSet<RankId> = BTreeSet::new();
    let mut expected_rank: RankId = 0;

    for (&rank_id, entry) in &set.ranks {
        if rank_id >= ranks {
            error!(
                "rank {rank_id} out of range, checkpoint {ckpt_id} declares {ranks} ranks"
            );
            valid = false;
        }

        // Every declared rank skipped over on the way here is missing.
        while expected_rank < rank_id.min(ranks) {
            missing.insert(expected_rank);
            expected_rank += 1;
        }
        expected_rank = rank_id.saturating_add(1);

        if entry.files_expected.len() != 1 {
            error!(
                "rank {rank_id} of checkpoint {ckpt_id} has {} values for its expected file count",
                entry.files_expected.len()
            );
            valid = false;
            continue;
        }
        let expected = *entry.files_expected.iter().next().expect("one declared value");

        let observed = entry.files.len() as u64;
        if entry
            .files
            .values()
            .any(|record| record.complete == Some(false))
        {
            missing.insert(rank_id);
        }
        if observed < expected {
            missing.insert(rank_id);
        }
        if observed > expected {
            error!(
                "rank {rank_id} of checkpoint {ckpt_id} has {observed} files, expected {expected}"
            );
            valid = false;
        }
    }

    // Declared ranks never observed at all.
    while expected_rank < ranks {
        missing.insert(expected_rank);
        expected_rank += 1;
    }

    set.invalid = !valid;
    set.missing_ranks = missing;
    set.complete = valid && set.missing_ranks.is_empty();
}
