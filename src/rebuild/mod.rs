//! Rebuild orchestration over the scan model.
//!
//! For every checkpoint with missing ranks this plans the per-XOR-set
//! repair commands and, when every loss is recoverable, executes them
//! with bounded parallelism. Invalid checkpoints and checkpoints with
//! an unrecoverable XOR set fail without launching anything. The walk
//! always covers every checkpoint; the first failure is returned after
//! all of them have been processed.

mod exec;
mod plan;

pub use exec::run_rebuilds;
pub use plan::plan_rebuilds;

use crate::config::Config;
use crate::error::RebuildError;
use crate::model::ScanModel;
use log::error;
use std::path::Path;

/// Attempts to rebuild every checkpoint in `model` that is missing
/// ranks. Succeeds iff every such checkpoint was fully repaired (or
/// needed nothing).
pub fn rebuild_scan(dir: &Path, model: &mut ScanModel, config: &Config) -> Result<(), RebuildError> {
    let mut failures: Vec<RebuildError> = Vec::new();

    for (&ckpt_id, set) in &mut model.checkpoints {
        if set.invalid {
            failures.push(RebuildError::InvalidCheckpoint(ckpt_id));
            continue;
        }
        if set.missing_ranks.is_empty() {
            continue;
        }

        plan_rebuilds(ckpt_id, set, &config.rebuild_cmd);

        if !set.unrecoverable_xor.is_empty() {
            failures.push(RebuildError::Unrecoverable {
                ckpt: ckpt_id,
                sets: set.unrecoverable_xor.iter().copied().collect(),
            });
            continue;
        }

        let total = set.build_commands.len();
        let failed = run_rebuilds(dir, &set.build_commands, config.rebuild_jobs);
        if failed > 0 {
            failures.push(RebuildError::CommandsFailed {
                ckpt: ckpt_id,
                failed,
                total,
            });
        }
    }

    for failure in &failures {
        error!("{failure}");
    }
    match failures.into_iter().next() {
        None => Ok(()),
        Some(first) => Err(first),
    }
}
