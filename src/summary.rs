//! Summary building: attest a checkpoint directory's scanned state.
//!
//! The summary file is the trimmed, persisted form of one inspected
//! checkpoint set. Diagnostics and XOR bookkeeping are dropped; what
//! remains is the checkpoint id, the declared rank count, the
//! `complete` verdict, and every verified file observation. A summary
//! on disk means only that the directory was scanned to a conclusion;
//! `complete` carries whether the checkpoint is actually usable.

use crate::config::Config;
use crate::error::{StoreError, SummaryError};
use crate::inspect::{inspect_scan, InspectOutcome};
use crate::model::{CheckpointId, CheckpointSet, RankId, ScanModel};
use crate::rebuild::rebuild_scan;
use crate::scan::scan_files;
use crate::store;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the summary file inside a checkpoint directory.
pub const SUMMARY_FILENAME: &str = "summary.scr";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crc32: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankSummary {
    pub files_expected: u64,
    pub files: BTreeMap<String, FileSummary>,
}

/// The attested view of one checkpoint set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub ckpt_id: CheckpointId,
    /// Declared rank count of the producing job.
    pub ranks: u32,
    /// Whether the set was valid with nothing missing at scan time.
    pub complete: bool,
    pub ranks_observed: BTreeMap<RankId, RankSummary>,
}

impl Summary {
    /// Trims an inspected checkpoint set down to its persistent form.
    ///
    /// Returns `None` when the set's declarations are not
    /// singly-valued; such a set is invalid and must not be attested.
    pub fn from_set(ckpt_id: CheckpointId, set: &CheckpointSet) -> Option<Self> {
        if set.ranks_declared.len() != 1 {
            return None;
        }
        let ranks = *set.ranks_declared.iter().next().expect("one declared value");

        let mut ranks_observed = BTreeMap::new();
        for (&rank_id, entry) in &set.ranks {
            if entry.files_expected.len() != 1 {
                return None;
            }
            let files_expected = *entry.files_expected.iter().next().expect("one declared value");
            let files = entry
                .files
                .iter()
                .map(|(name, record)| {
                    (
                        name.clone(),
                        FileSummary {
                            size: record.size,
                            crc32: record.crc32,
                        },
                    )
                })
                .collect();
            ranks_observed.insert(
                rank_id,
                RankSummary {
                    files_expected,
                    files,
                },
            );
        }

        Some(Summary {
            ckpt_id,
            ranks,
            complete: set.complete,
            ranks_observed,
        })
    }
}

/// Reads the summary file from a checkpoint directory.
pub fn read(dir: &Path) -> Result<Summary, StoreError> {
    store::read(&dir.join(SUMMARY_FILENAME))
}

/// Writes the summary file into a checkpoint directory.
pub fn write(dir: &Path, summary: &Summary) -> Result<(), StoreError> {
    store::write(&dir.join(SUMMARY_FILENAME), summary)
}

/// Builds and writes the summary file for `dir` if one does not
/// already exist.
///
/// The directory is scanned and inspected; if ranks are missing, a
/// single rebuild pass is attempted, followed by one rescan and
/// reinspection. The summary is then written, provided the scan
/// settled on exactly one checkpoint id and the set is not invalid.
///
/// Success means only that a summary file exists on disk, not that
/// the checkpoint is complete.
pub fn build_summary(dir: &Path, config: &Config) -> Result<(), SummaryError> {
    if read(dir).is_ok() {
        return Ok(());
    }

    let mut model = ScanModel::new();
    scan_files(dir, config, &mut model)?;

    if inspect_scan(&mut model) == InspectOutcome::MissingOrInvalid {
        match rebuild_scan(dir, &mut model, config) {
            Ok(()) => {
                model.clear();
                scan_files(dir, config, &mut model)?;
                inspect_scan(&mut model);
            }
            // Failures were already logged; attest whatever state the
            // directory is in.
            Err(_) => debug!("rebuild incomplete for {}", dir.display()),
        }
    }

    let found = model.checkpoints.len();
    let Some((ckpt_id, set)) = model.single_checkpoint() else {
        return Err(SummaryError::NoUniqueCheckpoint(found));
    };
    if set.invalid {
        return Err(SummaryError::InvalidCheckpoint(ckpt_id));
    }
    let summary =
        Summary::from_set(ckpt_id, set).ok_or(SummaryError::InvalidCheckpoint(ckpt_id))?;
    write(dir, &summary)?;
    Ok(())
}
