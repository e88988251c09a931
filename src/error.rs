//! Error types for the scan, rebuild, summary, and index layers.
//!
//! Per-file anomalies during scanning are not errors at all: they are
//! logged and skipped, and never surface here. These enums cover the
//! failures that abort an operation outright.

use crate::model::{CheckpointId, XorSetId};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the on-disk tree store (filemaps, sidecars, summary,
/// index).
#[derive(Debug, Error)]
pub enum StoreError {
    /// File could not be opened or read/written
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File contents did not parse as the expected tree
    #[error("malformed tree file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Atomic replace of the target file failed
    #[error("failed to rename {temp_path} to {final_path}: {source}")]
    Rename {
        temp_path: PathBuf,
        final_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a directory scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The checkpoint directory itself could not be enumerated
    #[error("failed to read directory {dir}: {source}")]
    DirRead {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the rebuild orchestration.
#[derive(Debug, Error)]
pub enum RebuildError {
    /// Checkpoint declarations contradict themselves; repair is not attempted
    #[error("checkpoint {0} is invalid, not attempting rebuild")]
    InvalidCheckpoint(CheckpointId),

    /// At least one XOR set lost two or more members
    #[error("checkpoint {ckpt} has unrecoverable XOR sets {sets:?}")]
    Unrecoverable {
        ckpt: CheckpointId,
        sets: Vec<XorSetId>,
    },

    /// One or more repair children failed or could not be launched
    #[error("{failed} of {total} rebuild commands failed for checkpoint {ckpt}")]
    CommandsFailed {
        ckpt: CheckpointId,
        failed: usize,
        total: usize,
    },
}

/// Errors from building or persisting the summary file.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The scan did not settle on exactly one checkpoint id
    #[error("expected exactly one checkpoint in scan, found {0}")]
    NoUniqueCheckpoint(usize),

    /// The sole checkpoint is invalid and cannot be attested
    #[error("checkpoint {0} is invalid, refusing to write summary")]
    InvalidCheckpoint(CheckpointId),
}

/// Errors from updating the prefix-level index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No summary could be read or built for the directory
    #[error("no summary available for {dir}: {source}")]
    SummaryUnavailable {
        dir: String,
        #[source]
        source: SummaryError,
    },
}
