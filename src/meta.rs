//! The `.scr` metadata-sidecar collaborator.
//!
//! Every data file a rank writes is paired with a sidecar recording
//! what the producer knew about it: owning checkpoint, rank, size,
//! completion, and optionally a CRC of the payload. The scanner
//! cross-checks sidecars against the filesystem but never computes
//! checksums itself; a recorded CRC is carried forward opaquely.

use crate::error::StoreError;
use crate::model::{CheckpointId, RankId};
use crate::store;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Filename suffix that marks a sidecar.
pub const META_SUFFIX: &str = ".scr";

/// The producer's classification of a data file.
///
/// Serialized as the producer's uppercase tag; tags this version does
/// not understand read back as [`FileKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileKind {
    /// A rank's checkpoint payload.
    Data,
    /// An XOR parity file encoding redundancy across a set of ranks.
    Xor,
    /// A kind this version does not understand; treated as a regular
    /// observation.
    Other,
}

impl From<String> for FileKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "DATA" => FileKind::Data,
            "XOR" => FileKind::Xor,
            _ => FileKind::Other,
        }
    }
}

impl From<FileKind> for String {
    fn from(kind: FileKind) -> Self {
        match kind {
            FileKind::Data => "DATA",
            FileKind::Xor => "XOR",
            FileKind::Other => "OTHER",
        }
        .to_string()
    }
}

/// One sidecar record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Data file name, relative to the checkpoint directory.
    pub filename: String,
    /// Recorded size of the data file in bytes.
    pub filesize: u64,
    /// Whether the producer finished writing the file.
    pub complete: bool,
    pub filetype: FileKind,
    pub checkpoint_id: CheckpointId,
    /// Number of ranks in the job that produced the checkpoint.
    pub ranks: u32,
    /// Rank that wrote the data file.
    pub rank: RankId,
    /// CRC32 of the payload, present iff the producer computed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crc32: Option<u32>,
}

impl FileMeta {
    /// Reads a sidecar with the given read-buffer capacity.
    pub fn read(path: &Path, capacity: usize) -> Result<Self, StoreError> {
        store::read_with_capacity(path, capacity)
    }

    pub fn write(&self, path: &Path) -> Result<(), StoreError> {
        store::write(path, self)
    }
}
