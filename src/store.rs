//! Read/write primitives for the on-disk tree files.
//!
//! Filemaps, sidecars, the summary, and the prefix index are all
//! hierarchical trees persisted as pretty-printed JSON. Every model
//! keyed by `BTreeMap`/`BTreeSet` serializes deterministically, so an
//! unchanged tree always produces a byte-identical file.

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;

/// Reads a tree from `path`.
pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    read_with_capacity(path, 64 * 1024)
}

/// Reads a tree from `path` with an explicit read-buffer capacity.
pub fn read_with_capacity<T: DeserializeOwned>(
    path: &Path,
    capacity: usize,
) -> Result<T, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::with_capacity(capacity, file);
    serde_json::from_reader(reader).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a tree to `path`.
///
/// The tree is first written to a `.tmp` sibling and then renamed into
/// place, so a concurrent reader never observes a torn file.
pub fn write<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let temp_path = Path::new(&tmp);

    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    let io_err = |source| StoreError::Io {
        path: temp_path.to_path_buf(),
        source,
    };
    let mut file = File::create(temp_path).map_err(io_err)?;
    file.write_all(&bytes).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    drop(file);

    fs::rename(temp_path, path).map_err(|source| StoreError::Rename {
        temp_path: temp_path.to_path_buf(),
        final_path: path.to_path_buf(),
        source,
    })
}
