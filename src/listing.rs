//! Directory enumeration into a categorized listing.

use crate::error::ScanError;
use std::fs;
use std::path::Path;

/// The names in one directory, split into subdirectories and files.
///
/// Both buckets are sorted by name so every downstream pass is
/// deterministic. When an entry's type cannot be determined it is
/// reported as a file; consumers filter by extension and tolerate the
/// ambiguity.
#[derive(Debug, Default, Clone)]
pub struct Listing {
    pub dirs: Vec<String>,
    pub files: Vec<String>,
}

/// Reads the file and directory names from `dir`.
///
/// Fails if the directory cannot be opened or an entry iteration
/// error occurs after at least one entry was read.
pub fn read_dir_listing(dir: &Path) -> Result<Listing, ScanError> {
    let entries = fs::read_dir(dir).map_err(|source| ScanError::DirRead {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut listing = Listing::default();
    for entry in entries {
        let entry = entry.map_err(|source| ScanError::DirRead {
            dir: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => listing.dirs.push(name),
            _ => listing.files.push(name),
        }
    }

    listing.dirs.sort();
    listing.files.sort();
    Ok(listing)
}
