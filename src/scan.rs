//! Directory scanning: populate a [`ScanModel`] from what is on disk.
//!
//! Scanning makes two passes over the directory listing. Pass A reads
//! every filemap to learn how many files each rank is expected to
//! have. Pass B reads every metadata sidecar, cross-checks it against
//! the data file actually on disk, and records the surviving
//! observations, including XOR parity membership parsed from the
//! parity file names.
//!
//! Sidecar and filemap loads hit the filesystem in parallel; all model
//! mutation happens sequentially in sorted filename order, so a given
//! directory always produces the same model. The scanner never
//! mutates the filesystem.

use crate::config::Config;
use crate::error::ScanError;
use crate::filemap::{Filemap, FILEMAP_SUFFIX};
use crate::listing::read_dir_listing;
use crate::meta::{FileKind, FileMeta, META_SUFFIX};
use crate::model::{CheckpointId, CheckpointSet, FileRecord, ScanModel, XorMember};
use crate::summary::SUMMARY_FILENAME;
use log::{debug, warn};
use rayon::prelude::*;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// XOR parity files are named `<member>_of_<members>_in_<setid>.xor`.
fn xor_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([0-9]+)_of_([0-9]+)_in_([0-9]+)\.xor").expect("XOR name pattern is valid")
    })
}

/// Scans `dir` and merges everything observed into `model`.
///
/// Per-file problems (unreadable filemap or sidecar, metadata that
/// contradicts the file on disk) are logged and skipped; only a
/// failure to enumerate the directory itself aborts the scan.
pub fn scan_files(dir: &Path, config: &Config, model: &mut ScanModel) -> Result<(), ScanError> {
    let listing = read_dir_listing(dir)?;
    scan_filemaps(dir, config, &listing.files, model);
    scan_sidecars(dir, config, &listing.files, model);
    Ok(())
}

/// Pass A: record the expected file count for every (checkpoint,
/// rank) pair any filemap declares.
fn scan_filemaps(dir: &Path, config: &Config, files: &[String], model: &mut ScanModel) {
    let names: Vec<&String> = files
        .iter()
        .filter(|name| name.ends_with(FILEMAP_SUFFIX))
        .collect();

    let maps: Vec<Option<Filemap>> = names
        .par_iter()
        .map(|name| {
            let path = dir.join(name.as_str());
            match Filemap::read(&path, config.scan_buffer) {
                Ok(map) => Some(map),
                Err(err) => {
                    warn!("skipping filemap {}: {err}", path.display());
                    None
                }
            }
        })
        .collect();

    for map in maps.into_iter().flatten() {
        for ckpt_id in map.checkpoints() {
            for rank_id in map.ranks(ckpt_id) {
                if let Some(expected) = map.expected_files(ckpt_id, rank_id) {
                    model
                        .checkpoint_mut(ckpt_id)
                        .rank_mut(rank_id)
                        .files_expected
                        .insert(expected);
                }
            }
        }
    }
}

/// One sidecar that survived every on-disk check.
struct Observation {
    /// Sidecar path minus the `.scr` suffix, i.e. the data file name.
    stem: String,
    meta: FileMeta,
}

/// Pass B: verify each sidecar against the filesystem, pin the
/// checkpoint id and rank count to the first survivor, and record the
/// agreeing observations.
fn scan_sidecars(dir: &Path, config: &Config, files: &[String], model: &mut ScanModel) {
    let names: Vec<&String> = files
        .iter()
        .filter(|name| name.ends_with(META_SUFFIX) && name.as_str() != SUMMARY_FILENAME)
        .collect();

    let observations: Vec<Option<Observation>> = names
        .par_iter()
        .map(|name| verify_sidecar(dir, config, name.as_str()))
        .collect();

    let mut pinned: Option<(CheckpointId, u32)> = None;
    for obs in observations.into_iter().flatten() {
        let (ckpt_id, ranks) = *pinned.get_or_insert((obs.meta.checkpoint_id, obs.meta.ranks));

        if obs.meta.checkpoint_id != ckpt_id {
            warn!(
                "{}: part of checkpoint {}, but this directory holds checkpoint {}",
                obs.stem, obs.meta.checkpoint_id, ckpt_id
            );
            continue;
        }
        if obs.meta.ranks != ranks {
            warn!(
                "{}: written by a {}-rank job, but this checkpoint declares {} ranks",
                obs.stem, obs.meta.ranks, ranks
            );
            continue;
        }

        let set = model.checkpoint_mut(ckpt_id);
        set.ranks_declared.insert(obs.meta.ranks);
        set.rank_mut(obs.meta.rank).files.insert(
            obs.meta.filename.clone(),
            FileRecord {
                size: obs.meta.filesize,
                crc32: obs.meta.crc32,
                complete: None,
            },
        );

        if obs.meta.filetype == FileKind::Xor {
            record_xor_member(set, &obs.stem, &obs.meta);
        }
    }
}

/// Reads one sidecar and checks it against the data file on disk.
/// Any failure logs and drops the observation.
fn verify_sidecar(dir: &Path, config: &Config, name: &str) -> Option<Observation> {
    let sidecar_path = dir.join(name);
    let stem = name[..name.len() - META_SUFFIX.len()].to_string();

    let meta = match FileMeta::read(&sidecar_path, config.scan_buffer) {
        Ok(meta) => meta,
        Err(err) => {
            warn!("skipping sidecar {}: {err}", sidecar_path.display());
            return None;
        }
    };

    if meta.filename != stem {
        warn!(
            "sidecar {} records data file {:?}, expected {:?}",
            sidecar_path.display(),
            meta.filename,
            stem
        );
        return None;
    }

    if !meta.complete {
        warn!("data file {} is marked incomplete", stem);
        return None;
    }

    let data_path = dir.join(&meta.filename);
    let disk_size = match fs::metadata(&data_path) {
        Ok(md) => md.len(),
        Err(_) => {
            warn!("data file {} does not exist", data_path.display());
            return None;
        }
    };
    if disk_size != meta.filesize {
        warn!(
            "data file {} is {disk_size} bytes, expected {}",
            data_path.display(),
            meta.filesize
        );
        return None;
    }

    debug!("observed {}", stem);
    Some(Observation { stem, meta })
}

/// Attributes an XOR parity file to its redundancy group by parsing
/// the file name. A name that does not parse loses only the XOR
/// attribution; the file stays recorded as a regular observation.
fn record_xor_member(set: &mut CheckpointSet, stem: &str, meta: &FileMeta) {
    let Some(caps) = xor_name_pattern().captures(stem) else {
        warn!("XOR file {stem} does not match the expected name pattern");
        return;
    };
    let parsed = (
        caps[1].parse::<u32>(),
        caps[2].parse::<u32>(),
        caps[3].parse::<u32>(),
    );
    let (Ok(member), Ok(declared), Ok(set_id)) = parsed else {
        warn!("XOR file {stem} carries out-of-range set parameters");
        return;
    };

    let entry = set.xor_set_mut(set_id);
    entry.members_declared = declared;
    entry.members.insert(
        member,
        XorMember {
            xor_filename: meta.filename.clone(),
            rank_id: meta.rank,
        },
    );
}
