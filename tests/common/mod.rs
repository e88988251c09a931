//! Shared helpers for building checkpoint directories on disk.

#![allow(dead_code)]

use scrindex::config::Config;
use scrindex::filemap::Filemap;
use scrindex::meta::{FileKind, FileMeta};
use std::fs;
use std::path::{Path, PathBuf};

/// Size of every data and parity file the helpers create.
pub const DATA_LEN: usize = 64;

pub fn test_config() -> Config {
    Config::default()
}

pub fn rank_file_name(rank: u32) -> String {
    format!("rank_{rank}.ckpt")
}

pub fn xor_file_name(member: u32, members: u32, set_id: u32) -> String {
    format!("{member}_of_{members}_in_{set_id}.xor")
}

/// Writes `name` with `DATA_LEN` bytes of payload.
pub fn write_payload(dir: &Path, name: &str) {
    fs::write(dir.join(name), vec![0xa5u8; DATA_LEN]).unwrap();
}

pub fn write_sidecar(dir: &Path, meta: &FileMeta) {
    let path = dir.join(format!("{}.scr", meta.filename));
    meta.write(&path).unwrap();
}

pub fn data_meta(name: &str, ckpt: u32, ranks: u32, rank: u32) -> FileMeta {
    FileMeta {
        filename: name.to_string(),
        filesize: DATA_LEN as u64,
        complete: true,
        filetype: FileKind::Data,
        checkpoint_id: ckpt,
        ranks,
        rank,
        crc32: Some(0x1234_5678 ^ rank),
    }
}

pub fn xor_meta(name: &str, ckpt: u32, ranks: u32, rank: u32) -> FileMeta {
    FileMeta {
        filetype: FileKind::Xor,
        crc32: None,
        ..data_meta(name, ckpt, ranks, rank)
    }
}

/// Writes one rank's data file and sidecar.
pub fn write_rank(dir: &Path, ckpt: u32, ranks: u32, rank: u32) -> String {
    let name = rank_file_name(rank);
    write_payload(dir, &name);
    write_sidecar(dir, &data_meta(&name, ckpt, ranks, rank));
    name
}

/// Writes one XOR parity file and sidecar, owned by `rank`.
pub fn write_xor(
    dir: &Path,
    ckpt: u32,
    ranks: u32,
    rank: u32,
    member: u32,
    members: u32,
    set_id: u32,
) -> String {
    let name = xor_file_name(member, members, set_id);
    write_payload(dir, &name);
    write_sidecar(dir, &xor_meta(&name, ckpt, ranks, rank));
    name
}

/// Writes a single filemap declaring `count` expected files for each
/// listed rank of `ckpt`.
pub fn write_filemap(dir: &Path, ckpt: u32, counts: &[(u32, u64)]) {
    let mut map = Filemap::new();
    for &(rank, count) in counts {
        map.set_expected_files(ckpt, rank, count);
    }
    map.write(&dir.join(format!("ckpt_{ckpt}.scrfilemap"))).unwrap();
}

/// A complete 4-rank checkpoint without parity: data files, sidecars,
/// and a filemap declaring one file per rank.
pub fn write_complete_set(dir: &Path, ckpt: u32) {
    let ranks = 4;
    for rank in 0..ranks {
        write_rank(dir, ckpt, ranks, rank);
    }
    write_filemap(dir, ckpt, &[(0, 1), (1, 1), (2, 1), (3, 1)]);
}

/// A complete 4-rank checkpoint where every rank also owns one XOR
/// parity file of set `set_id` (member `rank + 1`), so each rank
/// expects two files.
pub fn write_set_with_xor(dir: &Path, ckpt: u32, set_id: u32) {
    let ranks = 4;
    for rank in 0..ranks {
        write_rank(dir, ckpt, ranks, rank);
        write_xor(dir, ckpt, ranks, rank, rank + 1, ranks, set_id);
    }
    write_filemap(dir, ckpt, &[(0, 2), (1, 2), (2, 2), (3, 2)]);
}

/// Drops a previously written payload file, leaving its sidecar in
/// place.
pub fn remove_payload(dir: &Path, name: &str) {
    fs::remove_file(dir.join(name)).unwrap();
}

/// Writes an executable shell script to `path` and returns the path.
#[cfg(unix)]
pub fn write_stub(path: &Path, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    fs::write(path, script).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
    path.to_path_buf()
}

/// A repair stub that appends its arguments to `argv_log.txt` in the
/// working directory and recreates the named files with `DATA_LEN`
/// bytes each.
#[cfg(unix)]
pub fn write_rebuild_stub(path: &Path, recreate: &[&str]) -> PathBuf {
    let mut script = String::from("#!/bin/sh\necho \"$@\" >> argv_log.txt\n");
    for name in recreate {
        script.push_str(&format!("head -c {DATA_LEN} /dev/zero > \"{name}\"\n"));
    }
    script.push_str("exit 0\n");
    write_stub(path, &script)
}
