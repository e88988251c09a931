//! Tests for the directory scanner.

mod common;

use common::*;
use scrindex::meta::{FileKind, FileMeta};
use scrindex::model::ScanModel;
use scrindex::scan::scan_files;
use scrindex::summary::{Summary, SUMMARY_FILENAME};
use std::collections::BTreeMap;
use std::fs;

fn scan_into_model(dir: &std::path::Path) -> ScanModel {
    let mut model = ScanModel::new();
    scan_files(dir, &test_config(), &mut model).unwrap();
    model
}

#[test]
fn complete_directory_scans_fully() {
    let dir = tempfile::tempdir().unwrap();
    write_complete_set(dir.path(), 6);

    let model = scan_into_model(dir.path());
    assert_eq!(model.checkpoints.len(), 1);
    let set = &model.checkpoints[&6];

    assert_eq!(set.ranks_declared.iter().copied().collect::<Vec<_>>(), [4]);
    assert_eq!(set.ranks.len(), 4);
    for rank in 0..4u32 {
        let entry = &set.ranks[&rank];
        assert_eq!(entry.files_expected.iter().copied().collect::<Vec<_>>(), [1]);
        let record = &entry.files[&rank_file_name(rank)];
        assert_eq!(record.size, DATA_LEN as u64);
        assert_eq!(record.crc32, Some(0x1234_5678 ^ rank));
        assert_eq!(record.complete, None);
    }
    assert!(set.xor_sets.is_empty());
}

#[test]
fn xor_members_are_attributed_from_file_names() {
    let dir = tempfile::tempdir().unwrap();
    write_set_with_xor(dir.path(), 6, 7);

    let model = scan_into_model(dir.path());
    let set = &model.checkpoints[&6];

    assert_eq!(set.xor_sets.len(), 1);
    let xor = &set.xor_sets[&7];
    assert_eq!(xor.members_declared, 4);
    assert_eq!(xor.members.len(), 4);
    for member in 1..=4u32 {
        let observed = &xor.members[&member];
        assert_eq!(observed.xor_filename, xor_file_name(member, 4, 7));
        assert_eq!(observed.rank_id, member - 1);
    }
    // Parity files also count as regular observations for their rank.
    assert!(set.ranks[&0].files.contains_key(&xor_file_name(1, 4, 7)));
}

#[test]
fn malformed_xor_name_keeps_the_regular_observation() {
    let dir = tempfile::tempdir().unwrap();
    write_payload(dir.path(), "oddly_named.xor");
    write_sidecar(
        dir.path(),
        &xor_meta("oddly_named.xor", 6, 1, 0),
    );
    write_filemap(dir.path(), 6, &[(0, 1)]);

    let model = scan_into_model(dir.path());
    let set = &model.checkpoints[&6];
    assert!(set.xor_sets.is_empty());
    assert!(set.ranks[&0].files.contains_key("oddly_named.xor"));
}

#[test]
fn summary_file_is_not_treated_as_a_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    write_complete_set(dir.path(), 6);
    let summary = Summary {
        ckpt_id: 6,
        ranks: 4,
        complete: true,
        ranks_observed: BTreeMap::new(),
    };
    scrindex::summary::write(dir.path(), &summary).unwrap();
    assert!(dir.path().join(SUMMARY_FILENAME).exists());

    let model = scan_into_model(dir.path());
    assert_eq!(model.checkpoints.len(), 1);
    assert_eq!(model.checkpoints[&6].ranks.len(), 4);
}

#[test]
fn sidecar_without_data_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_complete_set(dir.path(), 6);
    remove_payload(dir.path(), &rank_file_name(2));

    let model = scan_into_model(dir.path());
    let set = &model.checkpoints[&6];
    assert!(set.ranks[&2].files.is_empty());
    // The filemap declaration for the rank survives.
    assert_eq!(set.ranks[&2].files_expected.iter().copied().collect::<Vec<_>>(), [1]);
}

#[test]
fn size_mismatch_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_complete_set(dir.path(), 6);
    fs::write(dir.path().join(rank_file_name(1)), b"short").unwrap();

    let model = scan_into_model(dir.path());
    assert!(model.checkpoints[&6].ranks[&1].files.is_empty());
}

#[test]
fn incomplete_sidecar_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_complete_set(dir.path(), 6);
    let mut meta = data_meta(&rank_file_name(3), 6, 4, 3);
    meta.complete = false;
    write_sidecar(dir.path(), &meta);

    let model = scan_into_model(dir.path());
    assert!(model.checkpoints[&6].ranks[&3].files.is_empty());
}

#[test]
fn sidecar_naming_a_different_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_complete_set(dir.path(), 6);
    // rank_0's sidecar claims to describe some other file.
    let mut meta = data_meta(&rank_file_name(0), 6, 4, 0);
    meta.filename = "somewhere_else.ckpt".to_string();
    meta.write(&dir.path().join("rank_0.ckpt.scr")).unwrap();

    let model = scan_into_model(dir.path());
    assert!(model.checkpoints[&6].ranks[&0].files.is_empty());
}

#[test]
fn disagreeing_rank_count_is_skipped_without_invalidating() {
    let dir = tempfile::tempdir().unwrap();
    write_complete_set(dir.path(), 6);
    let mut meta = data_meta(&rank_file_name(3), 6, 4, 3);
    meta.ranks = 8;
    write_sidecar(dir.path(), &meta);

    let model = scan_into_model(dir.path());
    let set = &model.checkpoints[&6];
    assert_eq!(set.ranks_declared.iter().copied().collect::<Vec<_>>(), [4]);
    assert!(set.ranks[&3].files.is_empty());
}

#[test]
fn disagreeing_checkpoint_id_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_complete_set(dir.path(), 6);
    // An interloper from another checkpoint, no filemap of its own.
    write_payload(dir.path(), "stray.ckpt");
    write_sidecar(dir.path(), &data_meta("stray.ckpt", 9, 4, 0));

    let model = scan_into_model(dir.path());
    assert_eq!(model.checkpoints.len(), 1);
    assert!(model.checkpoints.contains_key(&6));
}

#[test]
fn unreadable_filemap_does_not_abort_the_scan() {
    let dir = tempfile::tempdir().unwrap();
    write_complete_set(dir.path(), 6);
    fs::write(dir.path().join("broken.scrfilemap"), b"not json").unwrap();

    let model = scan_into_model(dir.path());
    assert_eq!(model.checkpoints[&6].ranks.len(), 4);
}

#[test]
fn unreadable_sidecar_does_not_abort_the_scan() {
    let dir = tempfile::tempdir().unwrap();
    write_complete_set(dir.path(), 6);
    fs::write(dir.path().join("broken.ckpt.scr"), b"not json").unwrap();

    let model = scan_into_model(dir.path());
    assert_eq!(model.checkpoints[&6].ranks.len(), 4);
}

#[test]
fn scanning_a_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let absent = dir.path().join("absent");
    let mut model = ScanModel::new();
    assert!(scan_files(&absent, &test_config(), &mut model).is_err());
}

#[test]
fn rescan_into_cleared_model_matches_fresh_scan() {
    let dir = tempfile::tempdir().unwrap();
    write_set_with_xor(dir.path(), 6, 7);

    let fresh = scan_into_model(dir.path());
    let mut reused = scan_into_model(dir.path());
    reused.clear();
    scan_files(dir.path(), &test_config(), &mut reused).unwrap();
    assert_eq!(reused, fresh);
}

#[test]
fn unknown_filetype_is_recorded_as_regular_file() {
    let dir = tempfile::tempdir().unwrap();
    let meta = FileMeta {
        filename: "aux.dat".to_string(),
        filesize: DATA_LEN as u64,
        complete: true,
        filetype: FileKind::Other,
        checkpoint_id: 6,
        ranks: 1,
        rank: 0,
        crc32: None,
    };
    write_payload(dir.path(), "aux.dat");
    write_sidecar(dir.path(), &meta);
    write_filemap(dir.path(), 6, &[(0, 1)]);

    let model = scan_into_model(dir.path());
    let set = &model.checkpoints[&6];
    assert!(set.ranks[&0].files.contains_key("aux.dat"));
    assert!(set.xor_sets.is_empty());
}
