//! Integration tests for the `scr_index` command-line interface.

mod common;

use common::*;
use scrindex::index::{Index, INDEX_FILENAME};
use std::fs;
use std::process::Command;

fn scr_index() -> Command {
    Command::new(env!("CARGO_BIN_EXE_scr_index"))
}

#[test]
fn usage_error_exits_with_one() {
    let output = scr_index().output().expect("failed to execute scr_index");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn surplus_arguments_exit_with_one() {
    let output = scr_index()
        .args(["prefix", "dir", "extra"])
        .output()
        .expect("failed to execute scr_index");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn help_is_not_an_error() {
    let output = scr_index()
        .arg("--help")
        .output()
        .expect("failed to execute scr_index");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("prefix"));
    assert!(stdout.contains("dir"));
}

#[test]
fn indexing_a_complete_set_exits_with_zero() {
    let prefix = tempfile::tempdir().unwrap();
    let set_dir = prefix.path().join("ckpt.6");
    fs::create_dir(&set_dir).unwrap();
    write_complete_set(&set_dir, 6);

    let output = scr_index()
        .args([prefix.path().to_str().unwrap(), "ckpt.6"])
        .output()
        .expect("failed to execute scr_index");

    assert!(output.status.success());
    let index = Index::read(prefix.path());
    assert!(index.get("ckpt.6").unwrap().complete);
}

#[test]
fn unindexable_directory_exits_with_one() {
    let prefix = tempfile::tempdir().unwrap();
    fs::create_dir(prefix.path().join("empty")).unwrap();

    let output = scr_index()
        .args([prefix.path().to_str().unwrap(), "empty"])
        .output()
        .expect("failed to execute scr_index");

    assert_eq!(output.status.code(), Some(1));
    assert!(!prefix.path().join(INDEX_FILENAME).exists());
}
