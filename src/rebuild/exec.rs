//! Rebuild execution: spawn repair children and aggregate outcomes.
//!
//! Children run with the checkpoint directory as working directory and
//! inherit the parent's environment and standard streams. At most
//! `max_jobs` run simultaneously; when the window is full the oldest
//! outstanding child is awaited before the next is launched. A failure
//! never cancels outstanding work: every child is always awaited, and
//! the aggregate result only reports how many went wrong.

use crate::model::RebuildCommand;
use log::{error, info};
use std::collections::VecDeque;
use std::path::Path;
use std::process::{Child, Command};

/// Runs every command, returning how many failed to launch or exited
/// non-zero. Zero means every child exited with status 0.
pub fn run_rebuilds(dir: &Path, commands: &[RebuildCommand], max_jobs: usize) -> usize {
    let max_jobs = max_jobs.max(1);
    let mut running: VecDeque<Child> = VecDeque::new();
    let mut failed = 0;

    for command in commands {
        if running.len() >= max_jobs {
            let oldest = running.pop_front().expect("window is non-empty");
            failed += usize::from(!await_child(oldest));
        }

        info!("rebuild command: {}", command.argv.join(" "));
        let (program, args) = command
            .argv
            .split_first()
            .expect("planned commands always carry the binary");
        match Command::new(program).args(args).current_dir(dir).spawn() {
            Ok(child) => running.push_back(child),
            Err(err) => {
                error!("failed to launch {program}: {err}");
                failed += 1;
            }
        }
    }

    while let Some(child) = running.pop_front() {
        failed += usize::from(!await_child(child));
    }

    failed
}

fn await_child(mut child: Child) -> bool {
    match child.wait() {
        Ok(status) if status.success() => true,
        Ok(status) => {
            error!("rebuild child exited with {status}");
            false
        }
        Err(err) => {
            error!("failed to wait for rebuild child: {err}");
            false
        }
    }
}
