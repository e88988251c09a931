//! Runtime configuration, read from the process environment.
//!
//! Following the checkpoint system's parameter conventions, every knob
//! is an `SCR_`-prefixed environment variable. Malformed values log a
//! warning and fall back to the default; configuration never aborts
//! the run.

use crate::util::parse_byte_count;
use log::warn;
use std::env;
use std::path::PathBuf;

/// Default repair binary, resolved via `PATH` unless overridden.
pub const DEFAULT_REBUILD_CMD: &str = "scr_rebuild_xor";

/// Default cap on simultaneously running repair children.
pub const DEFAULT_REBUILD_JOBS: usize = 4;

/// Default read-buffer capacity for filemap and sidecar loads.
pub const DEFAULT_SCAN_BUFFER: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the XOR repair binary (`SCR_REBUILD_CMD`).
    pub rebuild_cmd: PathBuf,
    /// Maximum simultaneously running repair children, at least 1
    /// (`SCR_REBUILD_JOBS`).
    pub rebuild_jobs: usize,
    /// Read-buffer capacity for metadata loads, accepted as a byte
    /// string such as `"64kb"` or `"1mb"` (`SCR_SCAN_BUFFER`).
    pub scan_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rebuild_cmd: PathBuf::from(DEFAULT_REBUILD_CMD),
            rebuild_jobs: DEFAULT_REBUILD_JOBS,
            scan_buffer: DEFAULT_SCAN_BUFFER,
        }
    }
}

impl Config {
    /// Builds a configuration from the process environment.
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(cmd) = env::var("SCR_REBUILD_CMD") {
            if cmd.is_empty() {
                warn!("SCR_REBUILD_CMD is empty, using {DEFAULT_REBUILD_CMD}");
            } else {
                config.rebuild_cmd = PathBuf::from(cmd);
            }
        }

        if let Ok(jobs) = env::var("SCR_REBUILD_JOBS") {
            match jobs.parse::<usize>() {
                Ok(n) if n >= 1 => config.rebuild_jobs = n,
                _ => warn!(
                    "SCR_REBUILD_JOBS value {jobs:?} is not a positive integer, \
                     using {DEFAULT_REBUILD_JOBS}"
                ),
            }
        }

        if let Ok(buf) = env::var("SCR_SCAN_BUFFER") {
            match parse_byte_count(&buf) {
                Some(n) if n >= 1 => config.scan_buffer = n as usize,
                _ => warn!(
                    "SCR_SCAN_BUFFER value {buf:?} is not a byte count, \
                     using {DEFAULT_SCAN_BUFFER}"
                ),
            }
        }

        config
    }
}
