use anyhow::{Context, Result};
use clap::error::ErrorKind;
use std::path::Path;

use scrindex::args;
use scrindex::config::Config;
use scrindex::index::add_dir;

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let matches = match args::command().try_get_matches() {
        Ok(matches) => matches,
        Err(err) => {
            // Usage errors exit with 1; help and version output are
            // not errors.
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            err.print().ok();
            std::process::exit(code);
        }
    };

    let prefix = matches
        .get_one::<String>("prefix")
        .expect("prefix is required by clap");
    let dir = matches
        .get_one::<String>("dir")
        .expect("dir is required by clap");

    let config = Config::from_env();
    add_dir(Path::new(prefix), dir, &config)
        .with_context(|| format!("Failed to index checkpoint directory {dir}"))?;
    Ok(())
}
