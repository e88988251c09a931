use clap::{Arg, Command};

pub fn command() -> Command {
    Command::new("scr_index")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Index a checkpoint set directory, rebuilding missing files where possible")
        .arg(
            Arg::new("prefix")
                .help("Prefix directory holding the index")
                .required(true)
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("dir")
                .help("Checkpoint set directory name, relative to the prefix")
                .required(true)
                .value_parser(clap::value_parser!(String)),
        )
}
