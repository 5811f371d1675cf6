//! Credence issuance CLI

use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing::error;

mod issue;

/// Flag for verbose output
const VERBOSE_FLAG: &str = "verbose";

fn main() -> std::process::ExitCode {
    let matches = Command::new("credence-issue")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Issue a credential over the attributes in a YAML configuration file.")
        .arg(
            Arg::new(VERBOSE_FLAG)
                .short('v')
                .long(VERBOSE_FLAG)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .required(true)
                .help("Path to YAML config file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("keyset")
                .long("keyset")
                .help("Path to a cleartext keyset (generated and written if missing)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .get_matches();

    // Create logger
    let level = if matches.get_flag(VERBOSE_FLAG) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let Some(config_path) = matches.get_one::<PathBuf>("config") else {
        error!("missing config");
        return std::process::ExitCode::FAILURE;
    };
    let keyset_path = matches.get_one::<PathBuf>("keyset");
    match issue::run(config_path, keyset_path) {
        Ok(output) => {
            println!("{output}");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error=?e, "failed to issue credential");
            std::process::ExitCode::FAILURE
        }
    }
}
