//! Shell completion script generation for the recap binary.

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::args::Cli;

/// Write the completion script for `shell` to stdout, covering every recap
/// subcommand and flag.
pub fn print(shell: Shell) {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();
    generate(shell, &mut command, bin_name, &mut io::stdout());
}
