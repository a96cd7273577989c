//! Shell completion scripts.

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::args::Cli;
use crate::APP_NAME;

/// Write the completion script for `shell` to stdout.
pub fn print(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
}
