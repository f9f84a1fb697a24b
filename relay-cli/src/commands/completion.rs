//! Shell completion scripts for the CLI.

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, shells::Shell};

/// Writes the completion script for `shell` to stdout.
///
/// # Examples
/// ```text
/// relay completion --shell zsh > ~/.zfunc/_relay
/// ```
pub fn generate_completion(shell: Shell) {
    let mut app = crate::Cli::command();
    generate(shell, &mut app, "relay", &mut io::stdout());
}
