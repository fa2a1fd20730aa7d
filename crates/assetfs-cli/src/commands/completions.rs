//! Shell completion generation command.
//!
//! Generates shell completion scripts for bash, zsh, fish, elvish and
//! `PowerShell`.

use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io::Write;
use tracing::info;

/// Writes the completion script for `shell` to `out`.
///
/// # Errors
///
/// This command cannot fail; the `Result` keeps the signature in line with
/// the other commands.
pub fn run(shell: Shell, cmd: &mut Command, out: &mut impl Write) -> Result<()> {
    info!("Generating {shell} completions");
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, out);
    Ok(())
}
