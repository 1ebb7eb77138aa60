//! Shell completion generation
//!
//! Generates completion scripts for any utility, for bash, zsh, fish,
//! elvish and PowerShell.
//!
//! # Usage
//!
//! ```bash
//! # Bash - add to ~/.bashrc
//! source <(unixkit completions bash ls)
//!
//! # Fish
//! unixkit completions fish tar > ~/.config/fish/completions/tar.fish
//! ```

use clap_complete::{generate, Shell};
use std::io::Write;

use crate::cli::commands;
use crate::core::UtilError;

/// Write the completion script for `utility` to `out`.
pub fn run(shell: Shell, utility: &str, out: &mut dyn Write) -> Result<(), UtilError> {
    let applet = commands::find(utility)
        .ok_or_else(|| UtilError::failed(format!("unknown utility '{utility}'")))?;
    let mut cmd = (applet.command)();
    generate(shell, &mut cmd, applet.name, out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_script_names_utility() {
        let mut out = Vec::new();
        run(Shell::Bash, "head", &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("head"));
    }

    #[test]
    fn test_unknown_utility() {
        let mut out = Vec::new();
        assert!(run(Shell::Zsh, "nonesuch", &mut out).is_err());
    }
}
