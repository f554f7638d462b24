//! `confluence-api completions`.

use std::io;

use clap::CommandFactory;
use clap_complete::{Shell as CompletionShell, generate};

use crate::cli::{Cli, Shell};

impl From<Shell> for CompletionShell {
  fn from(shell: Shell) -> Self {
    match shell {
      Shell::Bash => Self::Bash,
      Shell::Zsh => Self::Zsh,
      Shell::Fish => Self::Fish,
      Shell::Powershell => Self::PowerShell,
      Shell::Elvish => Self::Elvish,
    }
  }
}

/// Write the completion script for `shell` to stdout.
pub(crate) fn handle_completions_command(shell: Shell) {
  let mut cmd = Cli::command();
  let bin_name = cmd.get_name().to_string();
  generate(CompletionShell::from(shell), &mut cmd, bin_name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn generates_script_mentioning_subcommands() {
    let mut cmd = Cli::command();
    let mut out = Vec::new();
    generate(CompletionShell::from(Shell::Bash), &mut cmd, "confluence-api", &mut out);
    let script = String::from_utf8(out).unwrap();
    assert!(script.contains("confluence-api"));
    assert!(script.contains("space"));
  }
}
