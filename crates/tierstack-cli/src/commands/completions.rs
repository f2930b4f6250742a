//! Shell completion generation.

use std::io::Write;

use clap::CommandFactory;
use clap_complete::{Generator, generate, shells};

use crate::cli::{Cli, CompletionsArgs, Shell};
use crate::error::CliResult;

const BIN_NAME: &str = "tierstack";

pub fn execute(args: CompletionsArgs) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    write_completions(args.shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

fn write_completions(shell: Shell, out: &mut dyn Write) {
    match shell {
        Shell::Bash => emit(shells::Bash, out),
        Shell::Zsh => emit(shells::Zsh, out),
        Shell::Fish => emit(shells::Fish, out),
        Shell::PowerShell => emit(shells::PowerShell, out),
        Shell::Elvish => emit(shells::Elvish, out),
    }
}

fn emit<G: Generator>(generator: G, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    generate(generator, &mut cmd, BIN_NAME, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bash_script_names_subcommands() {
        let mut buf = Vec::new();
        write_completions(Shell::Bash, &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("tierstack"));
        assert!(script.contains("synth"));
        assert!(script.contains("outputs"));
    }

    #[test]
    fn fish_script_is_not_empty() {
        let mut buf = Vec::new();
        write_completions(Shell::Fish, &mut buf);
        assert!(!buf.is_empty());
    }
}
