use crate::cli::{Cli, CompletionsArgs, ShellType};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};

/// Execute the completions command.
///
/// # Errors
///
/// This function currently cannot fail; the signature matches the other
/// commands for uniform dispatch.
pub fn execute(args: &CompletionsArgs) -> Result<()> {
    let shell = match args.shell {
        ShellType::Bash => Shell::Bash,
        ShellType::Zsh => Shell::Zsh,
        ShellType::Fish => Shell::Fish,
        ShellType::PowerShell => Shell::PowerShell,
        ShellType::Elvish => Shell::Elvish,
    };

    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "tkr", &mut std::io::stdout());
    Ok(())
}
