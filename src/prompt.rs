use inquire::Confirm;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PromptError {
    #[error("Error occurred trying to prompt user")]
    #[diagnostic(
        code(plantree::prompt::inquire),
        help("Run from an interactive terminal, or drop --confirm")
    )]
    Inquire(#[from] inquire::InquireError),
}

/// Asks whether the previewed structure should be written to disk.
pub fn apply_changes() -> Result<bool, PromptError> {
    let answer = Confirm::new("Apply changes?")
        .with_default(false)
        .with_help_message("Existing paths are never touched unless --overwrite is set")
        .prompt()?;

    Ok(answer)
}
