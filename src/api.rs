use crate::{
    config::Settings,
    materialize::{materialize, Report},
    preview::preview_as_tree,
    prompt::{self, PromptError},
    source::{Diagram, SourceError},
    vfs::VirtualFS,
};
use colored::Colorize;
use std::path::Path;

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum PlantError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Prompt(#[from] PromptError),
}

/// How a single diagram was concluded.
#[derive(Debug)]
pub enum Outcome {
    /// The structure was applied (or simulated, in a dry run).
    Applied(Report),
    /// The user declined the confirmation prompt; nothing was written.
    Cancelled,
}
impl Outcome {
    /// `true` unless some entry of an applied diagram failed.
    pub fn is_success(&self) -> bool {
        match self {
            Self::Applied(report) => report.is_clean(),
            Self::Cancelled => true,
        }
    }
}

/// Reads the diagram at `input`, parses it and creates its structure under the
/// output directory of `settings`.
///
/// Entries that fail to materialize are rendered on stderr and recorded in the
/// returned [`Report`]; they never stop the rest of the diagram.
///
/// # Errors
///
/// Returns a [`PlantError`] if:
///
/// - `input` does not exist, cannot be read, or is not UTF-8 text.
/// - The confirmation prompt fails.
pub fn plant(input: &Path, settings: &Settings) -> Result<Outcome, PlantError> {
    log::info!("parsing {}", input.display());

    let diagram = Diagram::read_from(input)?;

    let tree = diagram.parse();

    if tree.is_empty() {
        log::warn!("{} holds no diagram", input.display());
    }

    println!(
        "Found {} directories and {} files to create",
        tree.directories.len(),
        tree.files.len()
    );

    let vfs = VirtualFS::stage(&tree);

    let destination = settings.output_dir();

    if settings.verbose || settings.dry_run || settings.confirm {
        preview_as_tree(&vfs, &destination);
    }

    if settings.confirm && !settings.dry_run && !prompt::apply_changes()? {
        println!("{}", "Cancelled, nothing was written".yellow());

        return Ok(Outcome::Cancelled);
    }

    if settings.dry_run {
        println!("{}", "=== DRY RUN MODE ===".bold());
    }

    println!("Creating structure in: {}", destination.display());

    let report = materialize(&destination, &vfs, &settings.options());

    for failure in &report.failures {
        render_failure(failure);
    }

    print_summary(&report, settings.dry_run);

    Ok(Outcome::Applied(report))
}

fn render_failure(failure: &dyn miette::Diagnostic) {
    let mut rendered = String::new();

    match miette::GraphicalReportHandler::new().render_report(&mut rendered, failure) {
        Ok(()) => eprintln!("{}", rendered),
        Err(_) => eprintln!("{}", failure),
    }
}

fn print_summary(report: &Report, dry_run: bool) {
    println!("\n{}", "SUMMARY:".bold());
    println!("  Directories created: {}", report.created_dirs);
    println!(
        "  Directories skipped (already exist): {}",
        report.skipped_dirs
    );
    println!("  Files created: {}", report.created_files);
    println!("  Files skipped (already exist): {}", report.skipped_files);
    println!("  Files overwritten: {}", report.overwritten_files);

    if !report.is_clean() {
        println!("  Failures: {}", report.failures.len());
        println!("\n{}", "Directory structure created with errors".red());
    } else if dry_run {
        println!("\n{}", "Dry run completed. No changes were made.".green());
    } else {
        println!("\n{}", "Directory structure created successfully!".green());
    }
}
