use crate::{
    errors::{FileOperation, IoError},
    vfs::VirtualFS,
};
use colored::Colorize;
use miette::Diagnostic;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MaterializeError {
    #[error("I/O error within materialize domain")]
    #[diagnostic(code(plantree::materialize::io))]
    Io(#[from] IoError),

    #[error("'{path}' already exists but is not a {expected}")]
    #[diagnostic(
        code(plantree::materialize::conflict),
        help("Rename or remove the existing path, or fix the diagram")
    )]
    Conflict {
        path: PathBuf,
        expected: &'static str,
    },

    #[error("Refusing to create '{path}' outside of the output directory")]
    #[diagnostic(
        code(plantree::materialize::unsafe_path),
        help("Remove '..' segments from the diagram")
    )]
    UnsafePath { path: String },
}

/// How a staged [`VirtualFS`] is applied to disk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Report what would happen without touching the filesystem.
    pub dry_run: bool,
    /// Report every entry, including the ones that already exist.
    pub verbose: bool,
    /// Truncate files that already exist instead of skipping them.
    pub overwrite: bool,
}

/// Counts of what happened to each staged entry, plus the entries that failed.
#[derive(Debug, Default)]
pub struct Report {
    pub created_dirs: usize,
    pub skipped_dirs: usize,
    pub created_files: usize,
    pub skipped_files: usize,
    pub overwritten_files: usize,
    pub failures: Vec<MaterializeError>,
}
impl Report {
    /// `true` when every staged entry was handled without error.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn changed(&self) -> usize {
        self.created_dirs + self.created_files + self.overwritten_files
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Created,
    Skipped,
    Overwritten,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Existing {
    Missing,
    Directory,
    NotDirectory,
}

fn inspect(path: &Path) -> Result<Existing, IoError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(Existing::Directory),
        Ok(_) => Ok(Existing::NotDirectory),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Existing::Missing),
        Err(error) => Err(IoError::new(FileOperation::Stat, path.into(), error)),
    }
}

fn announce(action: Action, is_file: bool, path: &Path, options: &Options) {
    let kind = if is_file { "file" } else { "dir " };

    let label = match action {
        Action::Created if options.dry_run => "would create".cyan(),
        Action::Created => "create".green(),
        Action::Overwritten if options.dry_run => "would overwrite".cyan(),
        Action::Overwritten => "overwrite".magenta(),
        Action::Skipped => "exists".yellow(),
    };

    let shown = match action {
        Action::Skipped => options.verbose,
        _ => options.verbose || options.dry_run,
    };

    if shown {
        println!("{} {} {}", label, kind.dimmed(), path.display());
    }
}

/// Creates all directories in the specified path unless it already exists.
///
/// # Errors
///
/// Returns a [`MaterializeError`] if the path exists as something other than a
/// directory, or if creating it fails due to I/O issues.
fn create_directory(path: &Path, options: &Options) -> Result<Action, MaterializeError> {
    match inspect(path)? {
        Existing::Directory => Ok(Action::Skipped),
        Existing::NotDirectory => Err(MaterializeError::Conflict {
            path: path.to_path_buf(),
            expected: "directory",
        }),
        Existing::Missing => {
            if !options.dry_run {
                fs::create_dir_all(path)
                    .map_err(|error| IoError::new(FileOperation::Mkdir, path.into(), error))?;
            }

            Ok(Action::Created)
        }
    }
}

/// Creates an empty file at the specified path, creating its parent if necessary.
///
/// An existing file is left untouched unless [`Options::overwrite`] is set, in which
/// case it is truncated to zero length.
///
/// # Errors
///
/// Returns a [`MaterializeError`] if the path is an existing directory, or if the file
/// or its parent cannot be created.
fn create_file(path: &Path, options: &Options) -> Result<Action, MaterializeError> {
    match inspect(path)? {
        Existing::Directory => Err(MaterializeError::Conflict {
            path: path.to_path_buf(),
            expected: "file",
        }),
        Existing::NotDirectory if !options.overwrite => Ok(Action::Skipped),
        Existing::NotDirectory => {
            if !options.dry_run {
                fs::OpenOptions::new()
                    .write(true)
                    .truncate(true)
                    .open(path)
                    .map_err(|error| IoError::new(FileOperation::Truncate, path.into(), error))?;
            }

            Ok(Action::Overwritten)
        }
        Existing::Missing if options.dry_run => Ok(Action::Created),
        Existing::Missing => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|error| IoError::new(FileOperation::Mkdir, parent.into(), error))?;
            }

            // create_new never clobbers a file that showed up after the inspection
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
            {
                Ok(_) => Ok(Action::Created),
                Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
                    Ok(Action::Skipped)
                }
                Err(error) => Err(IoError::new(FileOperation::Create, path.into(), error).into()),
            }
        }
    }
}

/// Applies directory and file creation operations from a [`VirtualFS`] under `base`.
///
/// Directories are handled before files. A failing entry is recorded in the returned
/// [`Report`] and the remaining entries are still processed.
pub fn materialize(base: &Path, vfs: &VirtualFS, options: &Options) -> Report {
    let mut report = Report::default();

    for path in &vfs.rejected {
        report.failures.push(MaterializeError::UnsafePath { path: path.clone() });
    }

    for entry in vfs.directories() {
        let path = base.join(&entry.destination);

        match create_directory(&path, options) {
            Ok(action) => {
                log::debug!("{:?} directory {}", action, path.display());
                announce(action, false, &path, options);

                match action {
                    Action::Skipped => report.skipped_dirs += 1,
                    _ => report.created_dirs += 1,
                }
            }
            Err(error) => {
                log::warn!("directory {} failed: {}", path.display(), error);
                report.failures.push(error);
            }
        }
    }

    for entry in vfs.files() {
        let path = base.join(&entry.destination);

        match create_file(&path, options) {
            Ok(action) => {
                log::debug!("{:?} file {}", action, path.display());
                announce(action, true, &path, options);

                match action {
                    Action::Created => report.created_files += 1,
                    Action::Skipped => report.skipped_files += 1,
                    Action::Overwritten => report.overwritten_files += 1,
                }
            }
            Err(error) => {
                log::warn!("file {} failed: {}", path.display(), error);
                report.failures.push(error);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use std::collections::BTreeSet;
    use walkdir::WalkDir;

    const DIAGRAM: &str = "proj/
├── src/
│   ├── main.rs
│   └── nested/
│       └── deep.rs
└── README.md
";

    fn snapshot(root: &Path) -> BTreeSet<(PathBuf, bool, u64)> {
        WalkDir::new(root)
            .into_iter()
            .map(|entry| entry.expect("a walkable entry"))
            .map(|entry| {
                let meta = entry.metadata().expect("readable metadata");
                let relative = entry
                    .path()
                    .strip_prefix(root)
                    .expect("an entry below root")
                    .to_path_buf();

                (relative, meta.is_dir(), if meta.is_dir() { 0 } else { meta.len() })
            })
            .collect()
    }

    fn stage(diagram: &str) -> VirtualFS {
        VirtualFS::stage(&parse_str(diagram))
    }

    #[test]
    fn test_materialize_creates_structure() {
        let dir = tempfile::tempdir().expect("a temp dir");
        let report = materialize(dir.path(), &stage(DIAGRAM), &Options::default());

        assert!(report.is_clean());
        assert_eq!(report.created_dirs, 3);
        assert_eq!(report.created_files, 3);

        let deep = dir.path().join("proj").join("src").join("nested").join("deep.rs");
        assert!(deep.is_file());
        assert_eq!(fs::metadata(&deep).expect("metadata").len(), 0);
        assert!(dir.path().join("proj").join("README.md").is_file());
    }

    #[test]
    fn test_materialize_twice_is_idempotent() {
        let dir = tempfile::tempdir().expect("a temp dir");
        let vfs = stage(DIAGRAM);

        materialize(dir.path(), &vfs, &Options::default());
        let first = snapshot(dir.path());

        let report = materialize(dir.path(), &vfs, &Options::default());
        let second = snapshot(dir.path());

        assert_eq!(first, second);
        assert_eq!(report.changed(), 0);
        assert_eq!(report.skipped_dirs, 3);
        assert_eq!(report.skipped_files, 3);
    }

    #[test]
    fn test_materialize_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().expect("a temp dir");
        let options = Options {
            dry_run: true,
            ..Options::default()
        };

        let report = materialize(dir.path(), &stage(DIAGRAM), &options);

        assert_eq!(report.created_dirs, 3);
        assert_eq!(report.created_files, 3);
        assert!(!dir.path().join("proj").exists());
    }

    #[test]
    fn test_materialize_keeps_existing_file_contents() {
        let dir = tempfile::tempdir().expect("a temp dir");
        fs::create_dir_all(dir.path().join("proj")).expect("mkdir");
        fs::write(dir.path().join("proj").join("README.md"), "keep me").expect("write");

        let report = materialize(dir.path(), &stage(DIAGRAM), &Options::default());

        assert_eq!(report.skipped_dirs, 1);
        assert_eq!(report.skipped_files, 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("proj").join("README.md")).expect("read"),
            "keep me"
        );
    }

    #[test]
    fn test_materialize_overwrite_truncates_existing_file() {
        let dir = tempfile::tempdir().expect("a temp dir");
        fs::create_dir_all(dir.path().join("proj")).expect("mkdir");
        fs::write(dir.path().join("proj").join("README.md"), "replace me").expect("write");

        let options = Options {
            overwrite: true,
            ..Options::default()
        };
        let report = materialize(dir.path(), &stage(DIAGRAM), &options);

        assert_eq!(report.overwritten_files, 1);
        assert_eq!(report.created_files, 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("proj").join("README.md")).expect("read"),
            ""
        );
    }

    #[test]
    fn test_materialize_reports_conflict_and_continues() {
        let dir = tempfile::tempdir().expect("a temp dir");
        fs::create_dir_all(dir.path().join("proj")).expect("mkdir");
        fs::write(dir.path().join("proj").join("src"), "a file, not a dir").expect("write");

        let report = materialize(dir.path(), &stage(DIAGRAM), &Options::default());

        assert!(!report.is_clean());
        assert!(report
            .failures
            .iter()
            .any(|failure| matches!(failure, MaterializeError::Conflict { expected, .. } if *expected == "directory")));
        assert!(dir.path().join("proj").join("README.md").is_file());
    }

    #[test]
    fn test_materialize_directory_where_file_expected() {
        let dir = tempfile::tempdir().expect("a temp dir");
        fs::create_dir_all(dir.path().join("proj").join("README.md")).expect("mkdir");

        let report = materialize(dir.path(), &stage(DIAGRAM), &Options::default());

        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0],
            MaterializeError::Conflict { expected: "file", .. }
        ));
        assert_eq!(report.created_files, 2);
    }

    #[test]
    fn test_materialize_rejects_unsafe_paths() {
        let outer = tempfile::tempdir().expect("a temp dir");
        let base = outer.path().join("base");
        fs::create_dir_all(&base).expect("mkdir");

        let report = materialize(&base, &stage("proj/\n└── ../../escaped.txt\n"), &Options::default());

        assert!(matches!(
            report.failures.as_slice(),
            [MaterializeError::UnsafePath { .. }]
        ));
        assert!(!outer.path().join("escaped.txt").exists());
        assert!(base.join("proj").is_dir());
    }
}
