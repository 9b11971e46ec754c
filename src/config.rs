use crate::{
    errors::{FileOperation, IoError},
    materialize::Options,
};
use miette::Diagnostic;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("I/O error within config domain")]
    #[diagnostic(code(plantree::config::io))]
    Io(#[from] IoError),

    #[error("Unable to parse toml file at '{path}': {source}")]
    #[diagnostic(
        code(plantree::config::parse_toml),
        help("Valid keys are: output, verbose, dry_run, overwrite, confirm")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Run settings, read from an optional TOML file and completed by command line flags.
///
/// ```toml
/// output = "./out"
/// verbose = false
/// dry_run = false
/// overwrite = false
/// confirm = false
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base directory the diagrams are created under. Defaults to the current directory.
    pub output: Option<PathBuf>,
    pub verbose: bool,
    pub dry_run: bool,
    pub overwrite: bool,
    /// Ask before writing anything to disk.
    pub confirm: bool,
}
impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .map_err(|error| IoError::new(FileOperation::Read, path.to_path_buf(), error))?;

        Self::from_toml(path, &content)
    }

    fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let parsed = toml::from_str(content)
            .map_err(|error| ConfigError::Parse {
                path: path.to_path_buf(),
                source: error,
            })?;

        Ok(parsed)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn options(&self) -> Options {
        Options {
            dry_run: self.dry_run,
            verbose: self.verbose,
            overwrite: self.overwrite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_toml() {
        let settings = Settings::from_toml(
            Path::new("plantree.toml"),
            "output = \"out\"\noverwrite = true\n",
        )
        .expect("valid settings");

        assert_eq!(settings.output_dir(), PathBuf::from("out"));
        assert!(settings.overwrite);
        assert!(!settings.dry_run);
        assert_eq!(
            settings.options(),
            Options {
                dry_run: false,
                verbose: false,
                overwrite: true,
            }
        );
    }

    #[test]
    fn test_settings_default_output_is_current_dir() {
        let settings = Settings::from_toml(Path::new("plantree.toml"), "").expect("valid settings");

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.output_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_settings_rejects_unknown_keys() {
        let error = Settings::from_toml(Path::new("plantree.toml"), "colour = true\n").unwrap_err();

        assert!(matches!(error, ConfigError::Parse { path, .. } if path == Path::new("plantree.toml")));
    }

    #[test]
    fn test_settings_from_missing_file() {
        let dir = tempfile::tempdir().expect("a temp dir");
        let error = Settings::from_file(dir.path().join("nope.toml")).unwrap_err();

        assert!(matches!(error, ConfigError::Io(_)));
    }
}
