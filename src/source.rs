use crate::{
    errors::{FileOperation, IoError},
    parser::{self, ParsedTree},
};
use miette::Diagnostic;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

const UTF8_BOM: char = '\u{feff}';

#[derive(Error, Debug, Diagnostic)]
pub enum SourceError {
    #[error("I/O error within source domain")]
    #[diagnostic(code(plantree::source::io))]
    Io(#[from] IoError),

    #[error("File not found: {path}")]
    #[diagnostic(
        code(plantree::source::not_found),
        help("Check the path of the diagram file")
    )]
    NotFound { path: PathBuf },

    #[error("Unable to decode '{path}' as UTF-8 text")]
    #[diagnostic(
        code(plantree::source::decode),
        help("Diagram files must be UTF-8 encoded")
    )]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// The lines of a diagram file, read fully into memory before parsing.
#[derive(Debug, Clone)]
pub struct Diagram {
    pub path: PathBuf,
    pub lines: Vec<String>,
}
impl Diagram {
    /// Reads the diagram at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if:
    ///
    /// - `path` does not exist ([`SourceError::NotFound`]).
    /// - The file cannot be read.
    /// - The contents are not valid UTF-8 ([`SourceError::Decode`]).
    pub fn read_from(path: &Path) -> Result<Self, SourceError> {
        let bytes = fs::read(path).map_err(|error| match error.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound {
                path: path.to_path_buf(),
            },
            _ => IoError::new(FileOperation::Read, path.to_path_buf(), error).into(),
        })?;

        let text = String::from_utf8(bytes).map_err(|error| SourceError::Decode {
            path: path.to_path_buf(),
            source: error,
        })?;

        log::debug!("read {} bytes from {}", text.len(), path.display());

        Ok(Self::from_text(path, &text))
    }

    pub fn from_text(path: &Path, text: &str) -> Self {
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

        Self {
            path: path.to_path_buf(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn parse(&self) -> ParsedTree {
        parser::parse(&self.lines)
    }
}
