//! Asset byte access.
//!
//! The engine reads every asset (world documents, settings, script
//! modules) through the [`ReadSource`] trait so the core never opens
//! files directly. [`DiskSource`] serves a rooted directory;
//! [`MemorySource`] backs tests and embedded demo assets.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while reading from a source.
#[derive(Debug)]
pub enum SourceError {
    /// The requested path was not found in the source.
    NotFound(String),
    /// An IO error occurred while accessing the source.
    Io(std::io::Error),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::NotFound(path) => write!(f, "not found: {path}"),
            SourceError::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound(err.to_string())
        } else {
            SourceError::Io(err)
        }
    }
}

/// Read-only byte access to a tree of assets.
///
/// Paths use forward slashes and no leading slash.
pub trait ReadSource {
    /// Reads the entire contents of a file.
    fn read(&self, path: &str) -> Result<Vec<u8>, SourceError>;

    /// Returns whether a file exists at the given path.
    fn exists(&self, path: &str) -> bool;
}

/// [`ReadSource`] over a directory on the native filesystem.
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    /// Creates a source rooted at `root`. The directory does not have to
    /// exist yet; reads will fail with [`SourceError::NotFound`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ReadSource for DiskSource {
    fn read(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        let full = self.root.join(path);
        std::fs::read(&full).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound(path.to_owned())
            } else {
                SourceError::Io(err)
            }
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.root.join(path).is_file()
    }
}

/// In-memory [`ReadSource`] for tests and embedded assets.
#[derive(Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// Creates an empty in-memory source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a file, overwriting any existing entry at the same path.
    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), data.into());
    }

    /// Inserts a file and returns `self`, for chained construction.
    pub fn with(mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }
}

impl ReadSource for MemorySource {
    fn read(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_owned()))
    }

    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}
