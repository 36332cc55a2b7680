//! Error types for raw document loading.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that can occur while building a [`crate::RawDocumentIndex`].
#[derive(Debug)]
pub enum RawError {
    /// The file could not be opened or decoded.
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },
    /// The text is not valid JSON.
    Malformed(serde_json::Error),
}

impl fmt::Display for RawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawError::Io { path, source } => {
                write!(f, "Cannot read {}: {}", path.display(), source)
            }
            RawError::Malformed(e) => {
                write!(f, "Malformed JSON at line {} column {}: {}", e.line(), e.column(), e)
            }
        }
    }
}

impl std::error::Error for RawError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RawError::Io { source, .. } => Some(source),
            RawError::Malformed(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for RawError {
    fn from(e: serde_json::Error) -> Self {
        RawError::Malformed(e)
    }
}
