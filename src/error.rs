//! Error types for the index and its query engine.

use std::fmt;

/// Errors that can occur while building or querying the inverted index.
#[derive(Debug)]
pub enum IndexError {
    /// Corrupt varbyte stream or a posting that ends before its declared length.
    MalformedInput(String),
    /// `seek_term` was called on a term absent from the dictionary.
    UnknownTerm(String),
    /// `read_entry` was called on a reader that already reached `done`.
    ReadAfterDone,
    /// `read_next_doc` was called with no remaining documents for the term.
    NoMoreDocs,
    /// File open/read/write failure.
    Io(std::io::Error),
    /// Invalid or missing configuration value.
    Config(String),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::MalformedInput(msg) => write!(f, "malformed posting data: {}", msg),
            IndexError::UnknownTerm(term) => write!(f, "unknown term: {}", term),
            IndexError::ReadAfterDone => write!(f, "read_entry called after reader was done"),
            IndexError::NoMoreDocs => write!(f, "read_next_doc called with no remaining documents"),
            IndexError::Io(e) => write!(f, "I/O error: {}", e),
            IndexError::Config(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IndexError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IndexError {
    fn from(e: std::io::Error) -> Self {
        IndexError::Io(e)
    }
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
