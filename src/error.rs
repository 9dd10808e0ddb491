// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the suggestion engine itself.
#[derive(Debug, Error)]
pub enum TypeaheadError {
    /// A position index lookup key must be exactly one character.
    #[error("illegal character provided: '{0}'")]
    InvalidCharacter(String),
    #[error("skill identifiers must not be empty")]
    EmptyIdentifier,
    #[error("cannot suggest a child from a node without children")]
    NoChildren,
}

/// Failures while reading a vocabulary from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read vocabulary {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not read vocabulary: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid JSON vocabulary: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },
    #[error(transparent)]
    Vocabulary(#[from] TypeaheadError),
}
