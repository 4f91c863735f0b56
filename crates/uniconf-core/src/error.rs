//! Error types for configuration loading, parsing and merging.

use crate::types::Kind;
use thiserror::Error;

/// Errors that can occur while building a configuration tree.
#[derive(Error, Debug)]
pub enum UniconfError {
    /// A source file or directory could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A directory walk failed part-way through.
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A `.json` source was not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A `.conf`/`.toml` source was rejected by the settings parser.
    #[error("settings parse error: {0}")]
    SettingsParse(#[from] toml::de::Error),

    /// A line-oriented source was malformed.
    /// Includes the 1-based line number where the problem was detected.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A placeholder or container received a write of the wrong kind,
    /// e.g. a sequence item written into an object.
    #[error("cannot write {attempted} into {found}")]
    TypeClash { attempted: Kind, found: Kind },

    /// A node handle no longer points into the tree.
    #[error("no node at '{0}'")]
    NotFound(String),

    /// A source tried to write the root key that holds collected problems.
    #[error("'{0}' at the root is reserved for collected problems")]
    Reserved(String),

    /// A parsed subtree disagrees with the type of the branch it targets.
    #[error("branch '{branch}' holds {existing}, refusing to attach {incoming}")]
    MergeConflict {
        branch: String,
        existing: Kind,
        incoming: Kind,
    },
}

impl UniconfError {
    /// Line number carried by the error, if the source had one.
    pub fn line(&self) -> Option<usize> {
        match self {
            UniconfError::Parse { line, .. } => Some(*line),
            UniconfError::JsonParse(err) => Some(err.line()),
            _ => None,
        }
    }

    /// The message without the line prefix, for reports that place the line
    /// themselves.
    pub fn detail(&self) -> String {
        match self {
            UniconfError::Parse { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Convenience alias used throughout uniconf-core.
pub type Result<T> = std::result::Result<T, UniconfError>;
