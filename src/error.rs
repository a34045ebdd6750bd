//! Error types for the ugit library
//!
//! This module defines every failure a repository operation can surface.
//! Nothing is retried internally: each error is terminal for the operation
//! that produced it and is handed straight back to the caller.

use crate::types::{ExpectedType, ObjectType};
use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Results in the ugit library
pub type Result<T> = std::result::Result<T, UgitError>;

/// Main error type for all ugit operations
#[derive(Debug, Error)]
pub enum UgitError {
    /// I/O errors during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors reading or writing repository metadata
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Object not found in the object store
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// A reference that must be set is unset
    #[error("Reference not found: {0}")]
    RefNotFound(String),

    /// Stored object type differs from the type the caller asked for
    #[error("Type mismatch for object {hash}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Hash of the offending object
        hash: String,
        /// Type the caller expected
        expected: ExpectedType,
        /// Type found in the store
        actual: ObjectType,
    },

    /// Commit payload could not be parsed
    #[error("Malformed commit {hash}: {reason}")]
    MalformedCommit {
        /// Hash of the commit object
        hash: String,
        /// What was wrong with it
        reason: String,
    },

    /// Stored record has no type header or an unknown type tag
    #[error("Malformed object {hash}: {reason}")]
    MalformedObject {
        /// Hash of the object
        hash: String,
        /// What was wrong with it
        reason: String,
    },

    /// Name matched no reference and is not a well-formed hash
    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    /// Tree entry violates the naming invariant (store corruption)
    #[error("Corrupt tree {hash}: invalid entry name {name:?}")]
    CorruptTree {
        /// Hash of the tree object
        hash: String,
        /// Offending entry name
        name: String,
    },

    /// Parent chain loops back on itself
    #[error("Cyclic history detected at commit {0}")]
    CyclicHistory(String),

    /// Stored bytes no longer hash to their key
    #[error("Hash mismatch - expected: {expected}, actual: {actual}")]
    HashMismatch {
        /// Key the object is stored under
        expected: String,
        /// Hash recomputed from its bytes
        actual: String,
    },

    /// File name cannot be represented in a tree listing
    #[error("Unsupported file name: {0:?}")]
    UnsupportedFileName(PathBuf),

    /// Path conversion error (non UTF-8 file name)
    #[error("Path conversion error: {0:?}")]
    PathConversion(std::ffi::OsString),

    /// Directory nesting exceeded the configured depth guard
    #[error("Directory depth limit of {limit} exceeded at {path:?}")]
    DepthLimitExceeded {
        /// Directory where the limit was hit
        path: PathBuf,
        /// Configured limit
        limit: usize,
    },

    /// Repository metadata directory is missing
    #[error("Repository not initialized at path: {0:?}")]
    StorageNotInitialized(PathBuf),

    /// Repository metadata directory already exists
    #[error("Repository already exists at path: {0:?}")]
    StorageAlreadyExists(PathBuf),

    /// Ignore pattern parsing error
    #[error("Invalid ignore pattern: {0}")]
    InvalidPattern(String),

    /// Walk directory error from walkdir crate
    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<globset::Error> for UgitError {
    fn from(err: globset::Error) -> Self {
        UgitError::InvalidPattern(err.to_string())
    }
}

impl UgitError {
    /// Create an internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        UgitError::Internal(msg.into())
    }

    pub(crate) fn malformed_commit(hash: &str, reason: impl Into<String>) -> Self {
        UgitError::MalformedCommit {
            hash: hash.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_object(hash: &str, reason: impl Into<String>) -> Self {
        UgitError::MalformedObject {
            hash: hash.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if this error indicates a corrupted store rather than a usage mistake
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            UgitError::CorruptTree { .. }
                | UgitError::CyclicHistory(_)
                | UgitError::HashMismatch { .. }
                | UgitError::MalformedObject { .. }
                | UgitError::MalformedCommit { .. }
        )
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            UgitError::InvalidName(name) => {
                format!(
                    "'{}' is neither a known reference nor a full object hash. \
                     Use 'ugit log' to see available commits.",
                    name
                )
            }
            UgitError::StorageNotInitialized(path) => {
                format!("Not a ugit repository: {:?}. Run 'ugit init' first.", path)
            }
            UgitError::CorruptTree { .. } | UgitError::CyclicHistory(_) => {
                format!("{}. The object store is corrupted; run 'ugit verify'.", self)
            }
            _ => self.to_string(),
        }
    }
}
