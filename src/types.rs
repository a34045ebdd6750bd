//! Core data types used throughout the ugit library
//!
//! This module contains the small value types shared across the object
//! store, the codecs and the repository.
//!
//! ## Overview
//!
//! - **Objects**: `ObjectType`, `ExpectedType` - stored object kinds and type queries
//! - **Hashing**: `HashAlgorithm` - the digest used for content addressing
//! - **Configuration**: `RepositoryConfig`, `RepositoryMetadata` - persisted settings
//! - **Results**: `RefEntry`, `CheckoutResult`, `StoreStats` - operation outputs
//!
//! ## Examples
//!
//! ```rust
//! use ugit::types::{ExpectedType, HashAlgorithm, ObjectType};
//!
//! assert_eq!(ObjectType::Blob.as_str(), "blob");
//! assert!(ExpectedType::Any.accepts(ObjectType::Commit));
//! assert_eq!(HashAlgorithm::Sha1.hex_len(), 40);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Name of the metadata directory kept inside the working root
pub const METADATA_DIR: &str = ".ugit";

/// Name of the reference that tracks the current commit
pub const HEAD_REF: &str = "HEAD";

/// Kind of a stored object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// File content
    Blob,
    /// Directory listing
    Tree,
    /// Snapshot pointer with history link
    Commit,
}

impl ObjectType {
    /// Type tag written in front of the payload
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Parse a type tag, returning `None` for unknown tags
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "blob" => Some(ObjectType::Blob),
            "tree" => Some(ObjectType::Tree),
            "commit" => Some(ObjectType::Commit),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type constraint passed when reading an object
///
/// `Any` is the "don't check" query; it is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    /// Accept whatever type is stored
    Any,
    /// Fail unless the stored type matches
    Exactly(ObjectType),
}

impl ExpectedType {
    /// Whether a stored object of type `actual` satisfies this constraint
    pub fn accepts(self, actual: ObjectType) -> bool {
        match self {
            ExpectedType::Any => true,
            ExpectedType::Exactly(expected) => expected == actual,
        }
    }
}

impl From<ObjectType> for ExpectedType {
    fn from(object_type: ObjectType) -> Self {
        ExpectedType::Exactly(object_type)
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedType::Any => f.write_str("any"),
            ExpectedType::Exactly(object_type) => object_type.fmt(f),
        }
    }
}

/// Digest used to address objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// 160-bit SHA-1, 40 hex characters
    #[default]
    Sha1,
    /// 256-bit SHA-256, 64 hex characters
    Sha256,
}

impl HashAlgorithm {
    /// Length of a rendered hash in hex characters
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
        }
    }

    /// Whether `candidate` has the shape of a hash produced by this algorithm
    ///
    /// Hex digits are accepted in either case.
    pub fn is_valid_hex(self, candidate: &str) -> bool {
        candidate.len() == self.hex_len() && candidate.chars().all(|c| c.is_ascii_hexdigit())
    }
}

/// Repository configuration, persisted in `metadata.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Digest used for content addressing
    pub hash_algorithm: HashAlgorithm,
    /// Glob patterns (relative to the working root) excluded from snapshots
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    /// Whether symlinks are snapshotted through to their targets
    #[serde(default)]
    pub follow_symlinks: bool,
    /// Maximum directory nesting accepted when writing a tree
    pub max_depth: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: HashAlgorithm::Sha1,
            ignore_patterns: Vec::new(),
            follow_symlinks: false,
            max_depth: 256,
        }
    }
}

/// Metadata stored with the repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    /// Version of the on-disk format
    pub format_version: u32,
    /// ugit version that created the repository
    pub ugit_version: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Configuration
    pub config: RepositoryConfig,
}

/// A named pointer and the hash it currently holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    /// Path-like reference name, e.g. `refs/tags/v1`
    pub name: String,
    /// Stored hash, empty when unset
    pub hash: String,
}

/// Result of materializing a tree into a directory
#[derive(Debug, Clone, Default)]
pub struct CheckoutResult {
    /// Tree that was checked out
    pub tree_hash: String,
    /// Number of files written
    pub files_written: usize,
    /// Number of files and directories removed while clearing
    pub entries_removed: usize,
    /// Total bytes written
    pub bytes_written: u64,
    /// Time taken in milliseconds
    pub duration_ms: u64,
}

/// Object store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of stored objects
    pub object_count: usize,
    /// Total size of all records in bytes (headers included)
    pub total_size: u64,
}

/// Location of the metadata directory for a working root
pub fn metadata_dir(root: &std::path::Path) -> PathBuf {
    root.join(METADATA_DIR)
}
