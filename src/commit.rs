//! Commit record encoding
//!
//! A commit payload is a short header block followed by a blank line and the
//! message:
//!
//! ```text
//! tree <hash>
//! parent <hash>      (absent for the root commit)
//!
//! <message, verbatim>
//! ```
//!
//! Everything after the first blank line belongs to the message, including
//! further newlines.

use crate::error::{Result, UgitError};

/// Decoded commit object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Snapshot this commit points at
    pub tree: String,
    /// Previous commit, `None` for a root commit
    pub parent: Option<String>,
    /// Free-text message
    pub message: String,
}

impl CommitRecord {
    /// Create a new commit record
    pub fn new(tree: impl Into<String>, parent: Option<String>, message: impl Into<String>) -> Self {
        Self {
            tree: tree.into(),
            parent: parent.filter(|p| !p.is_empty()),
            message: message.into(),
        }
    }

    /// Whether this commit starts a history
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Render the commit payload
    pub fn encode(&self) -> Vec<u8> {
        let mut payload = format!("tree {}\n", self.tree);
        if let Some(parent) = &self.parent {
            payload.push_str(&format!("parent {}\n", parent));
        }
        payload.push('\n');
        payload.push_str(&self.message);
        payload.into_bytes()
    }

    /// Parse a commit payload
    ///
    /// # Errors
    ///
    /// - [`UgitError::MalformedCommit`] for an unknown header key, a header
    ///   line without a value, a missing `tree` header, or non UTF-8 text
    pub fn decode(hash: &str, payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| UgitError::malformed_commit(hash, "payload is not valid UTF-8"))?;

        let (headers, message) = match text.split_once("\n\n") {
            Some((headers, message)) => (headers, message),
            None => match text.strip_suffix('\n') {
                Some(headers) => (headers, ""),
                None => (text, ""),
            },
        };

        let mut tree = None;
        let mut parent = None;

        for line in headers.split('\n') {
            let Some((key, value)) = line.split_once(' ') else {
                return Err(UgitError::malformed_commit(
                    hash,
                    format!("header line {:?} has no value", line),
                ));
            };

            match key {
                "tree" => tree = Some(value.to_string()),
                "parent" => parent = Some(value.to_string()),
                other => {
                    return Err(UgitError::malformed_commit(
                        hash,
                        format!("unknown key {:?}", other),
                    ))
                }
            }
        }

        let tree = tree.ok_or_else(|| UgitError::malformed_commit(hash, "missing tree header"))?;

        Ok(Self::new(tree, parent, message))
    }
}
