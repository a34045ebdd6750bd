//! Commit history traversal
//!
//! History is a set of single-parent chains that may share ancestors:
//!
//! ```text
//! c5 (refs/heads/feature)
//!  \
//!   c3 -- c2 -- c1 (root)
//!  /
//! c4 (HEAD)
//! ```
//!
//! [`HistoryWalker::history_from`] walks every chain reachable from a set of
//! starting hashes, emitting each commit once. Chains are taken in the order
//! the starting hashes are given, and each chain is emitted contiguously from
//! its tip towards the root until it reaches a commit already emitted.

use crate::collections::{HashSet, HashSetExt};
use crate::commit::CommitRecord;
use crate::error::{Result, UgitError};
use crate::object_store::ObjectStore;
use crate::types::{ExpectedType, ObjectType};
use tracing::{debug, trace};

/// Reads commits and walks their parent links
#[derive(Debug, Clone, Copy)]
pub struct HistoryWalker<'a> {
    store: &'a ObjectStore,
}

impl<'a> HistoryWalker<'a> {
    /// Create a walker over an object store
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    /// Load and decode a commit object
    ///
    /// # Errors
    ///
    /// - [`UgitError::ObjectNotFound`] if the commit does not exist
    /// - [`UgitError::TypeMismatch`] if `hash` names a blob or tree
    /// - [`UgitError::MalformedCommit`] if the payload cannot be parsed
    pub fn get_commit(&self, hash: &str) -> Result<CommitRecord> {
        let payload = self.store.get(hash, ExpectedType::Exactly(ObjectType::Commit))?;
        CommitRecord::decode(hash, &payload)
    }

    /// All commits reachable from `starts`, each exactly once
    ///
    /// Empty starting hashes (unset references) are skipped. For a single
    /// linear chain the result is the chain itself, most recent first.
    ///
    /// # Errors
    ///
    /// - [`UgitError::CyclicHistory`] if a parent link leads back into the
    ///   chain being walked
    /// - any error from [`HistoryWalker::get_commit`]
    pub fn history_from<I, S>(&self, starts: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut visited = HashSet::new();
        let mut history = Vec::new();

        for start in starts {
            let mut chain = HashSet::new();
            let mut next = Some(start.as_ref().to_string());

            while let Some(hash) = next.take() {
                if hash.is_empty() {
                    break;
                }
                if chain.contains(&hash) {
                    return Err(UgitError::CyclicHistory(hash));
                }
                if visited.contains(&hash) {
                    trace!("Reached already visited commit {}", hash);
                    break;
                }

                let commit = self.get_commit(&hash)?;
                visited.insert(hash.clone());
                chain.insert(hash.clone());
                history.push(hash);
                next = commit.parent;
            }
        }

        debug!("Walked {} commits", history.len());
        Ok(history)
    }

    /// History from `start` paired with the decoded commits
    pub fn log(&self, start: &str) -> Result<Vec<(String, CommitRecord)>> {
        self.history_from([start])?
            .into_iter()
            .map(|hash| {
                let commit = self.get_commit(&hash)?;
                Ok((hash, commit))
            })
            .collect()
    }
}
