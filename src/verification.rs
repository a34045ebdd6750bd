//! Object store verification and integrity checking
//!
//! Verification walks every stored object and checks that:
//!
//! - the record still hashes to the key it is stored under
//! - the record has a valid type header
//! - trees decode cleanly and every child they list is present
//! - commits decode cleanly and their tree (and parent, if any) are present
//! - every reference points at an existing object
//!
//! Problems are collected into a [`VerificationReport`] rather than returned
//! as errors; only failures that prevent verification itself (for example an
//! unreadable objects directory) are errors.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ugit::Repository;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = Repository::open(PathBuf::from("."))?;
//! let report = repo.verify()?;
//! if !report.is_valid() {
//!     for issue in &report.issues {
//!         eprintln!("{}", issue);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use crate::commit::CommitRecord;
use crate::error::{Result, UgitError};
use crate::object_store::ObjectStore;
use crate::refs::RefStore;
use crate::tree;
use crate::types::ObjectType;
use crate::utils;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A single problem found during verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationIssue {
    /// Object (or reference name) the problem was found in
    pub subject: String,
    /// Description of the problem
    pub problem: String,
}

impl fmt::Display for VerificationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.problem)
    }
}

/// Outcome of verifying a repository
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    /// Number of objects examined
    pub objects_checked: usize,
    /// Number of references examined
    pub refs_checked: usize,
    /// Problems found
    pub issues: Vec<VerificationIssue>,
    /// Time taken in milliseconds
    pub verification_time_ms: u64,
}

impl VerificationReport {
    /// Whether no problems were found
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} objects, {} refs checked, {} issues ({}ms)",
            self.objects_checked,
            self.refs_checked,
            self.issues.len(),
            self.verification_time_ms
        )
    }

    fn push(&mut self, subject: &str, problem: impl Into<String>) {
        let issue = VerificationIssue {
            subject: subject.to_string(),
            problem: problem.into(),
        };
        warn!("Verification issue: {}", issue);
        self.issues.push(issue);
    }
}

/// Verifier over an object store and its references
#[derive(Debug)]
pub struct ObjectVerifier<'a> {
    store: &'a ObjectStore,
    refs: &'a RefStore,
}

impl<'a> ObjectVerifier<'a> {
    /// Create a new verifier
    pub fn new(store: &'a ObjectStore, refs: &'a RefStore) -> Self {
        Self { store, refs }
    }

    /// Recompute the digest of one object and compare it to its key
    ///
    /// # Errors
    ///
    /// - [`UgitError::HashMismatch`] if the bytes no longer match the key
    /// - [`UgitError::ObjectNotFound`] if nothing is stored under `hash`
    pub fn verify_object(&self, hash: &str) -> Result<()> {
        let record = self.store.read_record(hash)?;
        let actual = utils::hash_data(self.store.algorithm(), &record);
        if actual != hash {
            return Err(UgitError::HashMismatch {
                expected: hash.to_string(),
                actual,
            });
        }
        Ok(())
    }

    /// Verify every stored object and every reference
    pub fn verify_all(&self) -> Result<VerificationReport> {
        let start = Instant::now();
        let mut report = VerificationReport::default();

        for hash in self.store.list()? {
            report.objects_checked += 1;
            self.check_object(&hash, &mut report)?;
        }

        for entry in self.refs.all_refs()? {
            report.refs_checked += 1;
            if entry.hash.is_empty() {
                continue;
            }
            if !self.store.exists(&entry.hash) {
                report.push(&entry.name, format!("points at missing object {}", entry.hash));
            }
        }

        report.verification_time_ms = start.elapsed().as_millis() as u64;
        info!("Verification finished: {}", report.summary());
        Ok(report)
    }

    fn check_object(&self, hash: &str, report: &mut VerificationReport) -> Result<()> {
        match self.verify_object(hash) {
            Ok(()) => {}
            Err(UgitError::HashMismatch { actual, .. }) => {
                report.push(hash, format!("content hashes to {}", actual));
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let (object_type, payload) = match self.store.read_raw(hash) {
            Ok(parts) => parts,
            Err(e) if e.is_corruption() => {
                report.push(hash, e.to_string());
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        match object_type {
            ObjectType::Blob => {}
            ObjectType::Tree => match tree::decode_listing(hash, &payload) {
                Ok(entries) => {
                    for entry in entries {
                        if !self.store.exists(&entry.hash) {
                            report.push(
                                hash,
                                format!("entry {:?} references missing {}", entry.name, entry.hash),
                            );
                        }
                    }
                }
                Err(e) => report.push(hash, e.to_string()),
            },
            ObjectType::Commit => match CommitRecord::decode(hash, &payload) {
                Ok(commit) => {
                    if !self.store.exists(&commit.tree) {
                        report.push(hash, format!("references missing tree {}", commit.tree));
                    }
                    if let Some(parent) = commit.parent.as_deref() {
                        if !self.store.exists(parent) {
                            report.push(hash, format!("references missing parent {}", parent));
                        }
                    }
                }
                Err(e) => report.push(hash, e.to_string()),
            },
        }

        debug!("Checked {} {}", object_type, hash);
        Ok(())
    }
}
