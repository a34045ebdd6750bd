//! Name resolution
//!
//! Turns what a user typed into an object hash. References always win over
//! literal hashes:
//!
//! 1. `@` means `HEAD`
//! 2. `<name>`, `refs/<name>`, `refs/tags/<name>`, `refs/heads/<name>` are
//!    tried in order; the first one that is set is the answer. The bare
//!    `<name>` only counts when it is `HEAD` or already under `refs/`
//! 3. otherwise `<name>` must itself look like a full hash
//!
//! A tag that happens to be spelled like a hash therefore shadows the object
//! with that hash.

use crate::error::{Result, UgitError};
use crate::refs::{is_valid_ref_name, RefStore, HEADS_PREFIX, TAGS_PREFIX};
use crate::types::{HashAlgorithm, HEAD_REF};
use tracing::trace;

/// Resolves reference names and literal hashes
#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'a> {
    refs: &'a RefStore,
    algorithm: HashAlgorithm,
}

impl<'a> NameResolver<'a> {
    /// Create a resolver; `algorithm` fixes the accepted literal hash width
    pub fn new(refs: &'a RefStore, algorithm: HashAlgorithm) -> Self {
        Self { refs, algorithm }
    }

    /// Resolve `name` to a hash
    ///
    /// Literal hashes are returned exactly as given, case included.
    ///
    /// # Errors
    ///
    /// - [`UgitError::InvalidName`] if no reference is set under any
    ///   candidate name and `name` is not a well-formed hash
    /// - [`UgitError::Io`] if a reference file cannot be read
    pub fn resolve(&self, name: &str) -> Result<String> {
        let name = if name == "@" { HEAD_REF } else { name };

        let candidates = [
            name.to_string(),
            format!("refs/{}", name),
            format!("{}/{}", TAGS_PREFIX, name),
            format!("{}/{}", HEADS_PREFIX, name),
        ];

        for candidate in candidates.iter().filter(|c| is_reference_candidate(c)) {
            let hash = self.refs.get_ref(candidate)?;
            if !hash.is_empty() {
                trace!("Resolved {:?} via {}", name, candidate);
                return Ok(hash);
            }
        }

        if self.algorithm.is_valid_hex(name) {
            trace!("Resolved {:?} as a literal hash", name);
            return Ok(name.to_string());
        }

        Err(UgitError::InvalidName(name.to_string()))
    }
}

/// Only `HEAD` and names under `refs/` are references; other files in the
/// metadata directory (`metadata.json`, `objects/...`) are not.
fn is_reference_candidate(name: &str) -> bool {
    is_valid_ref_name(name) && (name == HEAD_REF || name.starts_with("refs/"))
}
