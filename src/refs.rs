//! Reference storage
//!
//! References are plain files under the metadata directory whose content is
//! the literal hash text:
//!
//! ```text
//! .ugit/
//! ├── HEAD
//! └── refs/
//!     ├── tags/<name>
//!     └── heads/<name>
//! ```
//!
//! An absent (or empty) file means the reference is unset, which is never an
//! error when reading.

use crate::error::{Result, UgitError};
use crate::types::{RefEntry, HEAD_REF};
use crate::utils;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Namespace holding tags
pub const TAGS_PREFIX: &str = "refs/tags";

/// Namespace holding branches
pub const HEADS_PREFIX: &str = "refs/heads";

/// Durable name-to-hash mapping
#[derive(Debug, Clone)]
pub struct RefStore {
    /// Metadata directory; reference names are paths relative to it
    root: PathBuf,
}

impl RefStore {
    /// Create a reference store rooted at the metadata directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Point `name` at `hash`, creating intermediate directories
    ///
    /// # Errors
    ///
    /// - [`UgitError::InvalidName`] if `name` is not a valid reference name
    /// - [`UgitError::Io`] if the reference cannot be written
    pub fn set_ref(&self, name: &str, hash: &str) -> Result<()> {
        let path = self.ref_path(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        utils::atomic_write(&path, hash.as_bytes())?;
        debug!("Updated {} -> {}", name, hash);
        Ok(())
    }

    /// Read the hash stored under `name`, or an empty string if unset
    pub fn get_ref(&self, name: &str) -> Result<String> {
        let path = self.ref_path(name)?;
        // Namespaces like `refs/tags`, and names running through an existing
        // reference file (`refs/tags/v1/x`), are not references.
        if !path.is_file() {
            return Ok(String::new());
        }
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content.trim().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Current value of `HEAD`
    pub fn head(&self) -> Result<String> {
        self.get_ref(HEAD_REF)
    }

    /// `HEAD` followed by every reference under `refs/`, sorted by name
    pub fn all_refs(&self) -> Result<Vec<RefEntry>> {
        let mut names = vec![HEAD_REF.to_string()];

        let refs_dir = self.root.join("refs");
        if refs_dir.is_dir() {
            let mut nested = Vec::new();
            for entry in WalkDir::new(&refs_dir).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_dir() || utils::is_temp_file(entry.file_name()) {
                    continue;
                }
                let relative = utils::make_relative(entry.path(), &self.root)?;
                nested.push(utils::to_slash_string(&relative)?);
            }
            names.extend(nested);
        }

        names
            .into_iter()
            .map(|name| {
                let hash = self.get_ref(&name)?;
                Ok(RefEntry { name, hash })
            })
            .collect()
    }

    /// Point `refs/tags/<tag>` at `hash`
    pub fn create_tag(&self, tag: &str, hash: &str) -> Result<()> {
        self.set_ref(&format!("{}/{}", TAGS_PREFIX, tag), hash)
    }

    /// Point `refs/heads/<branch>` at `hash`
    pub fn create_branch(&self, branch: &str, hash: &str) -> Result<()> {
        self.set_ref(&format!("{}/{}", HEADS_PREFIX, branch), hash)
    }

    /// Map a reference name onto its backing file
    fn ref_path(&self, name: &str) -> Result<PathBuf> {
        if !is_valid_ref_name(name) {
            return Err(UgitError::InvalidName(name.to_string()));
        }
        Ok(name.split('/').fold(self.root.clone(), |path, part| path.join(part)))
    }

    /// Metadata directory backing this store
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Whether `name` can be used as a reference name
///
/// Names are `/`-separated, relative, and free of empty, `.` and `..`
/// segments, so they always stay inside the metadata directory. Segments
/// may not look like the temp files of an unfinished write.
pub fn is_valid_ref_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('\\')
        && !name.contains('\0')
        && name.split('/').all(|part| {
            !part.is_empty()
                && part != "."
                && part != ".."
                && !part.starts_with(utils::TEMP_PREFIX)
        })
}
