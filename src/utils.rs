//! Utility functions for ugit
//!
//! Hashing helpers, crash-safe file writes, and path manipulation shared by
//! the object store, the reference store and the tree codec.

use crate::error::{Result, UgitError};
use crate::types::HashAlgorithm;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::trace;

/// Hash a byte slice with the given algorithm
///
/// Returns the digest as a lowercase hexadecimal string whose length is
/// [`HashAlgorithm::hex_len`].
///
/// # Example
///
/// ```rust,ignore
/// use crate::utils::hash_data;
/// use crate::types::HashAlgorithm;
///
/// let hash = hash_data(HashAlgorithm::Sha1, b"blob\0hello");
/// assert_eq!(hash.len(), 40);
/// ```
pub fn hash_data(algorithm: HashAlgorithm, data: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Sha1 => {
            let mut hasher = Sha1::new();
            hasher.update(data);
            hex::encode(hasher.finalize())
        }
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(data);
            hex::encode(hasher.finalize())
        }
    }
}

/// File name prefix of in-flight atomic writes
pub const TEMP_PREFIX: &str = ".tmp";

/// Whether a file name belongs to an unfinished atomic write
pub fn is_temp_file(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with(TEMP_PREFIX))
}

/// Atomically write a file
///
/// Writes content to a temporary file in the target's directory and then
/// renames it into place, so readers never observe a partially written file.
/// The temporary file is removed if any step fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(parent)?;
    temp.write_all(content)?;
    temp.persist(path).map_err(|e| UgitError::Io(e.error))?;

    trace!("Atomically wrote {} bytes to {:?}", content.len(), path);
    Ok(())
}

/// Remove directory if empty
pub fn remove_dir_if_empty(path: &Path) -> Result<bool> {
    if path.is_dir() && fs::read_dir(path)?.next().is_none() {
        fs::remove_dir(path)?;
        trace!("Removed empty directory: {:?}", path);
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Make a path relative to a base path
///
/// Tries a lexical strip first and falls back to canonicalizing both paths.
///
/// # Errors
///
/// - [`UgitError::Internal`] if the path is not under the base path
/// - [`UgitError::Io`] if canonicalization fails (fallback case only)
pub fn make_relative(path: &Path, base: &Path) -> Result<PathBuf> {
    if let Ok(relative) = path.strip_prefix(base) {
        return Ok(relative.to_path_buf());
    }

    let path_canon = path.canonicalize()?;
    let base_canon = base.canonicalize()?;

    path_canon
        .strip_prefix(&base_canon)
        .map(|p| p.to_path_buf())
        .map_err(|_| {
            UgitError::internal(format!(
                "Path {:?} is not relative to {:?}",
                path_canon, base_canon
            ))
        })
}

/// Convert a file name to UTF-8
pub fn file_name_to_string(name: &OsStr) -> Result<String> {
    name.to_str()
        .map(str::to_string)
        .ok_or_else(|| UgitError::PathConversion(name.to_os_string()))
}

/// Render a relative path with `/` separators regardless of platform
pub fn to_slash_string(path: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(file_name_to_string(part)?),
            Component::CurDir => {}
            other => {
                return Err(UgitError::internal(format!(
                    "Unexpected path component {:?} in {:?}",
                    other, path
                )))
            }
        }
    }
    Ok(parts.join("/"))
}
