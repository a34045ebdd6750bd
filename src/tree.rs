//! Tree encoding and decoding
//!
//! A tree object lists the immediate children of one directory, one line per
//! child:
//!
//! ```text
//! blob 3b18e512dba79e4c8300dd08aeb37f8e728b8dad hello.txt
//! tree 9c2e6f1a0b3d4e5f60718293a4b5c6d7e8f90123 src
//! ```
//!
//! Lines are sorted by their full text, so the same directory contents always
//! encode to the same bytes (and the same hash) no matter what order the
//! filesystem enumerates them in.
//!
//! Both directions use an explicit work stack instead of recursion, so deep
//! directory structures cannot overflow the call stack. Snapshotting is still
//! bounded by the configured maximum depth.

use crate::error::{Result, UgitError};
use crate::filter::PathFilter;
use crate::object_store::ObjectStore;
use crate::types::{ExpectedType, ObjectType};
use crate::utils;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// One child of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// `Blob` for files, `Tree` for subdirectories
    pub object_type: ObjectType,
    /// Hash of the child object
    pub hash: String,
    /// File or directory name, never containing a separator
    pub name: String,
}

impl TreeEntry {
    /// Create a new entry
    pub fn new(object_type: ObjectType, hash: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            object_type,
            hash: hash.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TreeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.object_type, self.hash, self.name)
    }
}

/// Render a listing, sorting entries by their text
pub fn encode_listing(entries: &[TreeEntry]) -> Vec<u8> {
    let mut lines: Vec<String> = entries.iter().map(TreeEntry::to_string).collect();
    lines.sort();

    let mut payload = Vec::new();
    for line in lines {
        payload.extend_from_slice(line.as_bytes());
        payload.push(b'\n');
    }
    payload
}

/// Parse a listing payload
///
/// # Errors
///
/// - [`UgitError::MalformedObject`] for lines that are not `type hash name`
///   or carry a type other than blob/tree
/// - [`UgitError::CorruptTree`] for entry names that would escape the
///   directory they belong to
pub fn decode_listing(hash: &str, payload: &[u8]) -> Result<Vec<TreeEntry>> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| UgitError::malformed_object(hash, "tree listing is not valid UTF-8"))?;

    let mut entries = Vec::new();
    for line in text.split('\n').filter(|line| !line.is_empty()) {
        let mut parts = line.splitn(3, ' ');
        let (Some(tag), Some(child), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(UgitError::malformed_object(hash, format!("bad tree line {:?}", line)));
        };

        let object_type = match ObjectType::from_tag(tag) {
            Some(t @ (ObjectType::Blob | ObjectType::Tree)) => t,
            _ => {
                return Err(UgitError::malformed_object(
                    hash,
                    format!("unexpected tree entry type {:?}", tag),
                ))
            }
        };

        if !is_valid_entry_name(name) {
            return Err(UgitError::CorruptTree {
                hash: hash.to_string(),
                name: name.to_string(),
            });
        }

        entries.push(TreeEntry::new(object_type, child, name));
    }

    Ok(entries)
}

/// Whether `name` is a single, non-special path segment
pub fn is_valid_entry_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains(std::path::MAIN_SEPARATOR)
        && !name.contains('\0')
        && !name.contains('\n')
}

/// A child discovered while listing a directory
enum Child {
    Dir { path: PathBuf, name: String },
    File { path: PathBuf, name: String },
}

/// A directory whose listing is still being assembled
struct PendingDir {
    /// `None` for the directory the snapshot started from
    name: Option<String>,
    children: std::vec::IntoIter<Child>,
    entries: Vec<TreeEntry>,
}

/// Converts between directories on disk and tree objects
#[derive(Debug, Clone, Copy)]
pub struct TreeCodec<'a> {
    store: &'a ObjectStore,
    filter: &'a PathFilter,
    root: &'a Path,
    follow_symlinks: bool,
    max_depth: usize,
}

impl<'a> TreeCodec<'a> {
    /// Create a codec
    ///
    /// `root` is the working root that ignore patterns are relative to.
    pub fn new(store: &'a ObjectStore, filter: &'a PathFilter, root: &'a Path) -> Self {
        Self {
            store,
            filter,
            root,
            follow_symlinks: false,
            max_depth: 256,
        }
    }

    /// Set whether symlinks are snapshotted through to their targets
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Set the maximum directory depth accepted by [`TreeCodec::write_tree`]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Snapshot `dir` and return the hash of its tree object
    ///
    /// Files become blobs, subdirectories become trees, and excluded paths
    /// (the metadata directory, ignore patterns) are skipped.
    ///
    /// # Errors
    ///
    /// - [`UgitError::Io`] if a directory or file cannot be read
    /// - [`UgitError::UnsupportedFileName`] / [`UgitError::PathConversion`]
    ///   for names a listing cannot represent
    /// - [`UgitError::DepthLimitExceeded`] past the configured depth
    pub fn write_tree(&self, dir: &Path) -> Result<String> {
        let mut stack = vec![PendingDir {
            name: None,
            children: self.list_children(dir)?.into_iter(),
            entries: Vec::new(),
        }];

        loop {
            let Some(top) = stack.last_mut() else {
                return Err(UgitError::internal("tree work stack emptied early"));
            };

            match top.children.next() {
                Some(Child::File { path, name }) => {
                    let content = fs::read(&path)?;
                    let hash = self.store.put(&content, ObjectType::Blob)?;
                    trace!("Snapshotted {:?} as blob {}", path, hash);
                    top.entries.push(TreeEntry::new(ObjectType::Blob, hash, name));
                }
                Some(Child::Dir { path, name }) => {
                    if stack.len() >= self.max_depth {
                        return Err(UgitError::DepthLimitExceeded {
                            path,
                            limit: self.max_depth,
                        });
                    }
                    let children = self.list_children(&path)?;
                    stack.push(PendingDir {
                        name: Some(name),
                        children: children.into_iter(),
                        entries: Vec::new(),
                    });
                }
                None => {
                    let Some(finished) = stack.pop() else {
                        return Err(UgitError::internal("tree work stack emptied early"));
                    };
                    let hash = self
                        .store
                        .put(&encode_listing(&finished.entries), ObjectType::Tree)?;

                    match (stack.last_mut(), finished.name) {
                        (Some(parent), Some(name)) => {
                            parent.entries.push(TreeEntry::new(ObjectType::Tree, hash, name));
                        }
                        _ => {
                            debug!("Wrote tree {} for {:?}", hash, dir);
                            return Ok(hash);
                        }
                    }
                }
            }
        }
    }

    /// Decode one level of a tree object
    pub fn entries(&self, hash: &str) -> Result<Vec<TreeEntry>> {
        let payload = self.store.get(hash, ExpectedType::Exactly(ObjectType::Tree))?;
        decode_listing(hash, &payload)
    }

    /// Expand a tree into a flat map from relative path to blob hash
    ///
    /// # Errors
    ///
    /// - [`UgitError::ObjectNotFound`] / [`UgitError::TypeMismatch`] if a
    ///   referenced tree is missing or is not a tree
    /// - [`UgitError::CorruptTree`] if an entry name is not a single segment
    pub fn read_tree(&self, hash: &str) -> Result<BTreeMap<PathBuf, String>> {
        let mut files = BTreeMap::new();
        let mut pending = vec![(hash.to_string(), PathBuf::new())];

        while let Some((tree_hash, base)) = pending.pop() {
            for entry in self.entries(&tree_hash)? {
                let path = base.join(&entry.name);
                match entry.object_type {
                    ObjectType::Blob => {
                        files.insert(path, entry.hash);
                    }
                    ObjectType::Tree => pending.push((entry.hash, path)),
                    ObjectType::Commit => {
                        return Err(UgitError::malformed_object(
                            &tree_hash,
                            format!("commit entry {:?} in tree", entry.name),
                        ))
                    }
                }
            }
        }

        debug!("Tree {} expands to {} files", hash, files.len());
        Ok(files)
    }

    /// List the children of `dir` that belong in a snapshot
    fn list_children(&self, dir: &Path) -> Result<Vec<Child>> {
        let mut children = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            let relative = path
                .strip_prefix(self.root)
                .or_else(|_| path.strip_prefix(dir))
                .unwrap_or(&path)
                .to_path_buf();
            if self.filter.is_excluded(&relative) {
                trace!("Skipping excluded path {:?}", relative);
                continue;
            }

            let name = utils::file_name_to_string(&entry.file_name())?;
            if !is_valid_entry_name(&name) {
                return Err(UgitError::UnsupportedFileName(path));
            }

            let mut file_type = entry.file_type()?;
            if file_type.is_symlink() {
                if !self.follow_symlinks {
                    warn!("Skipping symbolic link {:?}", path);
                    continue;
                }
                file_type = fs::metadata(&path)?.file_type();
            }

            if file_type.is_dir() {
                children.push(Child::Dir { path, name });
            } else if file_type.is_file() {
                children.push(Child::File { path, name });
            } else {
                debug!("Skipping special file {:?}", path);
            }
        }

        Ok(children)
    }
}
