//! Content-addressable object store
//!
//! Every object is persisted as a single record
//!
//! ```text
//! <type> 0x00 <payload>
//! ```
//!
//! under `objects/<hash>`, where `<hash>` is the digest of the whole record
//! (type tag included). Identical `(type, payload)` pairs therefore always map
//! to the same key, and storing them again is a no-op.
//!
//! ## Layout
//!
//! ```text
//! .ugit/
//! ├── metadata.json   # Repository metadata and configuration
//! ├── HEAD            # Current commit
//! ├── refs/           # Tags and branches
//! └── objects/
//!     └── <hash>      # One file per object
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ugit::object_store::ObjectStore;
//! use ugit::types::{ExpectedType, HashAlgorithm, ObjectType};
//! use std::path::PathBuf;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ObjectStore::open(PathBuf::from(".ugit/objects"), HashAlgorithm::Sha1);
//! let hash = store.put(b"Hello, world!", ObjectType::Blob)?;
//! let content = store.get(&hash, ExpectedType::Exactly(ObjectType::Blob))?;
//! assert_eq!(content, b"Hello, world!");
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, UgitError};
use crate::types::{ExpectedType, HashAlgorithm, ObjectType, StoreStats};
use crate::utils;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Content-addressable storage backend
///
/// Objects are immutable once written; the store never deletes anything.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    /// Directory holding one file per object
    root: PathBuf,
    /// Digest used for keys
    algorithm: HashAlgorithm,
}

impl ObjectStore {
    /// Create the objects directory and return a store rooted there
    pub fn init(root: PathBuf, algorithm: HashAlgorithm) -> Result<Self> {
        fs::create_dir_all(&root)?;
        debug!("Initialized object store at {:?}", root);
        Ok(Self { root, algorithm })
    }

    /// Open an existing objects directory
    ///
    /// No I/O happens until the first read or write.
    pub fn open(root: PathBuf, algorithm: HashAlgorithm) -> Self {
        Self { root, algorithm }
    }

    /// Digest used by this store
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Directory holding the objects
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compute the hash an object would be stored under, without writing it
    pub fn hash_object(&self, payload: &[u8], object_type: ObjectType) -> String {
        utils::hash_data(self.algorithm, &encode_record(payload, object_type))
    }

    /// Store a payload and return its hash
    ///
    /// Re-putting identical content returns the same hash and performs no
    /// write.
    ///
    /// # Errors
    ///
    /// - [`UgitError::Io`] if the record cannot be written
    pub fn put(&self, payload: &[u8], object_type: ObjectType) -> Result<String> {
        let record = encode_record(payload, object_type);
        let hash = utils::hash_data(self.algorithm, &record);
        let path = self.object_path(&hash);

        if path.exists() {
            trace!("Object {} already stored", hash);
            return Ok(hash);
        }

        utils::atomic_write(&path, &record)?;
        trace!("Stored {} {} ({} bytes)", object_type, hash, payload.len());

        Ok(hash)
    }

    /// Load a payload, checking its type against `expected`
    ///
    /// # Errors
    ///
    /// - [`UgitError::ObjectNotFound`] if nothing is stored under `hash`
    /// - [`UgitError::TypeMismatch`] if the stored type differs from `expected`
    /// - [`UgitError::MalformedObject`] if the record has no valid type header
    pub fn get(&self, hash: &str, expected: ExpectedType) -> Result<Vec<u8>> {
        let (actual, payload) = self.read_raw(hash)?;

        if !expected.accepts(actual) {
            return Err(UgitError::TypeMismatch {
                hash: hash.to_string(),
                expected,
                actual,
            });
        }

        Ok(payload)
    }

    /// Load a record and split it into its type and payload
    pub fn read_raw(&self, hash: &str) -> Result<(ObjectType, Vec<u8>)> {
        let record = self.read_record(hash)?;
        decode_record(hash, record)
    }

    /// Load the full record bytes, header included
    pub fn read_record(&self, hash: &str) -> Result<Vec<u8>> {
        if !self.is_plausible_key(hash) {
            return Err(UgitError::ObjectNotFound(hash.to_string()));
        }

        match fs::read(self.object_path(hash)) {
            Ok(record) => Ok(record),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(UgitError::ObjectNotFound(hash.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check if an object exists
    pub fn exists(&self, hash: &str) -> bool {
        self.is_plausible_key(hash) && self.object_path(hash).is_file()
    }

    /// List the hashes of all stored objects, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let mut hashes = Vec::new();
        if !self.root.exists() {
            return Ok(hashes);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            // Leftover temp files from interrupted writes are not objects.
            if let Some(name) = entry.file_name().to_str() {
                if self.algorithm.is_valid_hex(name) {
                    hashes.push(name.to_string());
                }
            }
        }

        hashes.sort();
        Ok(hashes)
    }

    /// Get object store statistics
    pub fn stats(&self) -> Result<StoreStats> {
        let mut stats = StoreStats::default();
        for hash in self.list()? {
            stats.object_count += 1;
            stats.total_size += fs::metadata(self.object_path(&hash))?.len();
        }
        Ok(stats)
    }

    /// Path of the file backing an object
    fn object_path(&self, hash: &str) -> PathBuf {
        self.root.join(hash)
    }

    /// Keys are plain hex; anything else could escape the objects directory.
    fn is_plausible_key(&self, hash: &str) -> bool {
        !hash.is_empty() && hash.chars().all(|c| c.is_ascii_hexdigit())
    }
}

/// Render the on-disk record for a payload
fn encode_record(payload: &[u8], object_type: ObjectType) -> Vec<u8> {
    let tag = object_type.as_str().as_bytes();
    let mut record = Vec::with_capacity(tag.len() + 1 + payload.len());
    record.extend_from_slice(tag);
    record.push(0);
    record.extend_from_slice(payload);
    record
}

/// Split a record at its first NUL byte
fn decode_record(hash: &str, mut record: Vec<u8>) -> Result<(ObjectType, Vec<u8>)> {
    let separator = record
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| UgitError::malformed_object(hash, "missing type header"))?;

    let object_type = std::str::from_utf8(&record[..separator])
        .ok()
        .and_then(ObjectType::from_tag)
        .ok_or_else(|| {
            UgitError::malformed_object(
                hash,
                format!(
                    "unknown type tag {:?}",
                    String::from_utf8_lossy(&record[..separator])
                ),
            )
        })?;

    let payload = record.split_off(separator + 1);
    Ok((object_type, payload))
}
