//! Main repository implementation
//!
//! [`Repository`] is the explicit context every operation runs against: it
//! owns the working root, the `.ugit` metadata directory, the object store,
//! the reference store and the configuration. Nothing depends on the process
//! working directory.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use ugit::Repository;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = Repository::init(PathBuf::from("./my_project"))?;
//!
//! let first = repo.commit("Initial commit")?;
//! let second = repo.commit("Added features")?;
//! repo.create_tag("v1", &first)?;
//!
//! // Restore the tagged snapshot
//! let target = repo.resolve("v1")?;
//! repo.checkout(&target)?;
//! assert_eq!(repo.history_from([&second])?, vec![second.clone(), first.clone()]);
//! # Ok(())
//! # }
//! ```

use crate::checkout;
use crate::commit::CommitRecord;
use crate::error::{Result, UgitError};
use crate::filter::PathFilter;
use crate::history::HistoryWalker;
use crate::object_store::ObjectStore;
use crate::refs::RefStore;
use crate::resolver::NameResolver;
use crate::tree::{TreeCodec, TreeEntry};
use crate::types::*;
use crate::verification::{ObjectVerifier, VerificationReport};
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Version of the on-disk layout written by this crate
const FORMAT_VERSION: u32 = 1;

/// A working directory together with its object store and references
#[derive(Debug)]
pub struct Repository {
    /// Directory being tracked
    root: PathBuf,
    /// `<root>/.ugit`
    metadata_dir: PathBuf,
    /// Content-addressed objects
    store: ObjectStore,
    /// Names pointing into the store
    refs: RefStore,
    /// Excluded paths
    filter: PathFilter,
    /// Configuration
    config: RepositoryConfig,
}

impl Repository {
    /// Initialize a repository with the default configuration
    ///
    /// Creates `<root>/.ugit` with an empty object store.
    ///
    /// # Errors
    ///
    /// - [`UgitError::StorageAlreadyExists`] if `<root>/.ugit` exists
    /// - [`UgitError::Internal`] if `root` does not exist
    /// - [`UgitError::Io`] if the metadata directory cannot be created
    pub fn init(root: PathBuf) -> Result<Self> {
        Self::init_with_config(root, RepositoryConfig::default())
    }

    /// Initialize a repository with an explicit configuration
    #[instrument(skip(config))]
    pub fn init_with_config(root: PathBuf, config: RepositoryConfig) -> Result<Self> {
        if !root.is_dir() {
            return Err(UgitError::internal(format!(
                "Root path {:?} does not exist",
                root
            )));
        }

        let metadata_dir = metadata_dir(&root);
        if metadata_dir.exists() {
            return Err(UgitError::StorageAlreadyExists(metadata_dir));
        }

        let filter = PathFilter::new(&config.ignore_patterns)?;

        fs::create_dir_all(&metadata_dir)?;
        let store = ObjectStore::init(metadata_dir.join("objects"), config.hash_algorithm)?;
        fs::create_dir_all(metadata_dir.join("refs").join("tags"))?;
        fs::create_dir_all(metadata_dir.join("refs").join("heads"))?;

        let metadata = RepositoryMetadata {
            format_version: FORMAT_VERSION,
            ugit_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            config: config.clone(),
        };
        fs::write(
            metadata_dir.join("metadata.json"),
            serde_json::to_string_pretty(&metadata)?,
        )?;

        info!("Initialized empty ugit repository in {:?}", metadata_dir);

        Ok(Self {
            refs: RefStore::new(metadata_dir.clone()),
            root,
            metadata_dir,
            store,
            filter,
            config,
        })
    }

    /// Open an existing repository
    ///
    /// A metadata directory without `metadata.json` is opened with the
    /// default configuration.
    ///
    /// # Errors
    ///
    /// - [`UgitError::StorageNotInitialized`] if `<root>/.ugit` is missing
    /// - [`UgitError::Json`] if `metadata.json` cannot be parsed
    #[instrument]
    pub fn open(root: PathBuf) -> Result<Self> {
        let metadata_dir = metadata_dir(&root);
        if !metadata_dir.is_dir() {
            return Err(UgitError::StorageNotInitialized(root));
        }

        let metadata_path = metadata_dir.join("metadata.json");
        let config = if metadata_path.exists() {
            let metadata: RepositoryMetadata =
                serde_json::from_str(&fs::read_to_string(&metadata_path)?)?;
            metadata.config
        } else {
            debug!("No metadata.json in {:?}, using defaults", metadata_dir);
            RepositoryConfig::default()
        };

        let filter = PathFilter::new(&config.ignore_patterns)?;
        let store = ObjectStore::open(metadata_dir.join("objects"), config.hash_algorithm);

        info!("Opened repository at {:?}", root);

        Ok(Self {
            refs: RefStore::new(metadata_dir.clone()),
            root,
            metadata_dir,
            store,
            filter,
            config,
        })
    }

    /// Working root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Metadata directory (`<root>/.ugit`)
    pub fn metadata_dir(&self) -> &Path {
        &self.metadata_dir
    }

    /// Active configuration
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Underlying object store
    pub fn object_store(&self) -> &ObjectStore {
        &self.store
    }

    /// Underlying reference store
    pub fn ref_store(&self) -> &RefStore {
        &self.refs
    }

    /// Store raw bytes as a blob
    pub fn put_blob(&self, content: &[u8]) -> Result<String> {
        self.store.put(content, ObjectType::Blob)
    }

    /// Read an object's payload, optionally checking its type
    pub fn get_object(&self, hash: &str, expected: ExpectedType) -> Result<Vec<u8>> {
        self.store.get(hash, expected)
    }

    /// Snapshot a directory and return its tree hash
    ///
    /// Relative paths are taken relative to the working root.
    #[instrument(skip(self))]
    pub fn write_tree(&self, dir: &Path) -> Result<String> {
        let dir = self.absolute(dir);
        self.tree_codec().write_tree(&dir)
    }

    /// Expand a tree into a flat map from relative path to blob hash
    pub fn read_tree(&self, hash: &str) -> Result<BTreeMap<PathBuf, String>> {
        self.tree_codec().read_tree(hash)
    }

    /// Decode one level of a tree
    pub fn list_tree(&self, hash: &str) -> Result<Vec<TreeEntry>> {
        self.tree_codec().entries(hash)
    }

    /// Replace the working directory with the tree `hash`
    ///
    /// `HEAD` is not touched. Not transactional, see [`crate::checkout`].
    #[instrument(skip(self))]
    pub fn checkout_tree(&self, hash: &str) -> Result<CheckoutResult> {
        checkout::restore_tree(&self.store, &self.filter, hash, &self.root)
    }

    /// Materialize the tree `hash` into another directory
    #[instrument(skip(self))]
    pub fn restore_tree_to(&self, hash: &str, target: &Path) -> Result<CheckoutResult> {
        checkout::restore_tree(&self.store, &self.filter, hash, target)
    }

    /// Snapshot the working root and record it as a commit on top of `HEAD`
    ///
    /// Returns the new commit hash, which `HEAD` then points at.
    #[instrument(skip(self))]
    pub fn commit(&self, message: &str) -> Result<String> {
        let tree = self.tree_codec().write_tree(&self.root)?;
        let head = self.refs.head()?;
        let parent = if head.is_empty() { None } else { Some(head) };

        let record = CommitRecord::new(tree, parent, message);
        let hash = self.store.put(&record.encode(), ObjectType::Commit)?;
        self.refs.set_ref(HEAD_REF, &hash)?;

        info!(
            "Created commit {} (tree {}, parent {:?})",
            hash, record.tree, record.parent
        );
        Ok(hash)
    }

    /// Load and decode a commit
    pub fn get_commit(&self, hash: &str) -> Result<CommitRecord> {
        self.walker().get_commit(hash)
    }

    /// Restore the commit's tree into the working root and move `HEAD` to it
    #[instrument(skip(self))]
    pub fn checkout(&self, hash: &str) -> Result<CheckoutResult> {
        let commit = self.get_commit(hash)?;
        let result = checkout::restore_tree(&self.store, &self.filter, &commit.tree, &self.root)?;
        self.refs.set_ref(HEAD_REF, hash)?;
        info!("HEAD is now at {}", hash);
        Ok(result)
    }

    /// All commits reachable from `starts`, each once
    pub fn history_from<I, S>(&self, starts: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.walker().history_from(starts)
    }

    /// History from `start` with decoded commits
    pub fn log(&self, start: &str) -> Result<Vec<(String, CommitRecord)>> {
        self.walker().log(start)
    }

    /// Resolve a reference name or literal hash
    pub fn resolve(&self, name: &str) -> Result<String> {
        NameResolver::new(&self.refs, self.config.hash_algorithm).resolve(name)
    }

    /// Current value of `HEAD`, empty if unset
    pub fn head(&self) -> Result<String> {
        self.refs.head()
    }

    /// Point `refs/tags/<name>` at `hash`
    #[instrument(skip(self))]
    pub fn create_tag(&self, name: &str, hash: &str) -> Result<()> {
        self.refs.create_tag(name, hash)
    }

    /// Point `refs/heads/<name>` at `hash`
    #[instrument(skip(self))]
    pub fn create_branch(&self, name: &str, hash: &str) -> Result<()> {
        self.refs.create_branch(name, hash)
    }

    /// `HEAD` plus every tag and branch
    pub fn all_refs(&self) -> Result<Vec<RefEntry>> {
        self.refs.all_refs()
    }

    /// Check every stored object and reference
    #[instrument(skip(self))]
    pub fn verify(&self) -> Result<VerificationReport> {
        ObjectVerifier::new(&self.store, &self.refs).verify_all()
    }

    /// Object store statistics
    pub fn stats(&self) -> Result<StoreStats> {
        self.store.stats()
    }

    fn tree_codec(&self) -> TreeCodec<'_> {
        TreeCodec::new(&self.store, &self.filter, &self.root)
            .with_follow_symlinks(self.config.follow_symlinks)
            .with_max_depth(self.config.max_depth)
    }

    fn walker(&self) -> HistoryWalker<'_> {
        HistoryWalker::new(&self.store)
    }

    fn absolute(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        }
    }
}

/// Builder for configuring and creating a [`Repository`]
///
/// # Examples
///
/// ```rust,no_run
/// use ugit::{HashAlgorithm, RepositoryBuilder};
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = RepositoryBuilder::new()
///     .hash_algorithm(HashAlgorithm::Sha256)
///     .ignore_patterns(vec!["*.log".to_string(), "target/".to_string()])
///     .build(PathBuf::from("./my_project"))?;
/// # Ok(())
/// # }
/// ```
///
/// # Default Values
///
/// - `hash_algorithm`: `HashAlgorithm::Sha1`
/// - `ignore_patterns`: empty (`.ugit` is always excluded)
/// - `follow_symlinks`: false
/// - `max_depth`: 256
#[derive(Debug, Default)]
pub struct RepositoryBuilder {
    config: RepositoryConfig,
}

impl RepositoryBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the digest used for content addressing
    pub fn hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.config.hash_algorithm = algorithm;
        self
    }

    /// Set glob patterns excluded from snapshots and preserved by checkout
    ///
    /// A trailing `/` matches a directory and everything below it.
    pub fn ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.ignore_patterns = patterns;
        self
    }

    /// Set whether symlinks are snapshotted through to their targets
    ///
    /// Following symlinks can pull in content from outside the working root,
    /// and symlink loops are only stopped by the depth limit.
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.follow_symlinks = follow;
        self
    }

    /// Set the maximum directory depth (minimum 1)
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth.max(1);
        self
    }

    /// Open the repository at `root`, initializing it if needed
    ///
    /// The configuration only applies when a new repository is created; an
    /// existing repository keeps its persisted configuration.
    pub fn build(self, root: PathBuf) -> Result<Repository> {
        if metadata_dir(&root).is_dir() {
            Repository::open(root)
        } else {
            Repository::init_with_config(root, self.config)
        }
    }
}
