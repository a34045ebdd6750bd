//! # ugit - A minimal content-addressed version control store
//!
//! Snapshots a working directory into immutable, hash-addressed objects,
//! records snapshots as a chain of commits, names them with references and
//! restores any of them back onto disk.
//!
//! ## Overview
//!
//! ugit keeps everything in a `.ugit` directory inside the tracked root:
//! - `objects/<hash>`: every blob, tree and commit, stored as `<type>\0<payload>`
//!   under the digest of that whole record
//! - `HEAD`, `refs/tags/*`, `refs/heads/*`: plain-text files holding a hash
//! - `metadata.json`: the repository configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ugit::{ExpectedType, Repository};
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = Repository::init(PathBuf::from("./my_project"))?;
//!
//! // Store loose content
//! let blob = repo.put_blob(b"hello")?;
//! assert_eq!(repo.get_object(&blob, ExpectedType::Any)?, b"hello");
//!
//! // Snapshot the directory twice
//! let first = repo.commit("Initial state")?;
//! let second = repo.commit("Added new feature")?;
//! repo.create_tag("v1", &first)?;
//!
//! // Walk history and go back
//! for (hash, commit) in repo.log(&second)? {
//!     println!("{} {}", hash, commit.message);
//! }
//! let result = repo.checkout(&repo.resolve("v1")?)?;
//! println!("Restored {} files", result.files_written);
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Configuration
//!
//! ```rust,no_run
//! use ugit::{HashAlgorithm, RepositoryBuilder};
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = RepositoryBuilder::new()
//!     .hash_algorithm(HashAlgorithm::Sha256)
//!     .ignore_patterns(vec!["*.tmp".to_string(), "target/".to_string()])
//!     .follow_symlinks(false)
//!     .build(PathBuf::from("./project"))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Concepts
//!
//! ### Objects
//!
//! Objects are immutable and deduplicated: storing identical content twice
//! yields the same hash and a single file. Trees list their children as
//! `type hash name` lines sorted by line text, so the same directory content
//! always produces the same tree hash regardless of timestamps or traversal
//! order.
//!
//! ### Commits and History
//!
//! A commit names a tree, at most one parent commit and a message. History is
//! therefore a forest of single-parent chains; [`Repository::history_from`]
//! walks any number of them and emits each commit once.
//!
//! ### References
//!
//! `HEAD` tracks the current commit. Tags and branches are just files under
//! `refs/`. Names are resolved by trying `name`, `refs/name`,
//! `refs/tags/name` and `refs/heads/name` before accepting a literal hash.
//!
//! ## Error Handling
//!
//! All operations return `Result<T, UgitError>`. Missing objects, type
//! mismatches, malformed records, unresolvable names and cyclic history each
//! have their own variant; see [`error`].
//!
//! ## Module Organization
//!
//! - [`object_store`]: content-addressed object storage
//! - [`refs`]: reference storage
//! - [`tree`]: directory snapshot codec
//! - [`commit`]: commit record codec
//! - [`history`]: history traversal
//! - [`resolver`]: name resolution
//! - [`checkout`]: working directory restoration
//! - [`filter`]: ignore patterns
//! - [`verification`]: integrity checking
//! - [`repository`]: the repository context tying these together
//! - [`types`]: common types and data structures
//! - [`error`]: error types and handling

// Public API modules
pub mod checkout;
pub mod commit;
pub mod error;
pub mod filter;
pub mod history;
pub mod object_store;
pub mod refs;
pub mod repository;
pub mod resolver;
pub mod tree;
pub mod types;
pub mod verification;

// Internal modules (not part of public API)
mod collections;
mod utils;

// Re-export main types for convenience
pub use commit::CommitRecord;
pub use error::{Result, UgitError};
pub use filter::PathFilter;
pub use history::HistoryWalker;
pub use object_store::ObjectStore;
pub use refs::RefStore;
pub use repository::{Repository, RepositoryBuilder};
pub use resolver::NameResolver;
pub use tree::{TreeCodec, TreeEntry};
pub use types::*;
pub use verification::{ObjectVerifier, VerificationIssue, VerificationReport};
