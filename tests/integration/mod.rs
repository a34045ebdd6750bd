//! Integration tests for ugit
//!
//! Tests realistic repository scenarios: commit chains, branching history,
//! name resolution, snapshots of generated projects and checkout round trips.

use ::ugit::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;
use walkdir::WalkDir;

/// Test harness owning a repository in a temporary directory
pub struct UgitTestHarness {
    pub temp_dir: TempDir,
    pub repo: Repository,
    pub rng: StdRng,
}

impl UgitTestHarness {
    /// Create a new harness with a default repository
    pub fn new() -> Self {
        Self::with_builder(RepositoryBuilder::new())
    }

    /// Create a new harness from a configured builder
    pub fn with_builder(builder: RepositoryBuilder) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let repo = builder.build(temp_dir.path().to_path_buf()).unwrap();
        Self {
            temp_dir,
            repo,
            rng: StdRng::seed_from_u64(42),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a file relative to the root, creating parent directories
    pub fn write(&self, relative: &str, content: impl AsRef<[u8]>) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Generate a random project of nested directories
    pub fn generate_project(
        &mut self,
        depth: usize,
        dirs_per_level: usize,
        files_per_dir: usize,
    ) -> anyhow::Result<()> {
        for dir_depth in 1..=depth {
            for dir_idx in 0..dirs_per_level {
                let mut path = PathBuf::new();
                for level in 0..dir_depth {
                    path = path.join(format!("dir_{}_{}", level, dir_idx));
                }
                for file_idx in 0..files_per_dir {
                    let relative = path.join(format!("file_{}.txt", file_idx));
                    let content = self.random_content();
                    let path = self.root().join(relative);
                    fs::create_dir_all(path.parent().unwrap_or(self.root()))?;
                    fs::write(path, content)?;
                }
            }
        }
        Ok(())
    }

    /// Modify, delete or add random files
    pub fn mutate(&mut self, mutations: usize, round: usize) -> anyhow::Result<()> {
        for mutation_idx in 0..mutations {
            let files = snapshot_directory(self.root())?;
            let kind = if files.is_empty() { 2 } else { self.rng.random_range(0..3) };
            match kind {
                0 => {
                    let idx = self.rng.random_range(0..files.len());
                    let path = files.keys().nth(idx).unwrap().clone();
                    let content = self.random_content();
                    fs::write(self.root().join(path), content)?;
                }
                1 => {
                    let idx = self.rng.random_range(0..files.len());
                    let path = files.keys().nth(idx).unwrap().clone();
                    fs::remove_file(self.root().join(path))?;
                }
                _ => {
                    let content = self.random_content();
                    fs::write(
                        self.root().join(format!("mutated_{}_{}.txt", round, mutation_idx)),
                        content,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn random_content(&mut self) -> Vec<u8> {
        let len = self.rng.random_range(0..512);
        (0..len).map(|_| self.rng.random()).collect()
    }
}

/// Every file under `root` (excluding `.ugit`) with its content
pub fn snapshot_directory(root: &Path) -> anyhow::Result<BTreeMap<PathBuf, Vec<u8>>> {
    let mut files = BTreeMap::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".ugit")
    {
        let entry = entry?;
        if entry.file_type().is_file() {
            let relative = entry.path().strip_prefix(root)?.to_path_buf();
            files.insert(relative, fs::read(entry.path())?);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tracing_test::traced_test;

    #[test]
    fn test_commit_chain_history() {
        let harness = UgitTestHarness::new();
        let repo = &harness.repo;

        harness.write("a.txt", "1");
        let c1 = repo.commit("c1").unwrap();
        harness.write("a.txt", "2");
        let c2 = repo.commit("c2").unwrap();
        harness.write("b.txt", "3");
        let c3 = repo.commit("c3").unwrap();

        assert_eq!(repo.head().unwrap(), c3);
        assert_eq!(
            repo.history_from([&c3]).unwrap(),
            vec![c3.clone(), c2.clone(), c1.clone()]
        );

        let log = repo.log(&c3).unwrap();
        let messages: Vec<_> = log.iter().map(|(_, c)| c.message.as_str()).collect();
        assert_eq!(messages, vec!["c3", "c2", "c1"]);
        assert!(log.last().unwrap().1.is_root());
    }

    #[test]
    fn test_branching_history_dedup() {
        let harness = UgitTestHarness::new();
        let repo = &harness.repo;

        harness.write("base.txt", "base");
        let base = repo.commit("base").unwrap();
        harness.write("main.txt", "main");
        let main_tip = repo.commit("main").unwrap();
        repo.create_branch("main", &main_tip).unwrap();

        repo.checkout(&base).unwrap();
        harness.write("feature.txt", "feature");
        let feature_tip = repo.commit("feature").unwrap();
        repo.create_branch("feature", &feature_tip).unwrap();

        let starts: Vec<String> = repo
            .all_refs()
            .unwrap()
            .into_iter()
            .map(|r| r.hash)
            .collect();
        let history = repo.history_from(&starts).unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().filter(|h| **h == base).count(), 1);
        assert!(history.contains(&main_tip));
        assert!(history.contains(&feature_tip));
    }

    #[test]
    fn test_refs_listing_and_overwrite() {
        let harness = UgitTestHarness::new();
        let repo = &harness.repo;

        harness.write("f", "1");
        let c1 = repo.commit("one").unwrap();
        harness.write("f", "2");
        let c2 = repo.commit("two").unwrap();

        repo.create_tag("release", &c1).unwrap();
        repo.create_branch("dev", &c2).unwrap();

        let refs = repo.all_refs().unwrap();
        assert_eq!(refs[0].name, "HEAD");
        assert_eq!(refs[0].hash, c2);
        assert!(refs.iter().any(|r| r.name == "refs/tags/release" && r.hash == c1));
        assert!(refs.iter().any(|r| r.name == "refs/heads/dev" && r.hash == c2));

        // Tags move when created again
        repo.create_tag("release", &c2).unwrap();
        assert_eq!(repo.resolve("release").unwrap(), c2);
    }

    #[test]
    fn test_resolution_precedence() {
        let harness = UgitTestHarness::new();
        let repo = &harness.repo;

        harness.write("f", "content");
        let c1 = repo.commit("one").unwrap();
        harness.write("f", "changed");
        let c2 = repo.commit("two").unwrap();

        // A literal hash resolves to itself
        assert_eq!(repo.resolve(&c1).unwrap(), c1);

        // A tag spelled like c1 shadows the object c1
        repo.create_tag(&c1, &c2).unwrap();
        assert_eq!(repo.resolve(&c1).unwrap(), c2);

        // One character short is neither a ref nor a hash
        assert!(matches!(
            repo.resolve(&c2[..39]),
            Err(UgitError::InvalidName(_))
        ));
        assert_eq!(repo.resolve("@").unwrap(), c2);
    }

    #[test]
    fn test_tree_hash_ignores_timestamps() {
        let harness = UgitTestHarness::new();
        harness.write("src/lib.rs", "pub fn f() {}");
        harness.write("README.md", "# readme");

        let first = harness.repo.write_tree(Path::new(".")).unwrap();

        for relative in ["src/lib.rs", "README.md"] {
            let path = harness.root().join(relative);
            filetime::set_file_mtime(&path, FileTime::from_unix_time(1_000_000, 0)).unwrap();
        }
        let second = harness.repo.write_tree(Path::new(".")).unwrap();
        assert_eq!(first, second);

        // Same content written in the opposite order elsewhere
        let other = UgitTestHarness::new();
        other.write("README.md", "# readme");
        other.write("src/lib.rs", "pub fn f() {}");
        assert_eq!(other.repo.write_tree(Path::new(".")).unwrap(), first);
    }

    #[test]
    fn test_ignored_files_survive_checkout() {
        let harness = UgitTestHarness::with_builder(
            RepositoryBuilder::new().ignore_patterns(vec!["*.log".to_string(), "target/".to_string()]),
        );
        let repo = &harness.repo;

        harness.write("src/main.rs", "fn main() {}");
        harness.write("app.log", "log line");
        harness.write("target/debug/app", "binary");
        let commit = repo.commit("tracked").unwrap();

        let tree = repo.get_commit(&commit).unwrap().tree;
        let files = repo.read_tree(&tree).unwrap();
        assert_eq!(files.keys().collect::<Vec<_>>(), vec![&PathBuf::from("src/main.rs")]);

        harness.write("src/extra.rs", "extra");
        harness.write("app.log", "newer log line");
        repo.checkout(&commit).unwrap();

        assert!(!harness.root().join("src/extra.rs").exists());
        assert_eq!(fs::read_to_string(harness.root().join("app.log")).unwrap(), "newer log line");
        assert!(harness.root().join("target/debug/app").exists());
    }

    #[test]
    fn test_sha256_repository() {
        let harness = UgitTestHarness::with_builder(
            RepositoryBuilder::new().hash_algorithm(HashAlgorithm::Sha256),
        );
        let repo = &harness.repo;

        harness.write("f", "content");
        let commit = repo.commit("sha256").unwrap();
        assert_eq!(commit.len(), 64);
        assert_eq!(repo.resolve(&commit).unwrap(), commit);
        assert!(repo.resolve(&commit[..40]).is_err());
        assert!(repo.verify().unwrap().is_valid());
    }

    #[test]
    fn test_restore_into_other_directory() {
        let harness = UgitTestHarness::new();
        harness.write("a/b/c.txt", "nested");
        let commit = harness.repo.commit("nested").unwrap();
        let tree = harness.repo.get_commit(&commit).unwrap().tree;

        let target = TempDir::new().unwrap();
        let result = harness.repo.restore_tree_to(&tree, target.path()).unwrap();
        assert_eq!(result.files_written, 1);
        assert_eq!(
            fs::read_to_string(target.path().join("a/b/c.txt")).unwrap(),
            "nested"
        );
    }

    #[test]
    #[traced_test]
    fn test_checkout_is_logged() {
        let harness = UgitTestHarness::new();
        harness.write("f", "1");
        let commit = harness.repo.commit("logged").unwrap();
        harness.repo.checkout(&commit).unwrap();

        assert!(logs_contain("Created commit"));
        assert!(logs_contain("HEAD is now at"));
    }

    #[test]
    #[traced_test]
    fn test_random_navigation() {
        let mut harness = UgitTestHarness::new();
        harness.generate_project(2, 3, 4).unwrap();

        let mut commits = Vec::new();
        for round in 0..8 {
            harness.mutate(6, round).unwrap();
            let commit = harness.repo.commit(&format!("Round {}", round)).unwrap();
            commits.push((commit, snapshot_directory(harness.root()).unwrap()));
        }

        let mut rng = StdRng::seed_from_u64(123);
        for _ in 0..15 {
            let idx = rng.random_range(0..commits.len());
            let (commit, expected) = &commits[idx];
            info!("Navigating to commit {} ({})", idx, commit);

            harness.repo.checkout(commit).unwrap();
            assert_eq!(&snapshot_directory(harness.root()).unwrap(), expected);
            assert_eq!(&harness.repo.head().unwrap(), commit);
        }

        let tip = &commits.last().unwrap().0;
        assert_eq!(harness.repo.history_from([tip]).unwrap().len(), commits.len());
        assert!(harness.repo.verify().unwrap().is_valid());
    }
}
