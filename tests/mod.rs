//! Main test module for ugit
//!
//! This module includes all test suites:
//! - Integration tests for end-to-end repository scenarios
//! - Property-based tests for content addressing and tree invariants
//! - Edge cases for unusual names and layouts

pub mod integration;

#[cfg(test)]
mod edge_cases {
    use ::ugit::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path().to_path_buf()).unwrap();

        // Commit of an empty directory
        let commit = repo.commit("Empty").unwrap();
        let tree = repo.get_commit(&commit).unwrap().tree;
        assert!(repo.list_tree(&tree).unwrap().is_empty());
        assert_eq!(repo.get_object(&tree, ExpectedType::Exactly(ObjectType::Tree)).unwrap(), b"");

        fs::write(temp_dir.path().join("file.txt"), "content").unwrap();

        // Checkout should remove the file
        repo.checkout(&commit).unwrap();
        assert!(!temp_dir.path().join("file.txt").exists());
        assert!(temp_dir.path().join(".ugit").join("HEAD").exists());
    }

    #[test]
    fn test_special_filenames() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path().to_path_buf()).unwrap();

        let special_names = vec![
            "file with spaces.txt",
            "file-with-dashes.txt",
            "file_with_underscores.txt",
            "file.with.dots.txt",
            "file@with#special$chars.txt",
            "file(with)parens.txt",
            "file[with]brackets.txt",
            "  leading and trailing  ",
        ];

        let mut written = Vec::new();
        for name in &special_names {
            let path = temp_dir.path().join(name);
            if fs::write(&path, format!("Content of {}", name)).is_err() {
                // Skip if OS doesn't support this filename
                continue;
            }
            written.push(*name);
        }

        let commit = repo.commit("Special names").unwrap();
        let tree = repo.get_commit(&commit).unwrap().tree;
        let names: Vec<_> = repo
            .list_tree(&tree)
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        for name in &written {
            assert!(names.iter().any(|n| n == name), "missing {:?}", name);
        }

        // Delete all files and restore
        for name in &written {
            fs::remove_file(temp_dir.path().join(name)).unwrap();
        }
        repo.checkout(&commit).unwrap();

        for name in &written {
            let content = fs::read_to_string(temp_dir.path().join(name)).unwrap();
            assert_eq!(content, format!("Content of {}", name));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_newline_in_filename_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path().to_path_buf()).unwrap();
        fs::write(temp_dir.path().join("bad\nname"), "x").unwrap();

        assert!(matches!(
            repo.commit("bad"),
            Err(UgitError::UnsupportedFileName(_))
        ));
        assert_eq!(repo.head().unwrap(), "");
    }

    #[test]
    fn test_empty_file_and_binary_content() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path().to_path_buf()).unwrap();

        let binary: Vec<u8> = (0..=255u8).chain([0, 0, b'\n', 0]).collect();
        fs::write(temp_dir.path().join("empty"), b"").unwrap();
        fs::write(temp_dir.path().join("binary.bin"), &binary).unwrap();

        let commit = repo.commit("bytes").unwrap();
        fs::remove_file(temp_dir.path().join("empty")).unwrap();
        fs::write(temp_dir.path().join("binary.bin"), b"changed").unwrap();

        repo.checkout(&commit).unwrap();
        assert_eq!(fs::read(temp_dir.path().join("empty")).unwrap(), b"");
        assert_eq!(fs::read(temp_dir.path().join("binary.bin")).unwrap(), binary);
    }

    #[test]
    fn test_deeply_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path().to_path_buf()).unwrap();

        let mut path = temp_dir.path().to_path_buf();
        for i in 0..40 {
            path = path.join(format!("level_{}", i));
        }
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("deep.txt"), "deep").unwrap();

        let commit = repo.commit("deep").unwrap();
        fs::remove_dir_all(temp_dir.path().join("level_0")).unwrap();

        repo.checkout(&commit).unwrap();
        assert_eq!(fs::read_to_string(path.join("deep.txt")).unwrap(), "deep");
    }

    #[test]
    fn test_depth_limit_enforced() {
        let temp_dir = TempDir::new().unwrap();
        let repo = RepositoryBuilder::new()
            .max_depth(3)
            .build(temp_dir.path().to_path_buf())
            .unwrap();

        fs::create_dir_all(temp_dir.path().join("a").join("b").join("c")).unwrap();
        assert!(matches!(
            repo.commit("too deep"),
            Err(UgitError::DepthLimitExceeded { limit: 3, .. })
        ));
    }

    #[test]
    fn test_message_preserved_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path().to_path_buf()).unwrap();

        let message = "subject line\n\nbody with\nparent fake\ntree fake\n";
        let commit = repo.commit(message).unwrap();
        assert_eq!(repo.get_commit(&commit).unwrap().message, message);

        let empty = repo.commit("").unwrap();
        let record = repo.get_commit(&empty).unwrap();
        assert_eq!(record.message, "");
        assert_eq!(record.parent.as_deref(), Some(commit.as_str()));
    }

    #[test]
    fn test_unresolvable_names() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path().to_path_buf()).unwrap();

        // HEAD is unset, so neither @ nor HEAD resolve
        assert!(matches!(repo.resolve("@"), Err(UgitError::InvalidName(_))));
        assert!(matches!(repo.resolve("HEAD"), Err(UgitError::InvalidName(_))));
        assert!(matches!(repo.resolve("no-such-tag"), Err(UgitError::InvalidName(_))));
    }

    #[test]
    fn test_checkout_of_non_commit_fails_cleanly() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path().to_path_buf()).unwrap();
        fs::write(temp_dir.path().join("keep.txt"), "keep").unwrap();

        let blob = repo.put_blob(b"not a commit").unwrap();
        assert!(matches!(
            repo.checkout(&blob),
            Err(UgitError::TypeMismatch { .. })
        ));
        assert!(temp_dir.path().join("keep.txt").exists());
        assert_eq!(repo.head().unwrap(), "");
    }
}
