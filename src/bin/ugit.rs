//! # ugit CLI
//!
//! Command-line interface for the ugit object store.
//!
//! ## Usage
//! ```bash
//! # Initialize a repository in the current directory
//! ugit init
//!
//! # Snapshot and record the working directory
//! ugit commit -m "Initial state"
//!
//! # Name it and look at history
//! ugit tag v1
//! ugit log
//!
//! # Go back
//! ugit checkout v1
//!
//! # Render refs and commits as a Graphviz graph
//! ugit k | dot -Tpng -o history.png
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use humantime::format_duration;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use ugit::{
    ExpectedType, HashAlgorithm, Repository, RepositoryConfig, Result, UgitError, HEAD_REF,
};

/// ugit - a minimal content-addressed version control store
#[derive(Parser)]
#[command(name = "ugit")]
#[command(version)]
#[command(about = "Snapshot, name and restore directory states")]
#[command(long_about = None)]
struct Cli {
    /// Path to the working directory (defaults to current)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty repository
    Init {
        /// Digest used to address objects
        #[arg(long, value_enum, default_value = "sha1")]
        hash: HashMode,

        /// Ignore patterns (glob syntax, trailing `/` for directories)
        #[arg(short, long)]
        ignore: Vec<String>,

        /// Snapshot symlink targets instead of skipping symlinks
        #[arg(long)]
        follow_symlinks: bool,
    },

    /// Store a file as a blob and print its hash
    HashObject {
        /// File to store
        file: PathBuf,
    },

    /// Print the payload of an object
    CatFile {
        /// Object name or hash
        object: String,
    },

    /// Snapshot a directory and print the tree hash
    WriteTree {
        /// Directory to snapshot, relative to the working directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// List one level of a tree
    LsTree {
        /// Tree name or hash
        tree: String,
    },

    /// Replace the working directory with a tree
    ReadTree {
        /// Tree name or hash
        tree: String,
    },

    /// Record the working directory as a new commit
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,
    },

    /// Show commit history
    Log {
        /// Commit to start from (defaults to HEAD)
        #[arg(long)]
        oid: Option<String>,
    },

    /// Restore a commit and move HEAD to it
    Checkout {
        /// Commit name or hash
        commit: String,
    },

    /// Create or move a tag
    Tag {
        /// Tag name
        name: String,

        /// Object to tag (defaults to HEAD)
        oid: Option<String>,
    },

    /// Create or move a branch
    Branch {
        /// Branch name
        name: String,

        /// Commit to point at (defaults to HEAD)
        oid: Option<String>,
    },

    /// Print references and commits as a Graphviz graph
    K,

    /// Verify object and reference integrity
    Verify,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum HashMode {
    Sha1,
    Sha256,
}

impl From<HashMode> for HashAlgorithm {
    fn from(mode: HashMode) -> Self {
        match mode {
            HashMode::Sha1 => HashAlgorithm::Sha1,
            HashMode::Sha256 => HashAlgorithm::Sha256,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Disable colors if needed
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e.user_message());
        std::process::exit(1);
    }
}

/// Main command runner
fn run(cli: Cli) -> Result<()> {
    let root_path = cli.path.unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Init { hash, ignore, follow_symlinks } => {
            cmd_init(root_path, hash, ignore, follow_symlinks)
        }
        Commands::HashObject { file } => cmd_hash_object(root_path, file),
        Commands::CatFile { object } => cmd_cat_file(root_path, &object),
        Commands::WriteTree { dir } => cmd_write_tree(root_path, dir),
        Commands::LsTree { tree } => cmd_ls_tree(root_path, &tree),
        Commands::ReadTree { tree } => cmd_read_tree(root_path, &tree),
        Commands::Commit { message } => cmd_commit(root_path, &message),
        Commands::Log { oid } => cmd_log(root_path, oid),
        Commands::Checkout { commit } => cmd_checkout(root_path, &commit),
        Commands::Tag { name, oid } => cmd_tag(root_path, &name, oid, false),
        Commands::Branch { name, oid } => cmd_tag(root_path, &name, oid, true),
        Commands::K => cmd_k(root_path),
        Commands::Verify => cmd_verify(root_path),
    }
}

fn cmd_init(
    root_path: PathBuf,
    hash: HashMode,
    ignore: Vec<String>,
    follow_symlinks: bool,
) -> Result<()> {
    let root_path = std::fs::canonicalize(&root_path)?;
    let config = RepositoryConfig {
        hash_algorithm: hash.into(),
        ignore_patterns: ignore,
        follow_symlinks,
        ..Default::default()
    };
    let repo = Repository::init_with_config(root_path, config)?;

    println!(
        "Initialized empty ugit repository in {}",
        repo.metadata_dir().display().to_string().cyan()
    );
    Ok(())
}

fn cmd_hash_object(root_path: PathBuf, file: PathBuf) -> Result<()> {
    let repo = Repository::open(root_path)?;
    let content = std::fs::read(&file)?;
    println!("{}", repo.put_blob(&content)?);
    Ok(())
}

fn cmd_cat_file(root_path: PathBuf, object: &str) -> Result<()> {
    let repo = Repository::open(root_path)?;
    let hash = repo.resolve(object)?;
    let payload = repo.get_object(&hash, ExpectedType::Any)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&payload)?;
    stdout.flush()?;
    Ok(())
}

fn cmd_write_tree(root_path: PathBuf, dir: PathBuf) -> Result<()> {
    let repo = Repository::open(root_path)?;
    println!("{}", repo.write_tree(&dir)?);
    Ok(())
}

fn cmd_ls_tree(root_path: PathBuf, tree: &str) -> Result<()> {
    let repo = Repository::open(root_path)?;
    let hash = repo.resolve(tree)?;
    for entry in repo.list_tree(&hash)? {
        println!("{}", entry);
    }
    Ok(())
}

fn cmd_read_tree(root_path: PathBuf, tree: &str) -> Result<()> {
    let repo = Repository::open(root_path)?;
    let hash = repo.resolve(tree)?;
    let result = repo.checkout_tree(&hash)?;
    println!(
        "{} Restored {} files",
        "✓".green().bold(),
        result.files_written
    );
    Ok(())
}

fn cmd_commit(root_path: PathBuf, message: &str) -> Result<()> {
    if message.is_empty() {
        return Err(UgitError::internal("the commit message is required"));
    }

    let repo = Repository::open(root_path)?;
    println!("{}", repo.commit(message)?);
    Ok(())
}

fn cmd_log(root_path: PathBuf, oid: Option<String>) -> Result<()> {
    let repo = Repository::open(root_path)?;
    let start = match oid {
        Some(name) => repo.resolve(&name)?,
        None => repo.head()?,
    };
    if start.is_empty() {
        return Ok(());
    }

    for (hash, commit) in repo.log(&start)? {
        println!("{} {}", "commit".yellow(), hash.yellow());
        println!("{}\n", commit.message);
    }
    Ok(())
}

fn cmd_checkout(root_path: PathBuf, commit: &str) -> Result<()> {
    let repo = Repository::open(root_path)?;
    let hash = repo.resolve(commit)?;
    let result = repo.checkout(&hash)?;

    println!("{} HEAD is now at {}", "✓".green().bold(), hash.cyan());
    println!("  Files written: {}", result.files_written);
    println!("  Entries removed: {}", result.entries_removed);
    println!(
        "  Time: {}",
        format_duration(Duration::from_millis(result.duration_ms)).to_string().cyan()
    );
    Ok(())
}

fn cmd_tag(root_path: PathBuf, name: &str, oid: Option<String>, branch: bool) -> Result<()> {
    let repo = Repository::open(root_path)?;
    let hash = match oid {
        Some(target) => repo.resolve(&target)?,
        None => repo.head()?,
    };
    if hash.is_empty() {
        return Err(UgitError::RefNotFound(HEAD_REF.to_string()));
    }

    if branch {
        repo.create_branch(name, &hash)?;
    } else {
        repo.create_tag(name, &hash)?;
    }
    Ok(())
}

fn cmd_k(root_path: PathBuf) -> Result<()> {
    let repo = Repository::open(root_path)?;
    let mut dot = String::from("digraph commits {\n");
    let mut starts = BTreeSet::new();

    for entry in repo.all_refs()? {
        if entry.hash.is_empty() {
            continue;
        }
        dot.push_str(&format!("\"{}\" [shape=note]\n", entry.name));
        dot.push_str(&format!("\"{}\" -> \"{}\"\n", entry.name, entry.hash));
        starts.insert(entry.hash);
    }

    for hash in repo.history_from(&starts)? {
        let commit = repo.get_commit(&hash)?;
        let label = &hash[..10.min(hash.len())];
        dot.push_str(&format!(
            "\"{}\" [shape=box style=filled label=\"{}\"]\n",
            hash, label
        ));
        if let Some(parent) = &commit.parent {
            dot.push_str(&format!("\"{}\" -> \"{}\"\n", hash, parent));
        }
    }

    dot.push('}');
    println!("{}", dot);
    Ok(())
}

fn cmd_verify(root_path: PathBuf) -> Result<()> {
    let repo = Repository::open(root_path)?;
    println!("{}", "Verifying repository...".blue().bold());

    let report = repo.verify()?;
    if report.is_valid() {
        println!("{} {}", "✓".green().bold(), report.summary());
        return Ok(());
    }

    for issue in &report.issues {
        println!("  {} {}", "✗".red(), issue);
    }
    Err(UgitError::internal(format!(
        "verification failed: {}",
        report.summary()
    )))
}
