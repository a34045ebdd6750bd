//! Path filtering for snapshots and checkout
//!
//! Decides which paths under the working root belong to the repository's
//! content. The metadata directory is always excluded; user supplied glob
//! patterns (relative to the working root, `/` separated) exclude more.

use crate::error::Result;
use crate::types::METADATA_DIR;
use crate::utils;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use tracing::trace;

/// Matcher for paths excluded from snapshots
#[derive(Debug, Clone)]
pub struct PathFilter {
    patterns: GlobSet,
    pattern_count: usize,
}

impl PathFilter {
    /// Build a filter from glob patterns
    ///
    /// A pattern ending in `/` matches a directory and everything below it.
    ///
    /// # Errors
    ///
    /// - [`crate::UgitError::InvalidPattern`] if a pattern does not parse
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            match pattern.strip_suffix('/') {
                Some(dir) => {
                    builder.add(Glob::new(dir)?);
                    builder.add(Glob::new(&format!("{}/**", dir))?);
                }
                None => {
                    builder.add(Glob::new(pattern)?);
                }
            }
        }

        Ok(Self {
            patterns: builder.build()?,
            pattern_count: patterns.len(),
        })
    }

    /// Filter that only excludes the metadata directory
    pub fn metadata_only() -> Self {
        Self {
            patterns: GlobSet::empty(),
            pattern_count: 0,
        }
    }

    /// Whether a path relative to the working root is excluded
    pub fn is_excluded(&self, relative: &Path) -> bool {
        if relative
            .components()
            .any(|component| component.as_os_str() == METADATA_DIR)
        {
            return true;
        }

        if self.pattern_count == 0 {
            return false;
        }

        // Non UTF-8 paths cannot match a textual pattern.
        match utils::to_slash_string(relative) {
            Ok(slashed) => {
                let excluded = self.patterns.is_match(&slashed);
                if excluded {
                    trace!("Path {:?} excluded by ignore pattern", relative);
                }
                excluded
            }
            Err(_) => false,
        }
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::metadata_only()
    }
}
