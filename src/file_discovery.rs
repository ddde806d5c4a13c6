//! File Discovery & Security Guard
//!
//! Enumerates candidate JSONL log files under one or more root directories
//! and enforces three independent limits:
//!
//! - **Path containment**: caller-supplied roots must resolve (after tilde
//!   expansion and symlink resolution) inside an allow-list of trusted
//!   directories. A violation is reported as [`AccessError::PathTraversal`]
//!   and the caller falls back to the default roots; it is never fatal.
//! - **Per-file size cap**: oversized files are skipped and logged, never
//!   opened.
//! - **Cumulative memory budget**: a per-run counter of bytes read, owned
//!   by [`RunBudget`], bounds total memory for one refresh cycle.
//!
//! Discovery is recursive, skips hidden entries, and yields files in
//! filesystem-enumeration order; downstream ordering is by entry timestamp,
//! so discovery order does not affect correctness.

use crate::config::get_config;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Raised when a caller-supplied root fails containment validation.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("path escapes the allowed data directories: {0}")]
    PathTraversal(PathBuf),
    #[error("path is not a readable directory: {0}")]
    InvalidPath(PathBuf),
}

const LOG_EXTENSION: &str = "jsonl";

/// Per-run resource limits for one refresh cycle.
#[derive(Debug, Clone, Copy)]
pub struct ScanLimits {
    pub max_file_bytes: u64,
    pub max_total_bytes: u64,
}

impl ScanLimits {
    pub fn from_config() -> Self {
        let scan = &get_config().scan;
        Self {
            max_file_bytes: scan.max_file_mb * 1_000_000,
            max_total_bytes: scan.max_total_mb * 1_000_000,
        }
    }
}

/// Tracks bytes of file content read during one ingestion run.
///
/// Owned by the run context and discarded with it; never global state.
#[derive(Debug)]
pub struct RunBudget {
    limits: ScanLimits,
    consumed: u64,
}

impl RunBudget {
    pub fn new(limits: ScanLimits) -> Self {
        Self { limits, consumed: 0 }
    }

    /// Decide whether a file of `len` bytes may be read, charging the
    /// budget when it may. Skipped files are logged, not errors.
    pub fn admit(&mut self, path: &Path, len: u64) -> bool {
        if len > self.limits.max_file_bytes {
            warn!(
                file = %path.display(),
                size_mb = len / 1_000_000,
                cap_mb = self.limits.max_file_bytes / 1_000_000,
                "Skipping file over per-file size cap"
            );
            return false;
        }

        if self.consumed + len > self.limits.max_total_bytes {
            warn!(
                file = %path.display(),
                consumed_mb = self.consumed / 1_000_000,
                budget_mb = self.limits.max_total_bytes / 1_000_000,
                "Skipping file: cumulative memory budget exhausted"
            );
            return false;
        }

        self.consumed += len;
        true
    }

    pub fn consumed_bytes(&self) -> u64 {
        self.consumed
    }
}

/// Handles file system traversal and discovery of usage log files.
pub struct FileDiscovery {
    default_roots: Vec<PathBuf>,
    allowed_roots: Vec<PathBuf>,
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl FileDiscovery {
    pub fn new() -> Self {
        let paths = &get_config().paths;
        Self {
            default_roots: paths.data_roots.clone(),
            allowed_roots: paths.allowed_roots.clone(),
        }
    }

    /// Construct with an explicit allow-list and default roots.
    pub fn with_roots(default_roots: Vec<PathBuf>, allowed_roots: Vec<PathBuf>) -> Self {
        Self {
            default_roots,
            allowed_roots,
        }
    }

    pub fn default_roots(&self) -> &[PathBuf] {
        &self.default_roots
    }

    /// Validate a caller-supplied root against the allow-list.
    ///
    /// The raw path is tilde-expanded and symlink-resolved before the
    /// prefix check, so a symlink pointing outside the trusted directories
    /// does not pass.
    pub fn validate_root(&self, raw: &str) -> Result<PathBuf, AccessError> {
        let expanded = shellexpand::tilde(raw).into_owned();
        let resolved = fs::canonicalize(&expanded)
            .map_err(|_| AccessError::InvalidPath(PathBuf::from(&expanded)))?;

        if !resolved.is_dir() {
            return Err(AccessError::InvalidPath(resolved));
        }

        for allowed in &self.allowed_roots {
            let allowed = fs::canonicalize(allowed).unwrap_or_else(|_| allowed.clone());
            if resolved.starts_with(&allowed) {
                return Ok(resolved);
            }
        }

        Err(AccessError::PathTraversal(resolved))
    }

    /// Find all log files under the given roots, paired with the root they
    /// were found beneath (used for project-path derivation).
    pub fn find_log_files(&self, roots: &[PathBuf]) -> Vec<(PathBuf, PathBuf)> {
        let mut files = Vec::new();

        for root in roots {
            if !root.is_dir() {
                debug!(root = %root.display(), "Skipping missing data root");
                continue;
            }
            Self::walk(root, root, &mut files);
        }

        files
    }

    fn walk(dir: &Path, root: &Path, files: &mut Vec<(PathBuf, PathBuf)>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();

            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(true);
            if hidden {
                continue;
            }

            if path.is_dir() {
                Self::walk(&path, root, files);
            } else if path.extension().and_then(|e| e.to_str()) == Some(LOG_EXTENSION) {
                files.push((path, root.to_path_buf()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn limits(file_bytes: u64, total_bytes: u64) -> ScanLimits {
        ScanLimits {
            max_file_bytes: file_bytes,
            max_total_bytes: total_bytes,
        }
    }

    #[test]
    fn test_budget_rejects_oversized_file() {
        let mut budget = RunBudget::new(limits(100, 1000));
        assert!(!budget.admit(Path::new("big.jsonl"), 101));
        assert_eq!(budget.consumed_bytes(), 0);
    }

    #[test]
    fn test_budget_tracks_cumulative_reads() {
        let mut budget = RunBudget::new(limits(100, 150));
        assert!(budget.admit(Path::new("a.jsonl"), 100));
        // Individually under the cap, but the run budget is exhausted.
        assert!(!budget.admit(Path::new("b.jsonl"), 100));
        assert!(budget.admit(Path::new("c.jsonl"), 50));
        assert_eq!(budget.consumed_bytes(), 150);
    }

    #[test]
    fn test_validate_root_rejects_outside_allow_list() {
        let allowed = TempDir::new().unwrap();
        let discovery =
            FileDiscovery::with_roots(vec![], vec![allowed.path().to_path_buf()]);

        let err = discovery.validate_root("/etc").unwrap_err();
        assert!(matches!(err, AccessError::PathTraversal(_)));
    }

    #[test]
    fn test_validate_root_rejects_file_path() {
        let allowed = TempDir::new().unwrap();
        let discovery =
            FileDiscovery::with_roots(vec![], vec![allowed.path().to_path_buf()]);

        let err = discovery.validate_root("/etc/passwd").unwrap_err();
        assert!(matches!(
            err,
            AccessError::PathTraversal(_) | AccessError::InvalidPath(_)
        ));
    }

    #[test]
    fn test_validate_root_accepts_allowed_subdirectory() {
        let allowed = TempDir::new().unwrap();
        let sub = allowed.path().join("projects");
        fs::create_dir(&sub).unwrap();

        let discovery =
            FileDiscovery::with_roots(vec![], vec![allowed.path().to_path_buf()]);
        let resolved = discovery
            .validate_root(sub.to_str().unwrap())
            .expect("subdirectory of an allowed root should validate");
        assert!(resolved.ends_with("projects"));
    }

    #[test]
    fn test_discovery_recurses_and_filters() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("project-a").join("deep");
        fs::create_dir_all(&nested).unwrap();
        let hidden_dir = root.path().join(".git");
        fs::create_dir_all(&hidden_dir).unwrap();

        File::create(nested.join("usage.jsonl")).unwrap();
        File::create(root.path().join("project-a").join("notes.txt")).unwrap();
        File::create(root.path().join(".hidden.jsonl")).unwrap();
        File::create(hidden_dir.join("buried.jsonl")).unwrap();

        let discovery = FileDiscovery::with_roots(vec![], vec![]);
        let files = discovery.find_log_files(&[root.path().to_path_buf()]);

        assert_eq!(files.len(), 1);
        assert!(files[0].0.ends_with("usage.jsonl"));
        assert_eq!(files[0].1, root.path());
    }

    #[test]
    fn test_missing_root_yields_no_files() {
        let discovery = FileDiscovery::with_roots(vec![], vec![]);
        let files = discovery.find_log_files(&[PathBuf::from("/nonexistent/claude/logs")]);
        assert!(files.is_empty());
    }
}
