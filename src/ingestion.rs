//! Deduplicating Ingestion Pipeline
//!
//! Reads discovered files in discovery order, parses each non-empty line,
//! filters duplicates, and produces the time-ordered entry stream the rest
//! of the engine relies on.
//!
//! All mutable run state (the dedup key set and the memory-budget counter)
//! is owned by [`IngestionRun`]: constructed at run start, discarded at run
//! end, so concurrent runs would be independent if ever required.
//!
//! Nothing in this pipeline is fatal to a refresh cycle. Unreadable files,
//! invalid JSON lines, and records with bad timestamps are skipped; the
//! worst outcome is an empty entry set.

use crate::file_discovery::{RunBudget, ScanLimits};
use crate::models::UsageEntry;
use crate::parser::RecordParser;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path};
use tracing::{debug, warn};

/// One ingestion run: owns the dedup set and memory budget for a single
/// refresh cycle.
pub struct IngestionRun {
    seen_keys: HashSet<String>,
    budget: RunBudget,
    entries_skipped: usize,
}

impl IngestionRun {
    pub fn new(limits: ScanLimits) -> Self {
        Self {
            seen_keys: HashSet::new(),
            budget: RunBudget::new(limits),
            entries_skipped: 0,
        }
    }

    /// Ingest all files, in discovery order, and return the accepted
    /// entries sorted ascending by timestamp.
    ///
    /// The timestamp sort is the single ordering contract downstream
    /// components rely on; file order never matters.
    pub fn ingest(mut self, files: &[(std::path::PathBuf, std::path::PathBuf)]) -> Vec<UsageEntry> {
        let mut entries = Vec::new();

        for (file, root) in files {
            self.ingest_file(file, root, &mut entries);
        }

        entries.sort_by_key(|entry| entry.timestamp);

        debug!(
            accepted = entries.len(),
            duplicates = self.entries_skipped,
            read_mb = self.budget.consumed_bytes() / 1_000_000,
            "Ingestion run complete"
        );

        entries
    }

    fn ingest_file(&mut self, file: &Path, root: &Path, entries: &mut Vec<UsageEntry>) {
        let len = match fs::metadata(file) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!(file = %file.display(), error = %e, "Skipping unreadable file");
                return;
            }
        };

        if !self.budget.admit(file, len) {
            return;
        }

        let content = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "Skipping unreadable file");
                return;
            }
        };

        let fallback_project = project_from_location(file, root);

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Invalid JSON and non-object lines are skipped silently.
            let Ok(value) = serde_json::from_str::<Value>(line) else {
                continue;
            };

            let Some(mut entry) = RecordParser::parse(&value) else {
                continue;
            };

            if entry.project_path.is_none() {
                entry.project_path = fallback_project.clone();
            }

            // Records lacking either identifier are never deduplicated.
            if let Some(key) = entry.dedup_key() {
                if !self.seen_keys.insert(key) {
                    self.entries_skipped += 1;
                    continue;
                }
            }

            entries.push(entry);
        }
    }
}

/// Derive a project path from a file's location relative to its scan root:
/// the first path segment beneath the root.
fn project_from_location(file: &Path, root: &Path) -> Option<String> {
    file.strip_prefix(root)
        .ok()?
        .components()
        .find_map(|component| match component {
            Component::Normal(name) => name.to_str().map(str::to_string),
            _ => None,
        })
}
