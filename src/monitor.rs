//! Refresh-Cycle Orchestration
//!
//! [`UsageMonitor`] coordinates one refresh cycle: discovery, ingestion,
//! windowing, burn-rate enrichment, and aggregation, returning a
//! [`UsageSnapshot`] recomputed from scratch. Old snapshots are discarded,
//! never updated in place.
//!
//! The watch loop re-runs the cycle on a fixed interval. Missed ticks are
//! skipped rather than queued, so at most one ingestion pass runs at a
//! time; an in-flight pass always runs to completion.

use crate::aggregator;
use crate::burn_rate;
use crate::file_discovery::{FileDiscovery, ScanLimits};
use crate::ingestion::IngestionRun;
use crate::limits::Plan;
use crate::models::{ProjectUsage, Session, UsageStatistics};
use crate::sessions::{self, WindowPolicy};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::warn;

/// Inputs supplied by the caller for each refresh cycle.
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub plan: Plan,
    pub policy: WindowPolicy,
    /// Optional override root; rejected paths fall back to the defaults.
    pub custom_root: Option<String>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            plan: Plan::Auto,
            policy: WindowPolicy::Rolling,
            custom_root: None,
        }
    }
}

/// One refresh cycle's recomputed output.
#[derive(Debug, Clone, Serialize)]
pub struct UsageSnapshot {
    pub sessions: Vec<Session>,
    pub active: Option<Session>,
    pub statistics: UsageStatistics,
    pub projects: Vec<ProjectUsage>,
    #[serde(rename = "entryCount")]
    pub entry_count: usize,
}

pub struct UsageMonitor {
    discovery: FileDiscovery,
    limits: ScanLimits,
    options: MonitorOptions,
}

impl UsageMonitor {
    pub fn new(options: MonitorOptions) -> Self {
        Self {
            discovery: FileDiscovery::new(),
            limits: ScanLimits::from_config(),
            options,
        }
    }

    /// Construct with explicit discovery and limits.
    pub fn with_discovery(
        discovery: FileDiscovery,
        limits: ScanLimits,
        options: MonitorOptions,
    ) -> Self {
        Self {
            discovery,
            limits,
            options,
        }
    }

    /// Run one refresh cycle at the current instant.
    pub fn refresh(&self) -> UsageSnapshot {
        self.refresh_at(Utc::now())
    }

    /// Run one refresh cycle, treating `now` as the current instant.
    ///
    /// The snapshot is a pure function of the log files, `now`, and the
    /// configured plan, which is what makes this testable with a pinned
    /// clock.
    pub fn refresh_at(&self, now: DateTime<Utc>) -> UsageSnapshot {
        let roots = match &self.options.custom_root {
            Some(raw) => match self.discovery.validate_root(raw) {
                Ok(root) => vec![root],
                Err(e) => {
                    warn!(error = %e, "Custom root rejected; using default roots");
                    self.discovery.default_roots().to_vec()
                }
            },
            None => self.discovery.default_roots().to_vec(),
        };

        let files = self.discovery.find_log_files(&roots);
        let entries = IngestionRun::new(self.limits).ingest(&files);

        let mut sessions =
            sessions::build_sessions(&entries, self.options.policy, self.options.plan, now);
        burn_rate::enrich_active(&mut sessions, now);

        let active = sessions.iter().find(|session| session.is_active).cloned();
        let statistics = aggregator::statistics(&sessions, now.date_naive());
        let projects = aggregator::project_usage(&entries);

        UsageSnapshot {
            sessions,
            active,
            statistics,
            projects,
            entry_count: entries.len(),
        }
    }

    /// Refresh on a fixed interval until Ctrl-C, invoking `render` with
    /// each new snapshot.
    pub async fn watch<F>(&self, interval_secs: u64, mut render: F) -> Result<()>
    where
        F: FnMut(&UsageSnapshot),
    {
        let mut interval = time::interval(Duration::from_secs(interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    println!("\nMonitoring stopped.");
                    break;
                }
                _ = interval.tick() => {
                    let snapshot = self.refresh();
                    render(&snapshot);
                }
            }
        }

        Ok(())
    }
}
