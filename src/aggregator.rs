//! Usage Aggregator
//!
//! Derives per-project aggregates and overall statistics from a finished
//! entry/session set. Everything here is a pure function of its inputs
//! plus "today"; nothing is cached or mutated between refresh cycles.

use crate::models::{ProjectUsage, Session, UsageEntry, UsageStatistics};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{BTreeSet, HashMap};

/// Placeholder project key for entries whose path could not be resolved.
pub const UNKNOWN_PROJECT: &str = "unknown";

/// Days the streak walker looks back from today.
const STREAK_LOOKBACK_DAYS: u32 = 30;

/// Group entries by project path and compute per-project aggregates,
/// sorted descending by total tokens.
pub fn project_usage(entries: &[UsageEntry]) -> Vec<ProjectUsage> {
    struct ProjectAccumulator {
        total_tokens: u64,
        active_days: BTreeSet<NaiveDate>,
        last_used: DateTime<Utc>,
    }

    let mut groups: HashMap<String, ProjectAccumulator> = HashMap::new();

    for entry in entries {
        let key = entry
            .project_path
            .clone()
            .unwrap_or_else(|| UNKNOWN_PROJECT.to_string());

        let group = groups.entry(key).or_insert_with(|| ProjectAccumulator {
            total_tokens: 0,
            active_days: BTreeSet::new(),
            last_used: entry.timestamp,
        });

        group.total_tokens += entry.total_tokens();
        group.active_days.insert(entry.timestamp.date_naive());
        group.last_used = group.last_used.max(entry.timestamp);
    }

    let grand_total: u64 = groups.values().map(|group| group.total_tokens).sum();

    let mut projects: Vec<ProjectUsage> = groups
        .into_iter()
        .map(|(project_path, group)| {
            let session_count = group.active_days.len();
            ProjectUsage {
                project_path,
                total_tokens: group.total_tokens,
                session_count,
                last_used: group.last_used,
                average_tokens_per_session: if session_count > 0 {
                    group.total_tokens as f64 / session_count as f64
                } else {
                    0.0
                },
                percentage: if grand_total > 0 {
                    (group.total_tokens as f64 / grand_total as f64) * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();

    projects.sort_by(|a, b| b.total_tokens.cmp(&a.total_tokens));
    projects
}

/// Compute overall statistics for a session list.
pub fn statistics(sessions: &[Session], today: NaiveDate) -> UsageStatistics {
    let session_count = sessions.len();
    let total_tokens: u64 = sessions.iter().map(|session| session.token_count).sum();
    let total_cost: f64 = sessions.iter().map(|session| session.cost).sum();

    let peak_session = sessions
        .iter()
        .max_by_key(|session| session.token_count)
        .cloned();

    UsageStatistics {
        session_count,
        total_tokens,
        total_cost,
        average_tokens_per_session: if session_count > 0 {
            total_tokens as f64 / session_count as f64
        } else {
            0.0
        },
        average_cost_per_session: if session_count > 0 {
            total_cost / session_count as f64
        } else {
            0.0
        },
        peak_session,
        current_streak_days: current_streak(sessions, today),
    }
}

/// Consecutive calendar days with at least one session start, walking
/// backward from today and stopping at the first gap.
fn current_streak(sessions: &[Session], today: NaiveDate) -> u32 {
    let active_days: BTreeSet<NaiveDate> = sessions
        .iter()
        .map(|session| session.start_time.date_naive())
        .collect();

    let mut streak = 0;
    for offset in 0..STREAK_LOOKBACK_DAYS {
        let day = today - Duration::days(offset as i64);
        if active_days.contains(&day) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}
