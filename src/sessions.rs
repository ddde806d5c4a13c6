//! Session Windowing Engine
//!
//! Partitions the sorted entry stream into fixed five-hour [`Session`]
//! windows using one of two policies:
//!
//! - **Rolling** (primary): the first entry of a run anchors the window;
//!   an entry joins while it is within five hours of that anchor,
//!   otherwise the window closes and the entry starts a new one. Windows
//!   are not aligned to any clock boundary, and membership is tested
//!   against the window start, not the previous entry, so a gap followed
//!   by a resumed burst extends the same window while within five hours of
//!   the origin.
//! - **Hour-aligned** (alternate): each entry is assigned to the window
//!   whose start is its timestamp truncated to the top of the hour, via a
//!   direct hour-to-entries map.
//!
//! Both policies share one accumulation routine; only the grouping step
//! differs.

use crate::burn_rate;
use crate::limits::{self, Plan};
use crate::model_tiers;
use crate::models::{session_duration, Session, UsageEntry};
use chrono::{DateTime, Duration, DurationRound, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// Windowing policy for partitioning entries into sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPolicy {
    Rolling,
    HourAligned,
}

/// Truncate a timestamp to the top of its hour.
pub fn floor_to_hour(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp
        .duration_trunc(Duration::hours(1))
        .unwrap_or(timestamp)
}

/// Partition sorted entries into sessions and resolve their token limit.
///
/// Entries must already be sorted ascending by timestamp (the ingestion
/// pipeline's output contract). Sessions are returned sorted descending by
/// start time, most recent first.
pub fn build_sessions(
    entries: &[UsageEntry],
    policy: WindowPolicy,
    plan: Plan,
    now: DateTime<Utc>,
) -> Vec<Session> {
    let groups = match policy {
        WindowPolicy::Rolling => rolling_groups(entries),
        WindowPolicy::HourAligned => hour_aligned_groups(entries),
    };

    let mut sessions: Vec<Session> = groups
        .into_iter()
        .map(|(window_start, members)| build_session(window_start, &members, now))
        .collect();

    sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    let token_limit = resolve_token_limit(plan, &sessions, entries);
    for session in &mut sessions {
        session.token_limit = token_limit;
    }

    sessions
}

fn rolling_groups(entries: &[UsageEntry]) -> Vec<(DateTime<Utc>, Vec<&UsageEntry>)> {
    let mut groups: Vec<(DateTime<Utc>, Vec<&UsageEntry>)> = Vec::new();

    for entry in entries {
        match groups.last_mut() {
            // Membership compares against the window start, not the
            // previous entry.
            Some((window_start, members))
                if entry.timestamp - *window_start <= session_duration() =>
            {
                members.push(entry);
            }
            _ => groups.push((entry.timestamp, vec![entry])),
        }
    }

    groups
}

fn hour_aligned_groups(entries: &[UsageEntry]) -> Vec<(DateTime<Utc>, Vec<&UsageEntry>)> {
    let mut buckets: HashMap<DateTime<Utc>, Vec<&UsageEntry>> = HashMap::new();

    for entry in entries {
        buckets
            .entry(floor_to_hour(entry.timestamp))
            .or_default()
            .push(entry);
    }

    buckets.into_iter().collect()
}

fn build_session(window_start: DateTime<Utc>, members: &[&UsageEntry], now: DateTime<Utc>) -> Session {
    let end_time = window_start + session_duration();
    let is_active = window_start <= now && now < end_time;

    let token_count: u64 = members.iter().map(|entry| entry.total_tokens()).sum();
    let cost: f64 = members.iter().map(|entry| entry.cost).sum();

    let mut model_usage: HashMap<model_tiers::ModelTier, u64> = HashMap::new();
    for entry in members {
        *model_usage
            .entry(model_tiers::identify(&entry.model))
            .or_insert(0) += entry.total_tokens();
    }

    let elapsed = if is_active {
        (now - window_start).min(session_duration())
    } else {
        session_duration()
    };
    let burn_rate = if members.is_empty() {
        None
    } else {
        burn_rate::per_session(token_count, elapsed)
    };

    Session {
        id: Uuid::new_v4().to_string(),
        start_time: window_start,
        end_time,
        token_count,
        token_limit: 0,
        cost,
        is_active,
        burn_rate,
        model_usage,
    }
}

/// Resolve the effective token ceiling for a session set.
///
/// Fixed plans use their own ceiling. Auto-detect classifies completed
/// sessions when any exist; when every window is still active it falls
/// back to the entry-based detector so fresh installs do not always
/// classify into the base tier.
fn resolve_token_limit(plan: Plan, sessions: &[Session], entries: &[UsageEntry]) -> u64 {
    if let Some(limit) = plan.token_limit() {
        return limit;
    }

    if sessions.iter().any(|session| !session.is_active) {
        limits::detect_from_sessions(sessions)
    } else {
        limits::detect_from_entries(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::{MAX5_TOKEN_LIMIT, MAX20_TOKEN_LIMIT, PRO_TOKEN_LIMIT};

    fn entry(timestamp: &str, tokens: u64, model: &str) -> UsageEntry {
        UsageEntry {
            timestamp: timestamp.parse().unwrap(),
            input_tokens: tokens,
            output_tokens: 0,
            cache_creation_tokens: 0,
            cache_read_tokens: 0,
            model: model.to_string(),
            cost: 0.25,
            message_id: None,
            request_id: None,
            project_path: None,
        }
    }

    #[test]
    fn test_rolling_splits_on_window_start_distance() {
        let entries = vec![
            entry("2025-06-01T08:00:00Z", 10, "claude-sonnet-4"),
            entry("2025-06-01T12:59:00Z", 10, "claude-sonnet-4"),
            // 5h01m after the first entry: outside the origin window even
            // though only 2h02m after the previous entry.
            entry("2025-06-01T13:01:00Z", 10, "claude-sonnet-4"),
        ];

        let now = "2025-06-02T00:00:00Z".parse().unwrap();
        let sessions = build_sessions(&entries, WindowPolicy::Rolling, Plan::Pro, now);

        assert_eq!(sessions.len(), 2);
        // Most recent first.
        assert_eq!(
            sessions[0].start_time,
            "2025-06-01T13:01:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(sessions[0].token_count, 10);
        assert_eq!(sessions[1].token_count, 20);
    }

    #[test]
    fn test_rolling_gap_within_origin_window_continues_session() {
        // A long gap then a burst still inside 5h of the origin extends
        // the same window.
        let entries = vec![
            entry("2025-06-01T08:00:00Z", 10, "claude-sonnet-4"),
            entry("2025-06-01T12:30:00Z", 10, "claude-sonnet-4"),
        ];

        let now = "2025-06-02T00:00:00Z".parse().unwrap();
        let sessions = build_sessions(&entries, WindowPolicy::Rolling, Plan::Pro, now);
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_every_entry_in_exactly_one_rolling_session() {
        let entries: Vec<UsageEntry> = (0..50)
            .map(|i| {
                entry(
                    &format!("2025-06-01T{:02}:{:02}:00Z", (i / 4) % 24, (i % 4) * 15),
                    5,
                    "claude-sonnet-4",
                )
            })
            .collect();
        let mut sorted = entries.clone();
        sorted.sort_by_key(|e| e.timestamp);

        let now = "2025-06-03T00:00:00Z".parse().unwrap();
        let sessions = build_sessions(&sorted, WindowPolicy::Rolling, Plan::Pro, now);

        let member_total: u64 = sessions.iter().map(|s| s.token_count).sum();
        assert_eq!(member_total, 250);

        for session in &sessions {
            assert_eq!(session.end_time - session.start_time, session_duration());
        }
    }

    #[test]
    fn test_hour_aligned_buckets_by_truncated_hour() {
        let entries = vec![
            entry("2025-06-01T08:05:00Z", 10, "claude-sonnet-4"),
            entry("2025-06-01T08:55:00Z", 10, "claude-sonnet-4"),
            entry("2025-06-01T09:01:00Z", 10, "claude-sonnet-4"),
        ];

        let now = "2025-06-02T00:00:00Z".parse().unwrap();
        let sessions = build_sessions(&entries, WindowPolicy::HourAligned, Plan::Pro, now);

        assert_eq!(sessions.len(), 2);
        assert_eq!(
            sessions[1].start_time,
            "2025-06-01T08:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(sessions[1].token_count, 20);
        assert_eq!(
            sessions[0].start_time,
            "2025-06-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_active_session_detection_and_elapsed_rate() {
        let entries = vec![entry("2025-06-01T10:00:00Z", 600, "claude-sonnet-4")];

        // Two hours into the window.
        let now: DateTime<Utc> = "2025-06-01T12:00:00Z".parse().unwrap();
        let sessions = build_sessions(&entries, WindowPolicy::Rolling, Plan::Pro, now);

        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].is_active);
        // 600 tokens over 120 elapsed minutes.
        assert!((sessions[0].burn_rate.unwrap() - 5.0).abs() < 1e-9);

        // After the window closes the full five hours are accounted.
        let later: DateTime<Utc> = "2025-06-01T16:00:00Z".parse().unwrap();
        let sessions = build_sessions(&entries, WindowPolicy::Rolling, Plan::Pro, later);
        assert!(!sessions[0].is_active);
        assert!((sessions[0].burn_rate.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_model_usage_accumulation() {
        let entries = vec![
            entry("2025-06-01T10:00:00Z", 100, "claude-opus-4-20250514"),
            entry("2025-06-01T10:05:00Z", 50, "claude-sonnet-4-20250514"),
            entry("2025-06-01T10:10:00Z", 25, "claude-opus-4-20250514"),
        ];

        let now = "2025-06-02T00:00:00Z".parse().unwrap();
        let sessions = build_sessions(&entries, WindowPolicy::Rolling, Plan::Pro, now);

        let usage = &sessions[0].model_usage;
        assert_eq!(usage[&model_tiers::ModelTier::Opus], 125);
        assert_eq!(usage[&model_tiers::ModelTier::Sonnet], 50);
    }

    #[test]
    fn test_fixed_plan_limit_applied() {
        let entries = vec![entry("2025-06-01T10:00:00Z", 10, "claude-sonnet-4")];
        let now = "2025-06-02T00:00:00Z".parse().unwrap();

        let sessions = build_sessions(&entries, WindowPolicy::Rolling, Plan::Max20, now);
        assert_eq!(sessions[0].token_limit, MAX20_TOKEN_LIMIT);
    }

    #[test]
    fn test_auto_limit_from_completed_sessions() {
        let entries = vec![
            entry("2025-06-01T00:00:00Z", 30_000, "claude-sonnet-4"),
            entry("2025-06-01T10:00:00Z", 100, "claude-sonnet-4"),
        ];

        // First window completed with 30k tokens; second still active.
        let now: DateTime<Utc> = "2025-06-01T11:00:00Z".parse().unwrap();
        let sessions = build_sessions(&entries, WindowPolicy::Rolling, Plan::Auto, now);

        assert!(sessions.iter().all(|s| s.token_limit == MAX5_TOKEN_LIMIT));
    }

    #[test]
    fn test_auto_limit_falls_back_to_entries_when_all_active() {
        let entries = vec![entry("2025-06-01T10:00:00Z", 10_000, "claude-sonnet-4")];
        let now: DateTime<Utc> = "2025-06-01T11:00:00Z".parse().unwrap();

        let sessions = build_sessions(&entries, WindowPolicy::Rolling, Plan::Auto, now);
        assert_eq!(sessions[0].token_limit, PRO_TOKEN_LIMIT);
    }

    #[test]
    fn test_floor_to_hour() {
        let ts: DateTime<Utc> = "2025-06-01T14:37:21.500Z".parse().unwrap();
        assert_eq!(
            floor_to_hour(ts),
            "2025-06-01T14:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }
}
