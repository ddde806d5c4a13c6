//! Burn Rate Estimator
//!
//! Two forms of the tokens-per-minute rate:
//!
//! - **Per-session**: the session's own tokens over its accounted
//!   duration.
//! - **Aggregated**: a one-hour trailing window over all sessions, with
//!   each session's tokens apportioned linearly by how much of the session
//!   overlaps the window. This approximates instantaneous consumption
//!   velocity across concurrently-relevant sessions better than a single
//!   session's own average, and overrides the active session's rate when
//!   available.

use crate::models::Session;
use chrono::{DateTime, Duration, Utc};

/// Tokens per minute over `elapsed`; `None` when the duration is zero.
pub fn per_session(total_tokens: u64, elapsed: Duration) -> Option<f64> {
    let minutes = elapsed.num_seconds() as f64 / 60.0;
    if minutes <= 0.0 {
        return None;
    }
    Some(total_tokens as f64 / minutes)
}

/// Aggregated rate over the trailing window `[now - 1h, now]`.
///
/// For every session overlapping the window, tokens attributed to the
/// overlap are apportioned linearly by time:
/// `session_tokens * overlap / session_duration`. The rate is the sum of
/// apportioned tokens over the sum of overlap minutes; `None` when no
/// session overlaps the window.
pub fn aggregated(sessions: &[Session], now: DateTime<Utc>) -> Option<f64> {
    let window_start = now - Duration::hours(1);

    let mut apportioned_tokens = 0.0;
    let mut overlap_minutes = 0.0;

    for session in sessions {
        let overlap_start = session.start_time.max(window_start);
        let overlap_end = session.end_time.min(now);
        if overlap_end <= overlap_start {
            continue;
        }

        let session_minutes =
            (session.end_time - session.start_time).num_seconds() as f64 / 60.0;
        if session_minutes <= 0.0 {
            continue;
        }

        let minutes = (overlap_end - overlap_start).num_seconds() as f64 / 60.0;
        apportioned_tokens += session.token_count as f64 * (minutes / session_minutes);
        overlap_minutes += minutes;
    }

    if overlap_minutes > 0.0 {
        Some(apportioned_tokens / overlap_minutes)
    } else {
        None
    }
}

/// Override the active session's rate with the aggregated estimate when
/// one is available.
pub fn enrich_active(sessions: &mut [Session], now: DateTime<Utc>) {
    if let Some(rate) = aggregated(sessions, now) {
        if let Some(active) = sessions.iter_mut().find(|session| session.is_active) {
            active.burn_rate = Some(rate);
        }
    }
}
