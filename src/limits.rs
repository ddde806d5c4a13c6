//! Plan tiers and the token limit detector.
//!
//! When the configured plan is auto-detect, the effective ceiling is
//! inferred from observed usage magnitude. The heuristic is intentionally
//! coarse: it classifies by fixed thresholds, not from any authoritative
//! source.

use crate::models::{Session, UsageEntry};
use clap::ValueEnum;
use serde::Serialize;

pub const PRO_TOKEN_LIMIT: u64 = 44_000;
pub const MAX5_TOKEN_LIMIT: u64 = 220_000;
pub const MAX20_TOKEN_LIMIT: u64 = 880_000;

// Strict lower bounds for auto-detection; the boundary values themselves
// resolve to the lower tier.
const MAX20_DETECTION_FLOOR: u64 = 100_000;
const MAX5_DETECTION_FLOOR: u64 = 25_000;

/// Subscription plan selector: a fixed token ceiling or auto-detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Pro,
    Max5,
    Max20,
    Auto,
}

impl Plan {
    /// The fixed ceiling for this plan; `None` for auto-detect.
    pub fn token_limit(&self) -> Option<u64> {
        match self {
            Plan::Pro => Some(PRO_TOKEN_LIMIT),
            Plan::Max5 => Some(MAX5_TOKEN_LIMIT),
            Plan::Max20 => Some(MAX20_TOKEN_LIMIT),
            Plan::Auto => None,
        }
    }
}

/// Classify a total token count into the matching plan ceiling.
pub fn classify_total(total_tokens: u64) -> u64 {
    if total_tokens > MAX20_DETECTION_FLOOR {
        MAX20_TOKEN_LIMIT
    } else if total_tokens > MAX5_DETECTION_FLOOR {
        MAX5_TOKEN_LIMIT
    } else {
        PRO_TOKEN_LIMIT
    }
}

/// Detect a ceiling from the whole provided entry set.
pub fn detect_from_entries(entries: &[UsageEntry]) -> u64 {
    classify_total(entries.iter().map(UsageEntry::total_tokens).sum())
}

/// Detect a ceiling from completed sessions only, so a still-growing
/// active session does not skew the classification.
pub fn detect_from_sessions(sessions: &[Session]) -> u64 {
    classify_total(
        sessions
            .iter()
            .filter(|session| !session.is_active)
            .map(|session| session.token_count)
            .sum(),
    )
}
