//! Core Data Models
//!
//! Data structures for the usage monitoring pipeline, from raw log entries
//! to derived session windows and aggregates.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`UsageEntry`] - Individual events parsed from JSONL files
//! 2. **Windowing**: [`Session`] - Fixed five-hour accounting windows
//! 3. **Aggregates**: [`ProjectUsage`], [`UsageStatistics`] - Derived views
//!
//! Sessions and aggregates are pure functions of the entry set plus the
//! current instant and plan; they are recomputed on every refresh cycle,
//! never patched in place.

use crate::model_tiers::ModelTier;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// One normalized usage event from a log line. Immutable after parsing.
#[derive(Debug, Clone, Serialize)]
pub struct UsageEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "inputTokens")]
    pub input_tokens: u64,
    #[serde(rename = "outputTokens")]
    pub output_tokens: u64,
    #[serde(rename = "cacheCreationTokens")]
    pub cache_creation_tokens: u64,
    #[serde(rename = "cacheReadTokens")]
    pub cache_read_tokens: u64,
    pub model: String,
    pub cost: f64,
    #[serde(rename = "messageId")]
    pub message_id: Option<String>,
    #[serde(rename = "requestId")]
    pub request_id: Option<String>,
    #[serde(rename = "projectPath")]
    pub project_path: Option<String>,
}

impl UsageEntry {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    pub fn total_cache_tokens(&self) -> u64 {
        self.cache_creation_tokens + self.cache_read_tokens
    }

    /// Deduplication key in `messageId:requestId` form. Entries missing
    /// either identifier are never deduplicated.
    pub fn dedup_key(&self) -> Option<String> {
        match (&self.message_id, &self.request_id) {
            (Some(message_id), Some(request_id)) => {
                Some(format!("{}:{}", message_id, request_id))
            }
            _ => None,
        }
    }
}

/// Fixed window length for one accounting session.
pub const SESSION_DURATION_HOURS: i64 = 5;

pub fn session_duration() -> Duration {
    Duration::hours(SESSION_DURATION_HOURS)
}

/// A contiguous five-hour usage window.
///
/// `end_time - start_time` is always exactly five hours regardless of how
/// entries are distributed inside the window.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end_time: DateTime<Utc>,
    #[serde(rename = "tokenCount")]
    pub token_count: u64,
    #[serde(rename = "tokenLimit")]
    pub token_limit: u64,
    pub cost: f64,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    /// Tokens per minute; absent when the accounted duration is zero.
    #[serde(rename = "burnRate")]
    pub burn_rate: Option<f64>,
    #[serde(rename = "modelUsage")]
    pub model_usage: HashMap<ModelTier, u64>,
}

impl Session {
    /// Per-model share of this session's tokens, largest first.
    pub fn model_breakdown(&self) -> Vec<ModelUsageBreakdown> {
        let mut breakdown: Vec<ModelUsageBreakdown> = self
            .model_usage
            .iter()
            .map(|(tier, tokens)| ModelUsageBreakdown {
                tier: *tier,
                token_count: *tokens,
                percentage: if self.token_count > 0 {
                    (*tokens as f64 / self.token_count as f64) * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        breakdown.sort_by(|a, b| b.token_count.cmp(&a.token_count));
        breakdown
    }
}

/// Read-only view of one model tier's share of a session.
#[derive(Debug, Clone, Serialize)]
pub struct ModelUsageBreakdown {
    pub tier: ModelTier,
    #[serde(rename = "tokenCount")]
    pub token_count: u64,
    pub percentage: f64,
}

/// Aggregate usage for one project path.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectUsage {
    #[serde(rename = "projectPath")]
    pub project_path: String,
    #[serde(rename = "totalTokens")]
    pub total_tokens: u64,
    /// Approximated as the number of distinct calendar days with activity.
    #[serde(rename = "sessionCount")]
    pub session_count: usize,
    #[serde(rename = "lastUsed")]
    pub last_used: DateTime<Utc>,
    #[serde(rename = "averageTokensPerSession")]
    pub average_tokens_per_session: f64,
    pub percentage: f64,
}

/// Aggregate statistics over the full session list.
#[derive(Debug, Clone, Serialize)]
pub struct UsageStatistics {
    #[serde(rename = "sessionCount")]
    pub session_count: usize,
    #[serde(rename = "totalTokens")]
    pub total_tokens: u64,
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
    #[serde(rename = "averageTokensPerSession")]
    pub average_tokens_per_session: f64,
    #[serde(rename = "averageCostPerSession")]
    pub average_cost_per_session: f64,
    #[serde(rename = "peakSession")]
    pub peak_session: Option<Session>,
    /// Consecutive calendar days with at least one session start, walking
    /// backward from today, capped at 30.
    #[serde(rename = "currentStreakDays")]
    pub current_streak_days: u32,
}
