//! Model tier identification with a process-lifetime memo cache.
//!
//! Tier rules are static, so the raw-string -> tier mapping is cached for
//! the whole process rather than per refresh run.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::OnceLock;

/// Coarse model family used for per-session usage breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Opus,
    Sonnet,
    Haiku,
    Unknown,
}

impl ModelTier {
    pub fn label(&self) -> &'static str {
        match self {
            ModelTier::Opus => "opus",
            ModelTier::Sonnet => "sonnet",
            ModelTier::Haiku => "haiku",
            ModelTier::Unknown => "unknown",
        }
    }

    fn classify(raw: &str) -> Self {
        let lowered = raw.to_ascii_lowercase();
        if lowered.contains("opus") {
            ModelTier::Opus
        } else if lowered.contains("sonnet") {
            ModelTier::Sonnet
        } else if lowered.contains("haiku") {
            ModelTier::Haiku
        } else {
            ModelTier::Unknown
        }
    }
}

static TIER_CACHE: OnceLock<DashMap<String, ModelTier>> = OnceLock::new();

/// Resolve a raw model identifier to its tier, memoized per process.
pub fn identify(raw: &str) -> ModelTier {
    let cache = TIER_CACHE.get_or_init(DashMap::new);
    if let Some(hit) = cache.get(raw) {
        return *hit;
    }
    let tier = ModelTier::classify(raw);
    cache.insert(raw.to_string(), tier);
    tier
}
