use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Handles parsing timestamps from Claude usage log entries.
pub struct TimestampParser;

impl TimestampParser {
    /// Parse a timestamp string into a `DateTime<Utc>`.
    ///
    /// Only full ISO-8601 instants with an explicit offset (or `Z`) are
    /// accepted; records carrying naive or malformed timestamps are dropped
    /// by the caller rather than guessed at.
    pub fn parse(timestamp_str: &str) -> Result<DateTime<Utc>> {
        let dt = DateTime::parse_from_rfc3339(timestamp_str)
            .with_context(|| format!("Failed to parse timestamp: {}", timestamp_str))?;
        Ok(dt.with_timezone(&Utc))
    }
}
