//! Usage Record Parser
//!
//! Turns one decoded JSON object into a validated [`UsageEntry`], or skips
//! it. A skip is an expected outcome, not an error: the only hard
//! requirement on a record is a parseable timestamp, and every other field
//! degrades to a default.
//!
//! Log lines appear in several historical shapes (token counts at the top
//! level or nested under `message.usage`, identifiers in snake_case or
//! camelCase). Each logical field is therefore extracted through an
//! explicit, ordered list of key paths rather than a chain of nested
//! conditionals, which keeps the fallback priority visible and testable.

use crate::models::UsageEntry;
use crate::timestamp_parser::TimestampParser;
use serde_json::Value;

/// One step of a fallback chain: a key path into the JSON object.
type KeyPath = &'static [&'static str];

const TIMESTAMP: &[KeyPath] = &[&["timestamp"]];
const USAGE: &[KeyPath] = &[&["usage"], &["message", "usage"]];
const MODEL: &[KeyPath] = &[&["model"], &["message", "model"]];
const COST: &[KeyPath] = &[&["cost"], &["costUSD"]];
const MESSAGE_ID: &[KeyPath] = &[&["message_id"], &["messageId"], &["message", "id"]];
const REQUEST_ID: &[KeyPath] = &[&["request_id"], &["requestId"]];
const PROJECT_PATH: &[KeyPath] = &[&["cwd"]];

fn lookup<'a>(root: &'a Value, rules: &[KeyPath]) -> Option<&'a Value> {
    for path in rules {
        let mut current = root;
        let mut matched = true;
        for key in *path {
            match current.get(key) {
                Some(next) => current = next,
                None => {
                    matched = false;
                    break;
                }
            }
        }
        if matched {
            return Some(current);
        }
    }
    None
}

fn string_field(root: &Value, rules: &[KeyPath]) -> Option<String> {
    lookup(root, rules)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn count_field(usage: &Value, key: &str) -> u64 {
    usage.get(key).and_then(Value::as_u64).unwrap_or(0)
}

/// Parses raw log records into normalized usage entries.
pub struct RecordParser;

impl RecordParser {
    /// Build a [`UsageEntry`] from one decoded JSON value.
    ///
    /// Returns `None` (skip) for non-objects and for records whose
    /// timestamp does not parse; all other fields default rather than
    /// reject.
    pub fn parse(value: &Value) -> Option<UsageEntry> {
        if !value.is_object() {
            return None;
        }

        let raw_timestamp = string_field(value, TIMESTAMP)?;
        let timestamp = TimestampParser::parse(&raw_timestamp).ok()?;

        let usage = lookup(value, USAGE);
        let (input_tokens, output_tokens, cache_creation_tokens, cache_read_tokens) = match usage {
            Some(usage) => (
                count_field(usage, "input_tokens"),
                count_field(usage, "output_tokens"),
                count_field(usage, "cache_creation_input_tokens"),
                count_field(usage, "cache_read_input_tokens"),
            ),
            None => (0, 0, 0, 0),
        };

        Some(UsageEntry {
            timestamp,
            input_tokens,
            output_tokens,
            cache_creation_tokens,
            cache_read_tokens,
            model: string_field(value, MODEL).unwrap_or_default(),
            cost: lookup(value, COST).and_then(Value::as_f64).unwrap_or(0.0),
            message_id: string_field(value, MESSAGE_ID),
            request_id: string_field(value, REQUEST_ID),
            project_path: string_field(value, PROJECT_PATH),
        })
    }
}
