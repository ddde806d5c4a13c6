//! Claude Monitor Library
//!
//! A session-window usage monitoring engine for Claude Code JSONL logs.
//! The engine ingests append-only usage log files, deduplicates and
//! validates individual events, groups them into fixed five-hour sessions,
//! and derives consumption metrics: burn rate, remaining capacity, and
//! per-model and per-project breakdowns.
//!
//! ## Architecture Overview
//!
//! - [`models`] - Core data structures: entries, sessions, and aggregates
//! - [`parser`] - Rule-based extraction of usage records from raw JSON
//! - [`file_discovery`] - Recursive log discovery with path containment
//!   and size/memory limits
//! - [`ingestion`] - Per-run deduplicating pipeline producing the sorted
//!   entry stream
//! - [`sessions`] - Rolling and hour-aligned session windowing
//! - [`burn_rate`] - Per-session and cross-session burn-rate estimation
//! - [`limits`] - Plan ceilings and auto-detection
//! - [`aggregator`] - Project and statistics aggregation
//! - [`monitor`] - Refresh-cycle orchestration and the watch loop
//! - [`config`] - Configuration management with environment overrides
//! - [`logging`] - Structured logging setup
//!
//! ## Main Entry Point
//!
//! ```rust,no_run
//! use claude_monitor::monitor::{MonitorOptions, UsageMonitor};
//!
//! let monitor = UsageMonitor::new(MonitorOptions::default());
//! let snapshot = monitor.refresh();
//! println!("{} sessions", snapshot.sessions.len());
//! ```
//!
//! Every snapshot is recomputed from scratch; sessions, statistics, and
//! project aggregates are pure functions of the entry set, the current
//! instant, and the configured plan.

pub mod aggregator;
pub mod burn_rate;
pub mod config;
pub mod display;
pub mod file_discovery;
pub mod ingestion;
pub mod limits;
pub mod logging;
pub mod model_tiers;
pub mod models;
pub mod monitor;
pub mod parser;
pub mod sessions;
pub mod timestamp_parser;

pub use models::*;
pub use monitor::{MonitorOptions, UsageMonitor, UsageSnapshot};
