//! Output formatting for sessions, statistics, and project breakdowns.
//!
//! Human-readable colored terminal output plus structured JSON for
//! programmatic consumption. Rendering only; all numbers arrive already
//! computed in the snapshot.

use crate::models::{ProjectUsage, Session, UsageStatistics};
use crate::monitor::UsageSnapshot;
use colored::Colorize;

pub struct DisplayManager;

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayManager {
    pub fn new() -> Self {
        Self
    }

    pub fn display_sessions(&self, sessions: &[Session], limit: Option<usize>, json_output: bool) {
        let shown = limit.unwrap_or(sessions.len()).min(sessions.len());

        if json_output {
            let output = serde_json::json!({ "sessions": &sessions[..shown] });
            println!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
            );
            return;
        }

        if sessions.is_empty() {
            println!("No usage sessions found.");
            return;
        }

        for session in &sessions[..shown] {
            let marker = if session.is_active {
                "● active".green().bold().to_string()
            } else {
                "○ closed".dimmed().to_string()
            };

            println!(
                "{}  {}  {} / {} tokens  ${:.2}",
                session.start_time.format("%Y-%m-%d %H:%M").to_string().cyan(),
                marker,
                format_tokens(session.token_count).bold(),
                format_tokens(session.token_limit),
                session.cost
            );

            if let Some(rate) = session.burn_rate {
                println!("    burn rate: {:.1} tok/min", rate);
            }
            for breakdown in session.model_breakdown() {
                println!(
                    "    {:<8} {:>10}  {:.1}%",
                    breakdown.tier.label(),
                    format_tokens(breakdown.token_count),
                    breakdown.percentage
                );
            }
        }
    }

    pub fn display_statistics(&self, statistics: &UsageStatistics, json_output: bool) {
        if json_output {
            println!(
                "{}",
                serde_json::to_string_pretty(statistics).unwrap_or_else(|_| "{}".to_string())
            );
            return;
        }

        println!("{}", "Usage statistics".bold());
        println!("  sessions:        {}", statistics.session_count);
        println!(
            "  total tokens:    {}",
            format_tokens(statistics.total_tokens)
        );
        println!("  total cost:      ${:.2}", statistics.total_cost);
        println!(
            "  avg tokens/sess: {}",
            format_tokens(statistics.average_tokens_per_session as u64)
        );
        println!("  streak:          {} days", statistics.current_streak_days);

        if let Some(peak) = &statistics.peak_session {
            println!(
                "  peak session:    {} ({} tokens)",
                peak.start_time.format("%Y-%m-%d %H:%M"),
                format_tokens(peak.token_count)
            );
        }
    }

    pub fn display_projects(&self, projects: &[ProjectUsage], json_output: bool) {
        if json_output {
            let output = serde_json::json!({ "projects": projects });
            println!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
            );
            return;
        }

        if projects.is_empty() {
            println!("No project usage found.");
            return;
        }

        for project in projects {
            println!(
                "{:<32} {:>10}  {:>5.1}%  {} days  last {}",
                project.project_path.cyan(),
                format_tokens(project.total_tokens),
                project.percentage,
                project.session_count,
                project.last_used.format("%Y-%m-%d")
            );
        }
    }

    pub fn display_watch_frame(&self, snapshot: &UsageSnapshot) {
        // Repaint in place.
        print!("\x1b[2J\x1b[H");
        println!("{}", "[ CLAUDE MONITOR ]".bold());
        println!();

        match &snapshot.active {
            Some(active) => {
                let used_pct = if active.token_limit > 0 {
                    (active.token_count as f64 / active.token_limit as f64) * 100.0
                } else {
                    0.0
                };
                println!(
                    "Tokens: {} / {} ({:.1}%)",
                    format_tokens(active.token_count).bold(),
                    format_tokens(active.token_limit),
                    used_pct
                );
                if let Some(rate) = active.burn_rate {
                    println!("Burn:   {:.1} tok/min", rate);
                    let remaining = active.token_limit.saturating_sub(active.token_count);
                    if rate > 0.0 && remaining > 0 {
                        let eta = chrono::Utc::now()
                            + chrono::Duration::minutes((remaining as f64 / rate) as i64);
                        println!("Empty:  {}", eta.format("%H:%M"));
                    }
                }
                println!("Resets: {}", active.end_time.format("%H:%M"));
            }
            None => println!("No active session"),
        }

        println!();
        println!(
            "{} sessions, {} entries total",
            snapshot.statistics.session_count, snapshot.entry_count
        );
    }
}

fn format_tokens(tokens: u64) -> String {
    if tokens >= 1_000_000 {
        format!("{:.1}M", tokens as f64 / 1_000_000.0)
    } else if tokens >= 1_000 {
        format!("{:.1}K", tokens as f64 / 1_000.0)
    } else {
        tokens.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tokens() {
        assert_eq!(format_tokens(950), "950");
        assert_eq!(format_tokens(44_000), "44.0K");
        assert_eq!(format_tokens(880_000), "880.0K");
        assert_eq!(format_tokens(1_500_000), "1.5M");
    }
}
