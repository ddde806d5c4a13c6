use anyhow::Result;
use clap::{Parser, Subcommand};

use claude_monitor::config::get_config;
use claude_monitor::display::DisplayManager;
use claude_monitor::limits::Plan;
use claude_monitor::logging::init_logging;
use claude_monitor::monitor::{MonitorOptions, UsageMonitor};
use claude_monitor::sessions::WindowPolicy;

#[derive(Parser)]
#[command(name = "claude-monitor")]
#[command(about = "Session-window usage monitoring for Claude Code logs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Plan tier governing the session token ceiling
    #[arg(long, value_enum, default_value_t = Plan::Auto, global = true)]
    plan: Plan,

    /// Scan a custom log directory instead of the defaults
    #[arg(long, global = true)]
    path: Option<String>,

    /// Use hour-aligned session windows instead of rolling windows
    #[arg(long, global = true)]
    hourly: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List usage sessions, most recent first
    Sessions {
        /// Show at most N sessions
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show aggregate usage statistics
    Stats,
    /// Show per-project usage breakdown
    Projects,
    /// Continuously refresh and display the active session
    Watch {
        /// Refresh interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let options = MonitorOptions {
        plan: cli.plan,
        policy: if cli.hourly {
            WindowPolicy::HourAligned
        } else {
            WindowPolicy::Rolling
        },
        custom_root: cli.path.clone(),
    };

    let monitor = UsageMonitor::new(options);
    let display = DisplayManager::new();

    match cli.command.unwrap_or(Commands::Sessions { limit: None }) {
        Commands::Sessions { limit } => {
            let snapshot = monitor.refresh();
            display.display_sessions(&snapshot.sessions, limit, cli.json);
        }
        Commands::Stats => {
            let snapshot = monitor.refresh();
            display.display_statistics(&snapshot.statistics, cli.json);
        }
        Commands::Projects => {
            let snapshot = monitor.refresh();
            display.display_projects(&snapshot.projects, cli.json);
        }
        Commands::Watch { interval } => {
            if cli.json {
                anyhow::bail!("watch does not support --json output");
            }
            let interval = interval.unwrap_or_else(|| get_config().refresh.interval_secs);
            monitor
                .watch(interval, |snapshot| display.display_watch_frame(snapshot))
                .await?;
        }
    }

    Ok(())
}
