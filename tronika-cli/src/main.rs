use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod context;
mod courses_cmd;
mod dispatch;
mod logging;
mod state;
mod sweep_cmd;
mod tasks_cmd;

use context::Ctx;
use courses_cmd::CourseCommand;
use sweep_cmd::SweepArgs;
use tasks_cmd::TaskCommand;

#[derive(Parser, Debug)]
#[command(
    name = "tronika",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TRONIKA_BUILD_SHA"), ")"),
    about = "TaskaTronika: course tasks, deadlines and reminders"
)]
struct Cli {
    /// Data directory (default: $TRONIKA_HOME or ~/.tronika)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Evaluate as if it were this instant (RFC 3339)
    #[arg(long, global = true, hide = true)]
    now: Option<String>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage courses
    Course {
        #[command(subcommand)]
        command: CourseCommand,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Count tasks per deadline status
    Status,

    /// Send reminders for tasks due within the reminder window
    Sweep(SweepArgs),

    /// Show recent task activity
    Activity {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,

    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let fixed_now = cli
        .now
        .as_deref()
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("--now is not RFC 3339: {s}"))
        })
        .transpose()?;

    // `config init` must work even when the existing config is broken.
    if let Command::Config {
        command: ConfigCommand::Init,
    } = cli.command
    {
        let home = state::ensure_tronika_home(cli.home.as_deref())?;
        return config::init_config(&home);
    }

    let ctx = Ctx::load(cli.home.as_deref(), fixed_now)?;
    tracing::debug!(home = %ctx.home.display(), tz = %ctx.tz, "context loaded");

    match cli.command {
        Command::Course { command } => courses_cmd::run(&ctx, command)?,
        Command::Task { command } => tasks_cmd::run(&ctx, command)?,
        Command::Status => tasks_cmd::status(&ctx)?,
        Command::Sweep(args) => sweep_cmd::run(&ctx, args).await?,
        Command::Activity { limit } => activity(&ctx, limit)?,
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(&ctx.home)?,
            ConfigCommand::Show => config::show_config(&ctx.config)?,
        },
    }

    Ok(())
}

fn activity(ctx: &Ctx, limit: usize) -> Result<()> {
    let rows = ctx.journal().read_recent(limit)?;
    if rows.is_empty() {
        println!("No activity yet.");
        return Ok(());
    }
    for e in rows {
        println!(
            "{} {:<9} {} {}",
            tronika_core::format_local(e.timestamp, ctx.tz),
            e.action,
            tasks_cmd::short_id(&e.task_id),
            e.details
        );
    }
    Ok(())
}
