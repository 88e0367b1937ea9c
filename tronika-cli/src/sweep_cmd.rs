//! Scheduled reminder sweep.
//!
//! One sweep = load the board, let the engine pick reminder candidates, send
//! each through the configured dispatcher, record what went out. `--watch`
//! repeats on a fixed interval until Ctrl-C.

use anyhow::{Result, bail};
use clap::Args;
use std::collections::HashSet;
use std::time::Duration as StdDuration;
use tracing::{debug, info, warn};
use tronika_core::{ReminderDispatcher, SweepReport, dispatch_reminders, plan_reminders};

use crate::config::Channel;
use crate::context::Ctx;
use crate::dispatch::{ConsoleDispatcher, DryRunDispatcher, OutboxDispatcher};
use crate::state::outbox_path;

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Print what would be sent; send and record nothing
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Delivery channel (default from config.reminders.channel)
    #[arg(long)]
    pub channel: Option<Channel>,

    /// Keep running, sweeping every interval
    #[arg(long, default_value_t = false)]
    pub watch: bool,

    /// Interval for --watch (default from config.reminders.sweep_interval_hours)
    #[arg(long)]
    pub every_hours: Option<u64>,
}

pub async fn run(ctx: &Ctx, args: SweepArgs) -> Result<()> {
    if !args.watch {
        sweep_once(ctx, &args)?;
        return Ok(());
    }

    let hours = args
        .every_hours
        .unwrap_or(ctx.config.reminders.sweep_interval_hours);
    if hours == 0 {
        bail!("--every-hours must be at least 1");
    }

    info!(every_hours = hours, "reminder sweep loop started");
    let mut ticker = tokio::time::interval(StdDuration::from_secs(hours * 60 * 60));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // One bad sweep (e.g. a board mid-edit) shouldn't stop the loop.
                if let Err(e) = sweep_once(ctx, &args) {
                    warn!(error = %format!("{e:#}"), "sweep failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping sweep loop");
                break;
            }
        }
    }
    Ok(())
}

pub fn sweep_once(ctx: &Ctx, args: &SweepArgs) -> Result<SweepReport> {
    let now = ctx.now();
    let board = ctx.load_board()?;
    let notices = plan_reminders(board.tasks(), now);

    if notices.is_empty() {
        println!("No reminder-eligible tasks.");
        return Ok(SweepReport::default());
    }

    let ledger = ctx.ledger();
    if !args.dry_run {
        let dropped = ledger.prune_before(&now.format("%Y-%m-%d").to_string())?;
        if dropped > 0 {
            debug!(dropped, "pruned old reminder keys");
        }
    }
    let already_sent: HashSet<String> = ledger.load()?;
    let channel = args.channel.unwrap_or(ctx.config.reminders.channel);

    let mut dispatcher: Box<dyn ReminderDispatcher> = if args.dry_run {
        Box::new(DryRunDispatcher)
    } else {
        match channel {
            Channel::Console => Box::new(ConsoleDispatcher),
            Channel::Outbox => Box::new(OutboxDispatcher::new(outbox_path(&ctx.home), now)),
        }
    };

    let report = dispatch_reminders(
        &notices,
        |n| ctx.config.resolve_destination(n),
        &already_sent,
        dispatcher.as_mut(),
        |n| {
            if !args.dry_run {
                ledger.record([&n.dedupe_key])?;
            }
            Ok(())
        },
    );

    println!(
        "Sweep: {} eligible, {} sent, {} already sent today, {} without recipient, {} failed",
        notices.len(),
        report.sent.len(),
        report.skipped_duplicate.len(),
        report.skipped_no_destination.len(),
        report.failed.len()
    );
    for (task_id, err) in &report.failed {
        println!("  failed {task_id}: {err}");
    }
    if !report.skipped_no_destination.is_empty() {
        println!("  set config.toml [reminders].default_recipient to reach unowned tasks");
    }

    Ok(report)
}
