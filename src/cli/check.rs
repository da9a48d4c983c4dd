//! Periodic jobs and consistency checks.

use chrono::Duration;
use structopt::StructOpt;

use crate::{
    Config,
    Result,
    db,
    processing::{duplicates, exports, reminders},
};

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// Cancel review rounds holding duplicated reviews
    #[structopt(name = "duplicates")]
    Duplicates,
    /// Remind users of overdue reviews
    #[structopt(name = "overdue")]
    Overdue,
    /// Remind recipients of unacknowledged transmittals
    #[structopt(name = "pending-ack")]
    PendingAck(PendingAckOpts),
    /// Generate queued exports and drop stale ones
    #[structopt(name = "exports")]
    Exports,
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    match opts.command {
        Command::Duplicates => run_duplicates(cfg),
        Command::Overdue => run_overdue(cfg),
        Command::PendingAck(opts) => run_pending_ack(cfg, opts),
        Command::Exports => run_exports(cfg),
    }
}

fn run_duplicates(cfg: &Config) -> Result<()> {
    let db = db::pool(cfg)?.get()?;
    let cancelled = duplicates::find_and_cancel(&*db)?;

    println!("Cancelled {} rounds with duplicated reviews", cancelled.len());

    Ok(())
}

fn run_overdue(cfg: &Config) -> Result<()> {
    let db = db::pool(cfg)?.get()?;
    let reminded = reminders::remind_overdue(&*db)?;

    println!("Sent {} overdue review reminders", reminded);

    Ok(())
}

#[derive(StructOpt)]
pub struct PendingAckOpts {
    /// Only remind about transmittals at least this many days old
    #[structopt(long = "min-age", default_value = "7")]
    min_age: i64,
}

fn run_pending_ack(cfg: &Config, opts: PendingAckOpts) -> Result<()> {
    let db = db::pool(cfg)?.get()?;
    let reminded = reminders::remind_pending_ack(
        &*db, Duration::days(opts.min_age))?;

    println!("Sent {} pending acknowledgement reminders", reminded);

    Ok(())
}

fn run_exports(cfg: &Config) -> Result<()> {
    let db = db::pool(cfg)?.get()?;

    let processed = exports::process_pending(&*db, &cfg.storage)?;
    let deleted = exports::cleanup_stale(&*db)?;

    println!("Generated {} exports, deleted {} stale ones",
        processed, deleted);

    Ok(())
}
