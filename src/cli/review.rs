//! Commands driving review rounds.

use chrono::NaiveDate;
use structopt::StructOpt;

use crate::{
    Config,
    Result,
    cache,
    db::{self, types::ReviewRole},
    models::{Document, Review, User, revision::RoundState},
    permissions::PermissionBits,
};
use super::util::{check_permission, find_revision, report};

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// Start a review round
    #[structopt(name = "start")]
    Start(StartOpts),
    /// Post a review
    #[structopt(name = "post")]
    Post(PostOpts),
    /// Close a review step
    #[structopt(name = "close")]
    Close(CloseOpts),
    /// Reopen the leader step
    #[structopt(name = "send-back")]
    SendBack(TargetOpts),
    /// Cancel the round
    #[structopt(name = "cancel")]
    Cancel(TargetOpts),
    /// Show the round's progress
    #[structopt(name = "status")]
    Status(TargetOpts),
    /// List a user's open reviews
    #[structopt(name = "pending")]
    Pending(PendingOpts),
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    match opts.command {
        Command::Start(opts) => start(cfg, opts),
        Command::Post(opts) => post(cfg, opts),
        Command::Close(opts) => close(cfg, opts),
        Command::SendBack(opts) => send_back(cfg, opts),
        Command::Cancel(opts) => cancel(cfg, opts),
        Command::Status(opts) => status(cfg, opts),
        Command::Pending(opts) => pending(cfg, opts),
    }
}

#[derive(StructOpt)]
pub struct TargetOpts {
    /// Document's key
    document: String,
    /// Revision number (defaults to the current revision)
    #[structopt(long = "revision", short = "r")]
    revision: Option<i32>,
    /// Acting user's email
    #[structopt(long = "by")]
    by: Option<String>,
}

#[derive(StructOpt)]
pub struct StartOpts {
    /// Document's key
    document: String,
    /// Revision number (defaults to the current revision)
    #[structopt(long = "revision", short = "r")]
    revision: Option<i32>,
    /// Start date (defaults to today)
    #[structopt(long = "at")]
    at: Option<NaiveDate>,
    /// Due date (defaults to the received date plus the configured
    /// duration for the document's class)
    #[structopt(long = "due")]
    due: Option<NaiveDate>,
    /// Acting user's email
    #[structopt(long = "by")]
    by: Option<String>,
}

fn start(cfg: &Config, opts: StartOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    check_permission(&db, opts.by.as_ref(), PermissionBits::CONTROL_DOCUMENT)?;

    let mut revision = find_revision(&db, &opts.document, opts.revision)?;
    report(revision.start_review(&db, &cfg.review, opts.at, opts.due))?;

    match revision.review_due_date {
        Some(due) => println!("Review of {} revision {:02} started, due {}",
            opts.document, revision.revision, due),
        None => println!("Review of {} revision {:02} started",
            opts.document, revision.revision),
    }

    Ok(())
}

#[derive(StructOpt)]
pub struct PostOpts {
    /// Document's key
    document: String,
    /// Revision number (defaults to the current revision)
    #[structopt(long = "revision", short = "r")]
    revision: Option<i32>,
    /// Acting user's email
    #[structopt(long = "by")]
    by: String,
    /// Path to a comments file
    #[structopt(long = "comments")]
    comments: Option<String>,
    /// Return code
    #[structopt(long = "return-code")]
    return_code: Option<String>,
}

fn post(cfg: &Config, opts: PostOpts) -> Result<()> {
    let db = db::connect(cfg)?;

    let user = report(User::by_email(&db, &opts.by))?;
    report(user.permissions().require(PermissionBits::REVIEW))?;

    let mut revision = find_revision(&db, &opts.document, opts.revision)?;
    let review = report(revision.post_review(
        &db,
        &cfg.review,
        &user,
        opts.comments.as_ref().map(String::as_str),
        opts.return_code.as_ref().map(String::as_str),
    ))?;

    println!("Posted {} review of {} revision {:02} ({})",
        review.role, opts.document, revision.revision, review.status);

    if revision.round_state() == RoundState::Closed {
        match revision.return_code {
            Some(ref code) => println!(
                "Review closed with final return code {}", code),
            None => println!("Review closed"),
        }
    }

    Ok(())
}

#[derive(StructOpt)]
pub struct CloseOpts {
    /// Document's key
    document: String,
    /// Step to close: reviewer, leader or approver
    role: ReviewRole,
    /// Revision number (defaults to the current revision)
    #[structopt(long = "revision", short = "r")]
    revision: Option<i32>,
    /// Closing date (defaults to today)
    #[structopt(long = "at")]
    at: Option<NaiveDate>,
    /// Acting user's email
    #[structopt(long = "by")]
    by: Option<String>,
}

fn close(cfg: &Config, opts: CloseOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    check_permission(&db, opts.by.as_ref(), PermissionBits::CONTROL_DOCUMENT)?;

    let mut revision = find_revision(&db, &opts.document, opts.revision)?;
    report(revision.close_step(&db, &cfg.review, opts.role, opts.at))?;

    println!("Closed {} step of {} revision {:02}",
        opts.role, opts.document, revision.revision);

    if revision.round_state() == RoundState::Closed {
        match revision.return_code {
            Some(ref code) => println!(
                "Review closed with final return code {}", code),
            None => println!("Review closed"),
        }
    }

    Ok(())
}

fn send_back(cfg: &Config, opts: TargetOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    check_permission(&db, opts.by.as_ref(), PermissionBits::CONTROL_DOCUMENT)?;

    let mut revision = find_revision(&db, &opts.document, opts.revision)?;
    report(revision.send_back_to_leader(&db))?;

    println!("Review of {} revision {:02} sent back to the leader",
        opts.document, revision.revision);

    Ok(())
}

fn cancel(cfg: &Config, opts: TargetOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    check_permission(&db, opts.by.as_ref(), PermissionBits::CONTROL_DOCUMENT)?;

    let mut revision = find_revision(&db, &opts.document, opts.revision)?;
    report(revision.cancel_review(&db))?;

    println!("Review of {} revision {:02} cancelled",
        opts.document, revision.revision);

    Ok(())
}

fn status(cfg: &Config, opts: TargetOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let revision = find_revision(&db, &opts.document, opts.revision)?;

    println!("Document:  {}", opts.document);
    println!("Revision:  {:02}", revision.revision);
    println!("State:     {}", revision.round_state());
    println!("Step:      {}", revision.current_step());

    if revision.round_state() == RoundState::NotUnderReview {
        println!("Ready:     {}",
            if revision.can_be_reviewed() { "yes" } else { "no leader" });
    }

    for review in revision.reviews(&db)? {
        let reviewer = report(User::by_id(&db, review.reviewer))?;

        let closed = match review.closed_on {
            Some(closed_on) => format!("closed {}", closed_on.date()),
            None => "open".to_string(),
        };

        println!("{:10} {:30} {:12} {:3} {}",
            review.role.to_string(),
            reviewer.email,
            review.status.to_string(),
            review.return_code.as_ref().map(String::as_str).unwrap_or("-"),
            closed,
        );
    }

    Ok(())
}

#[derive(StructOpt)]
pub struct PendingOpts {
    /// User's email
    user: String,
}

fn pending(cfg: &Config, opts: PendingOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let user = report(User::by_email(&db, &opts.user))?;

    for &role in &[ReviewRole::Reviewer, ReviewRole::Leader,
        ReviewRole::Approver]
    {
        let count = cache::open_review_count(&db, user.id, role)?;
        if count == 0 {
            continue;
        }

        println!("As {} ({}):", role, count);

        for review in Review::open_of(&db, user.id, role)? {
            let document = report(Document::by_id(&db, review.document))?;

            println!("  {} revision {:02}, due {}{}",
                document.document_key,
                review.revision,
                review.due_date,
                if review.is_overdue() { " (overdue)" } else { "" },
            );
        }
    }

    Ok(())
}
