//! Commands for managing documents.

use chrono::{NaiveDate, Utc};
use structopt::StructOpt;

use crate::{
    Config,
    Result,
    db,
    models::{Category, Document, User},
};
use super::util::{find_revision, report};

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// List documents of a category
    #[structopt(name = "list")]
    List(ListOpts),
    /// Create a new document
    #[structopt(name = "add")]
    Add(AddOpts),
    /// Upload a new revision of a document
    #[structopt(name = "add-revision")]
    AddRevision(AddRevisionOpts),
    /// Edit a revision's metadata
    #[structopt(name = "edit")]
    Edit(EditOpts),
    /// Inspect a document
    #[structopt(name = "show")]
    Show(ShowOpts),
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    match opts.command {
        Command::List(opts) => list(cfg, opts),
        Command::Add(opts) => add(cfg, opts),
        Command::AddRevision(opts) => add_revision(cfg, opts),
        Command::Edit(opts) => edit(cfg, opts),
        Command::Show(opts) => show(cfg, opts),
    }
}

#[derive(StructOpt)]
pub struct ListOpts {
    /// Category's name
    category: String,
}

fn list(cfg: &Config, opts: ListOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let category = report(Category::by_name(&db, &opts.category))?;

    for document in Document::all_of(&db, category.id)? {
        println!("{:40} {:02} {}",
            document.document_key, document.current_revision, document.title);
    }

    Ok(())
}

#[derive(StructOpt)]
pub struct AddOpts {
    /// Document's key
    document_key: String,
    /// Category's name
    #[structopt(long = "category")]
    category: String,
    /// Document's title
    #[structopt(long = "title")]
    title: String,
    /// First revision's status
    #[structopt(long = "status", default_value = "STD")]
    status: String,
    /// Document class (1-4)
    #[structopt(long = "class", default_value = "1")]
    docclass: i32,
    /// Date the revision was received (defaults to today)
    #[structopt(long = "received")]
    received: Option<NaiveDate>,
}

fn add(cfg: &Config, opts: AddOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let category = report(Category::by_name(&db, &opts.category))?;

    check_status(cfg, &opts.status)?;

    let received = opts.received
        .unwrap_or_else(|| Utc::now().naive_utc().date());

    let (document, revision) = report(Document::create(
        &db,
        &category,
        &opts.document_key,
        &opts.title,
        &opts.status,
        opts.docclass,
        received,
    ))?;

    println!("Created document {} at revision {:02}",
        document.document_key, revision.revision);

    Ok(())
}

#[derive(StructOpt)]
pub struct AddRevisionOpts {
    /// Document's key
    document: String,
    /// Revision's status
    #[structopt(long = "status", default_value = "STD")]
    status: String,
    /// Document class (1-4)
    #[structopt(long = "class", default_value = "1")]
    docclass: i32,
    /// Date the revision was received (defaults to today)
    #[structopt(long = "received")]
    received: Option<NaiveDate>,
}

fn add_revision(cfg: &Config, opts: AddRevisionOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let mut document = report(Document::by_key(&db, &opts.document))?;

    check_status(cfg, &opts.status)?;

    let received = opts.received
        .unwrap_or_else(|| Utc::now().naive_utc().date());

    let revision = document.add_revision(
        &db, &opts.status, opts.docclass, received)?;

    println!("Created revision {:02} of {}",
        revision.revision, document.document_key);

    Ok(())
}

#[derive(StructOpt)]
pub struct EditOpts {
    /// Document's key
    document: String,
    /// Revision number (defaults to the current revision)
    #[structopt(long = "revision", short = "r")]
    revision: Option<i32>,
    /// New status
    #[structopt(long = "status")]
    status: Option<String>,
    /// New document class
    #[structopt(long = "class")]
    docclass: Option<i32>,
    /// New return code
    #[structopt(long = "return-code")]
    return_code: Option<String>,
}

fn edit(cfg: &Config, opts: EditOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let mut revision = find_revision(&db, &opts.document, opts.revision)?;

    if let Some(ref status) = opts.status {
        check_status(cfg, status)?;
    }

    revision.edit(
        &db,
        opts.status.as_ref().map(String::as_str),
        opts.docclass,
        opts.return_code.as_ref().map(String::as_str),
    )?;

    println!("Updated revision {:02} of {}",
        revision.revision, opts.document);

    Ok(())
}

#[derive(StructOpt)]
pub struct ShowOpts {
    /// Document's key
    document: String,
    /// Revision number (defaults to the current revision)
    #[structopt(long = "revision", short = "r")]
    revision: Option<i32>,
}

fn show(cfg: &Config, opts: ShowOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let revision = find_revision(&db, &opts.document, opts.revision)?;
    let document = revision.document();

    println!("Key:         {}", document.document_key);
    println!("Title:       {}", document.title);
    println!("Revision:    {:02}", revision.revision);
    println!("File:        {}", revision.file_name("pdf"));
    println!("Status:      {}", revision.status);
    println!("Class:       {}", revision.docclass);
    println!("Review:      {}", revision.round_state());

    if let Some(ref return_code) = revision.return_code {
        println!("Return code: {}", return_code);
    }

    if let Some(leader) = revision.leader {
        let leader = report(User::by_id(&db, leader))?;
        println!("Leader:      {}", leader.email);
    }

    if let Some(approver) = revision.approver {
        let approver = report(User::by_id(&db, approver))?;
        println!("Approver:    {}", approver.email);
    }

    for reviewer in revision.reviewers(&db)? {
        let reviewer = report(User::by_id(&db, reviewer))?;
        println!("Reviewer:    {}", reviewer.email);
    }

    Ok(())
}

fn check_status(cfg: &Config, status: &str) -> Result<()> {
    if cfg.metadata.statuses.iter().any(|known| known == status) {
        Ok(())
    } else {
        Err(format_err!(
            "Unknown revision status {} (document:invalid-status)", status))
    }
}
