//! Commands for managing users.

use structopt::StructOpt;

use crate::{
    Config,
    Result,
    db,
    models::{Entity, Event, User},
    permissions::PermissionBits,
};
use super::util::report;

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// List users
    #[structopt(name = "list")]
    List,
    /// Add a new user
    #[structopt(name = "add")]
    Add(AddOpts),
    /// Show a user's unread notifications
    #[structopt(name = "inbox")]
    Inbox(InboxOpts),
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    match opts.command {
        Command::List => list(cfg),
        Command::Add(opts) => add(cfg, opts),
        Command::Inbox(opts) => inbox(cfg, opts),
    }
}

fn list(cfg: &Config) -> Result<()> {
    let db = db::connect(cfg)?;

    for user in User::all(&db)? {
        println!("{:4} {:30} {}{}",
            user.id,
            user.email,
            user.name,
            if user.is_external { " (external)" } else { "" },
        );
    }

    Ok(())
}

#[derive(StructOpt)]
pub struct AddOpts {
    /// User's email address
    email: String,
    /// User's name
    #[structopt(long = "name", short = "n")]
    name: String,
    /// This user belongs to a third-party organisation
    #[structopt(long = "external")]
    is_external: bool,
    /// Trigram of the entity this user belongs to
    #[structopt(long = "entity")]
    entity: Option<String>,
    /// User's permissions, as a comma separated list of names
    #[structopt(long = "permissions")]
    permissions: Option<PermissionBits>,
}

fn add(cfg: &Config, opts: AddOpts) -> Result<()> {
    let db = db::connect(cfg)?;

    let entity = match opts.entity {
        Some(ref trigram) => Some(report(Entity::by_trigram(&db, trigram))?.id),
        None => None,
    };

    let permissions = opts.permissions.unwrap_or_else(PermissionBits::empty);
    let user = report(User::create(
        &db, &opts.email, &opts.name, opts.is_external, entity, permissions))?;

    println!("Created user {}", user.id);

    Ok(())
}

#[derive(StructOpt)]
pub struct InboxOpts {
    /// User's email
    email: String,
    /// Mark a notification as read
    #[structopt(long = "read")]
    read: Option<i32>,
}

fn inbox(cfg: &Config, opts: InboxOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let user = report(User::by_email(&db, &opts.email))?;

    if let Some(id) = opts.read {
        let mut event = report(Event::by_id(&db, id, user.id))?;
        event.set_unread(&db, false)?;
        return Ok(());
    }

    for event in Event::unread(&db, user.id)? {
        let data = event.load()?;
        println!("{:4} {} {:24} {}",
            event.id,
            event.timestamp.date(),
            data.kind(),
            serde_json::to_string(&data)?,
        );
    }

    Ok(())
}
