//! Commands for building and acknowledging transmittals.

use structopt::StructOpt;

use crate::{
    Config,
    Result,
    db,
    models::{Category, Entity, OutgoingTransmittal, User},
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
    /// Package revisions into a new outgoing transmittal
    #[structopt(name = "build")]
    Build(BuildOpts),
    /// Acknowledge receipt of a transmittal
    #[structopt(name = "ack")]
    Ack(AckOpts),
    /// List transmittals awaiting acknowledgement
    #[structopt(name = "pending")]
    Pending,
    /// Inspect a transmittal
    #[structopt(name = "show")]
    Show(ShowOpts),
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    match opts.command {
        Command::Build(opts) => build(cfg, opts),
        Command::Ack(opts) => ack(cfg, opts),
        Command::Pending => pending(cfg),
        Command::Show(opts) => show(cfg, opts),
    }
}

#[derive(StructOpt)]
pub struct BuildOpts {
    /// Keys of the documents to send (their current revisions)
    documents: Vec<String>,
    /// Source category's name
    #[structopt(long = "from")]
    from: String,
    /// Destination category's name
    #[structopt(long = "to")]
    to: String,
    /// Recipient entity's trigram
    #[structopt(long = "recipient")]
    recipient: String,
    /// Contract number
    #[structopt(long = "contract")]
    contract: String,
    /// Acting user's email
    #[structopt(long = "by")]
    by: Option<String>,
}

fn build(cfg: &Config, opts: BuildOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    check_permission(&db, opts.by.as_ref(), PermissionBits::CONTROL_DOCUMENT)?;

    let from = report(Category::by_name(&db, &opts.from))?;
    let to = report(Category::by_name(&db, &opts.to))?;
    let recipient = report(Entity::by_trigram(&db, &opts.recipient))?;

    let revisions = opts.documents.iter()
        .map(|key| find_revision(&db, key, None))
        .collect::<Result<Vec<_>>>()?;

    let transmittal = report(OutgoingTransmittal::create(
        &db, &from, &to, &revisions, &recipient, &opts.contract))?;

    println!("Created transmittal {}", transmittal.key());

    Ok(())
}

#[derive(StructOpt)]
pub struct AckOpts {
    /// Transmittal's key
    transmittal: String,
    /// Acting user's email
    #[structopt(long = "by")]
    by: String,
}

fn ack(cfg: &Config, opts: AckOpts) -> Result<()> {
    let db = db::connect(cfg)?;

    let user = report(User::by_email(&db, &opts.by))?;
    report(user.permissions().require(PermissionBits::ACK_TRANSMITTAL))?;

    let mut transmittal = report(
        OutgoingTransmittal::by_key(&db, &opts.transmittal))?;
    report(transmittal.acknowledge(&db, &user))?;

    println!("Acknowledged receipt of {}", transmittal.key());

    Ok(())
}

fn pending(cfg: &Config) -> Result<()> {
    let db = db::connect(cfg)?;

    for transmittal in OutgoingTransmittal::pending_ack(&db)? {
        println!("{:30} created {}",
            transmittal.key(), transmittal.created_on.date());
    }

    Ok(())
}

#[derive(StructOpt)]
pub struct ShowOpts {
    /// Transmittal's key
    transmittal: String,
}

fn show(cfg: &Config, opts: ShowOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let transmittal = report(OutgoingTransmittal::by_key(&db, &opts.transmittal))?;

    println!("Key:      {}", transmittal.key());
    println!("Contract: {}", transmittal.contract_number);
    println!("Created:  {}", transmittal.created_on.date());

    match transmittal.ack_of_receipt_date {
        Some(date) => println!("Status:   acknowledged {}", date.date()),
        None => println!("Status:   pending acknowledgement"),
    }

    for snapshot in transmittal.revisions(&db)? {
        println!("{:40} {:02} {:4} {}",
            snapshot.title,
            snapshot.revision,
            snapshot.status,
            snapshot.return_code.as_ref().map(String::as_str).unwrap_or("-"),
        );
    }

    Ok(())
}
