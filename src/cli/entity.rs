//! Commands for managing entities.

use structopt::StructOpt;

use crate::{
    Config,
    Result,
    db,
    models::Entity,
};
use super::util::report;

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// List entities
    #[structopt(name = "list")]
    List,
    /// Add a new entity
    #[structopt(name = "add")]
    Add(AddOpts),
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    match opts.command {
        Command::List => list(cfg),
        Command::Add(opts) => add(cfg, opts),
    }
}

fn list(cfg: &Config) -> Result<()> {
    let db = db::connect(cfg)?;

    for entity in Entity::all(&db)? {
        println!("{:4} {:6} {}", entity.id, entity.trigram, entity.name);
    }

    Ok(())
}

#[derive(StructOpt)]
pub struct AddOpts {
    /// Entity's trigram
    trigram: String,
    /// Entity's name
    #[structopt(long = "name", short = "n")]
    name: String,
}

fn add(cfg: &Config, opts: AddOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let entity = report(Entity::create(&db, &opts.trigram, &opts.name))?;

    println!("Created entity {}", entity.id);

    Ok(())
}
