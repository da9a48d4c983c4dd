//! Commands for managing categories.

use structopt::StructOpt;
use uuid::Uuid;

use crate::{
    Config,
    Result,
    db::{self, types::{CategoryKind, ExportFormat}},
    models::{Category, Entity, Export, User},
};
use super::util::report;

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// List categories
    #[structopt(name = "list")]
    List,
    /// Add a new category
    #[structopt(name = "add")]
    Add(AddOpts),
    /// Register a contract number with a category
    #[structopt(name = "add-contract")]
    AddContract(AddContractOpts),
    /// Allow an entity to receive this category's documents
    #[structopt(name = "link")]
    Link(LinkOpts),
    /// Inspect a category
    #[structopt(name = "show")]
    Show(ShowOpts),
    /// Request an export of a category's document register
    #[structopt(name = "export")]
    Export(ExportOpts),
    /// Check on a requested export
    #[structopt(name = "export-status")]
    ExportStatus(ExportStatusOpts),
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    match opts.command {
        Command::List => list(cfg),
        Command::Add(opts) => add(cfg, opts),
        Command::AddContract(opts) => add_contract(cfg, opts),
        Command::Link(opts) => link(cfg, opts),
        Command::Show(opts) => show(cfg, opts),
        Command::Export(opts) => export(cfg, opts),
        Command::ExportStatus(opts) => export_status(cfg, opts),
    }
}

fn list(cfg: &Config) -> Result<()> {
    let db = db::connect(cfg)?;

    for category in Category::all(&db)? {
        println!("{:4} {:12} {:6} {}",
            category.id, category.kind, category.originator, category.name);
    }

    Ok(())
}

#[derive(StructOpt)]
pub struct AddOpts {
    /// Category's name
    name: String,
    /// Trigram of the originating organisation
    #[structopt(long = "originator")]
    originator: String,
    /// Category holds transmittals instead of deliverable documents
    #[structopt(long = "transmittals")]
    transmittals: bool,
}

fn add(cfg: &Config, opts: AddOpts) -> Result<()> {
    let db = db::connect(cfg)?;

    let kind = if opts.transmittals {
        CategoryKind::Transmittal
    } else {
        CategoryKind::Deliverable
    };

    let category = report(Category::create(
        &db, &opts.name, &opts.originator, kind))?;

    println!("Created category {}", category.id);

    Ok(())
}

#[derive(StructOpt)]
pub struct AddContractOpts {
    /// Category's name
    category: String,
    /// Contract number
    contract_number: String,
}

fn add_contract(cfg: &Config, opts: AddContractOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let category = report(Category::by_name(&db, &opts.category))?;

    category.add_contract(&db, &opts.contract_number)?;

    Ok(())
}

#[derive(StructOpt)]
pub struct LinkOpts {
    /// Category's name
    category: String,
    /// Entity's trigram
    entity: String,
}

fn link(cfg: &Config, opts: LinkOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let category = report(Category::by_name(&db, &opts.category))?;
    let entity = report(Entity::by_trigram(&db, &opts.entity))?;

    category.link_third_party(&db, entity.id)?;

    Ok(())
}

#[derive(StructOpt)]
pub struct ShowOpts {
    /// Category's name
    category: String,
}

fn show(cfg: &Config, opts: ShowOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let category = report(Category::by_name(&db, &opts.category))?;

    println!("Name:       {}", category.name);
    println!("Kind:       {}", category.kind);
    println!("Originator: {}", category.originator);

    for contract in category.contracts(&db)? {
        println!("Contract:   {}", contract);
    }

    Ok(())
}

#[derive(StructOpt)]
pub struct ExportOpts {
    /// Category's name
    category: String,
    /// Requesting user's email
    #[structopt(long = "by")]
    by: String,
    /// Output format: csv, pdf or xlsx
    #[structopt(long = "format", default_value = "csv")]
    format: ExportFormat,
}

fn export(cfg: &Config, opts: ExportOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let category = report(Category::by_name(&db, &opts.category))?;
    let owner = report(User::by_email(&db, &opts.by))?;

    let export = Export::create(&db, owner.id, category.id, opts.format)?;

    println!("Queued export {}", export.id);

    Ok(())
}

#[derive(StructOpt)]
pub struct ExportStatusOpts {
    /// Export's ID
    id: Uuid,
}

fn export_status(cfg: &Config, opts: ExportStatusOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let export = report(Export::by_id(&db, opts.id))?;

    if export.is_ready() {
        println!("{} ready: {}", export.id, export.file_name());
    } else {
        println!("{} {}", export.id, export.status);
    }

    Ok(())
}
