use structopt::StructOpt;

use crate::{Result, config::Config};

mod category;
mod check;
mod distribution;
mod document;
mod entity;
mod review;
mod transmittal;
mod user;
mod util;

#[derive(StructOpt)]
#[structopt(raw(version = r#"env!("CARGO_PKG_VERSION")"#))]
struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Manage categories
    #[structopt(name = "category")]
    Category(category::Opts),
    /// Run periodic jobs and consistency checks
    #[structopt(name = "check")]
    Check(check::Opts),
    /// Manage distribution lists
    #[structopt(name = "distribution")]
    Distribution(distribution::Opts),
    /// Manage documents
    #[structopt(name = "document")]
    Document(document::Opts),
    /// Manage entities
    #[structopt(name = "entity")]
    Entity(entity::Opts),
    /// Drive review rounds
    #[structopt(name = "review")]
    Review(review::Opts),
    /// Build and acknowledge transmittals
    #[structopt(name = "transmittal")]
    Transmittal(transmittal::Opts),
    /// Manage users
    #[structopt(name = "user")]
    User(user::Opts),
}

pub fn main() -> Result<()> {
    let opts = Opts::from_args();
    let config = crate::config::load()?;

    setup_logging(&config.logging)?;

    // Run validation after logging setup so that it can report problems.
    config.validate()?;

    match opts.command {
        Command::Category(opts) => category::main(config, opts),
        Command::Check(opts) => check::main(config, opts),
        Command::Distribution(opts) => distribution::main(config, opts),
        Command::Document(opts) => document::main(config, opts),
        Command::Entity(opts) => entity::main(config, opts),
        Command::Review(opts) => review::main(config, opts),
        Command::Transmittal(opts) => transmittal::main(config, opts),
        Command::User(opts) => user::main(config, opts),
    }
}

fn setup_logging(config: &crate::config::Logging) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(config.level);

    for (module, level) in &config.filters {
        builder.filter_module(&module, *level);
    }

    builder.try_init()?;
    Ok(())
}
