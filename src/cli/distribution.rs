//! Commands for managing distribution lists.

use std::{fs, path::PathBuf};
use structopt::StructOpt;

use crate::{
    Config,
    Result,
    db::{self, models as db_models},
    models::{Category, DistributionList, User, distribution_list::ImportRow},
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
    /// Assign a distribution to a revision
    #[structopt(name = "apply")]
    Apply(ApplyOpts),
    /// Import distribution lists from a sheet
    #[structopt(name = "import")]
    Import(ImportOpts),
    /// List distribution lists of a category
    #[structopt(name = "list")]
    List(ListOpts),
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    match opts.command {
        Command::Apply(opts) => apply(cfg, opts),
        Command::Import(opts) => import(cfg, opts),
        Command::List(opts) => list(cfg, opts),
    }
}

#[derive(StructOpt)]
pub struct ApplyOpts {
    /// Document's key
    document: String,
    /// Revision number (defaults to the current revision)
    #[structopt(long = "revision", short = "r")]
    revision: Option<i32>,
    /// Name of the distribution list to copy
    #[structopt(long = "list")]
    list: Option<String>,
    /// Leader's email (for an ad-hoc distribution)
    #[structopt(long = "leader")]
    leader: Option<String>,
    /// Approver's email
    #[structopt(long = "approver")]
    approver: Option<String>,
    /// Reviewers' emails
    #[structopt(long = "reviewer")]
    reviewers: Vec<String>,
    /// Acting user's email
    #[structopt(long = "by")]
    by: Option<String>,
}

fn apply(cfg: &Config, opts: ApplyOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    check_permission(&db, opts.by.as_ref(), PermissionBits::CONTROL_DOCUMENT)?;

    let mut revision = find_revision(&db, &opts.document, opts.revision)?;
    let category = report(Category::by_id(&db, revision.document().category))?;

    if let Some(ref name) = opts.list {
        let list = report(DistributionList::by_name(&db, name))?;
        let membership = report(list.resolve(&db, &category))?;

        report(revision.set_distribution(
            &db,
            &membership.leader,
            membership.approver.as_ref(),
            &membership.reviewers,
        ))?;
    } else {
        let leader = match opts.leader {
            Some(ref email) => report(User::by_email(&db, email))?.into_db(),
            None => return Err(format_err!(
                "Either a list or a leader is required")),
        };

        let approver = match opts.approver {
            Some(ref email) => Some(report(User::by_email(&db, email))?
                .into_db()),
            None => None,
        };

        let reviewers = opts.reviewers.iter()
            .map(|email| report(User::by_email(&db, email))
                .map(User::into_db))
            .collect::<Result<Vec<db_models::User>>>()?;

        report(revision.set_distribution(
            &db, &leader, approver.as_ref(), &reviewers))?;
    }

    println!("Distribution set for {} revision {:02}",
        opts.document, revision.revision);

    Ok(())
}

#[derive(StructOpt)]
pub struct ImportOpts {
    /// Category's name
    category: String,
    /// Path to the sheet, saved as CSV
    file: PathBuf,
}

fn import(cfg: &Config, opts: ImportOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let category = report(Category::by_name(&db, &opts.category))?;

    let content = fs::read_to_string(&opts.file)?;
    let rows = parse_sheet(&content)?;

    let lists = report(DistributionList::import(&db, &category, &rows))?;

    println!("Imported {} distribution lists", lists.len());

    Ok(())
}

#[derive(StructOpt)]
pub struct ListOpts {
    /// Category's name
    category: String,
}

fn list(cfg: &Config, opts: ListOpts) -> Result<()> {
    let db = db::connect(cfg)?;
    let category = report(Category::by_name(&db, &opts.category))?;

    for list in DistributionList::all_of(&db, category.id)? {
        println!("{:4} {}", list.id, list.name);
    }

    Ok(())
}

/// Parse an imported sheet.
///
/// The header row carries user emails from the second column on; every
/// other row names a list in its first cell and marks each user's role
/// with `R`, `L` or `A`.
fn parse_sheet(content: &str) -> Result<Vec<ImportRow>> {
    let mut lines = content.lines();

    let header = lines.next()
        .ok_or_else(|| format_err!("The sheet is empty"))?;
    let emails = header.split(',')
        .skip(1)
        .map(str::trim)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let mut cells = line.split(',').map(str::trim);
        let name = match cells.next() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(format_err!("A row is missing its list name")),
        };

        let mut row = ImportRow {
            list: name.to_string(),
            leader: None,
            approver: None,
            reviewers: Vec::new(),
        };

        for (email, cell) in emails.iter().zip(cells) {
            match cell {
                "R" => row.reviewers.push(email.to_string()),
                "L" => row.leader = Some(email.to_string()),
                "A" => row.approver = Some(email.to_string()),
                "" => (),
                other => return Err(format_err!(
                    "Unknown role marker {} for {}", other, email)),
            }
        }

        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_rows_assign_roles_by_column() {
        let rows = parse_sheet(
            "lists,ann@x.test,bob@x.test,eve@x.test\n\
             Piping,L,R,A\n\
             Electrical,R,L,\n",
        ).unwrap();

        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].list, "Piping");
        assert_eq!(rows[0].leader.as_ref().unwrap(), "ann@x.test");
        assert_eq!(rows[0].approver.as_ref().unwrap(), "eve@x.test");
        assert_eq!(rows[0].reviewers, ["bob@x.test"]);

        assert_eq!(rows[1].list, "Electrical");
        assert_eq!(rows[1].leader.as_ref().unwrap(), "bob@x.test");
        assert_eq!(rows[1].approver, None);
        assert_eq!(rows[1].reviewers, ["ann@x.test"]);
    }

    #[test]
    fn unknown_role_markers_are_rejected() {
        assert!(parse_sheet("lists,ann@x.test\nPiping,X\n").is_err());
    }
}
