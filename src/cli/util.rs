use diesel::result::Error as DbError;

use crate::{
    Result,
    WorkflowError,
    db::Connection,
    models::{Document, Revision, User},
    permissions::PermissionBits,
};

/// Unwrap a workflow operation's result, attaching the error code to the
/// failure report.
pub fn report<T, E>(result: std::result::Result<T, E>) -> Result<T>
where
    E: WorkflowError,
{
    result.map_err(|err| {
        let code = err.code().map(|code| code.into_owned());
        match code {
            Some(code) => format_err!("{} ({})", err, code),
            None => err.into(),
        }
    })
}

/// Find a document's revision, defaulting to the current one.
pub fn find_revision(
    dbcon: &Connection,
    document_key: &str,
    revision: Option<i32>,
) -> Result<Revision> {
    let document = report(Document::by_key(dbcon, document_key))?;

    let found = match revision {
        Some(number) => document.revision(dbcon, number),
        None => document.current_revision(dbcon),
    };

    match found {
        Ok(revision) => Ok(revision),
        Err(DbError::NotFound) => Err(format_err!(
            "No revision {:02} of {} (revision:not-found)",
            revision.unwrap_or(document.current_revision), document_key,
        )),
        Err(err) => Err(err.into()),
    }
}

/// Look up the acting user and verify their permissions.
///
/// With no acting user the command runs on behalf of the system, which
/// is not subject to permission checks.
pub fn check_permission(
    dbcon: &Connection,
    by: Option<&String>,
    required: PermissionBits,
) -> Result<Option<User>> {
    let email = match by {
        Some(email) => email,
        None => return Ok(None),
    };

    let user = report(User::by_email(dbcon, email))?;
    report(user.permissions().require(required))?;

    Ok(Some(user))
}
