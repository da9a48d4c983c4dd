//! Workflow events and notification triggers.
//!
//! Every workflow transition emits a typed event, persisted once per
//! interested user. External collaborators (mail digests, dashboards,
//! audit trails, discussion cleanup) consume the stored rows; the
//! workflow engine itself never blocks on them.

use diesel::{
    prelude::*,
    result::Error as DbError,
};

use crate::db::{Connection, models as db, schema};

mod events;

pub use self::events::*;

/// Persist an event for each given user.
///
/// Meant to be called from within the transaction of the operation that
/// caused the event, so the event is only recorded if the operation
/// commits.
pub fn emit<E>(dbcon: &Connection, users: &[i32], event: E)
-> Result<(), DbError>
where
    Event: From<E>,
{
    let event = Event::from(event);

    if users.is_empty() {
        debug!("no recipients for {} event", event.kind());
        return Ok(());
    }

    let data = event.data();
    let rows = users.iter()
        .map(|&user| db::NewEvent {
            user,
            kind: event.kind(),
            data: &data,
        })
        .collect::<Vec<_>>();

    diesel::insert_into(schema::events::table)
        .values(&rows)
        .execute(dbcon)?;

    Ok(())
}
