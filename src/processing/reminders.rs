//! Staleness detection.
//!
//! The orchestrator never watches the clock; overdue reviews and
//! unacknowledged transmittals are found here by comparing stored dates
//! to the current time.

use chrono::{Duration, Utc};
use diesel::{
    prelude::*,
    result::Error as DbError,
};

use crate::{
    db::{Connection, models as db, schema::{reviews, users}},
    events::{self, ReviewOverdue, TransmittalPendingAck},
    models::OutgoingTransmittal,
};

/// Remind users of open reviews past their due date.
pub fn remind_overdue(dbcon: &Connection) -> Result<usize, DbError> {
    let today = Utc::now().naive_utc().date();

    let overdue = reviews::table
        .filter(reviews::closed_on.is_null()
            .and(reviews::due_date.lt(today)))
        .get_results::<db::Review>(dbcon)?;

    for review in &overdue {
        events::emit(dbcon, &[review.reviewer], ReviewOverdue {
            document: review.document,
            revision: review.revision,
            due_date: review.due_date,
        })?;
    }

    Ok(overdue.len())
}

/// Remind recipient organisations of transmittals they have not
/// acknowledged within `min_age`.
pub fn remind_pending_ack(dbcon: &Connection, min_age: Duration)
-> Result<usize, DbError> {
    let cutoff = Utc::now().naive_utc() - min_age;
    let mut reminded = 0;

    for transmittal in OutgoingTransmittal::pending_ack(dbcon)? {
        if transmittal.created_on >= cutoff {
            continue;
        }

        let members = users::table
            .select(users::id)
            .filter(users::entity.eq(transmittal.recipient))
            .get_results::<i32>(dbcon)?;

        events::emit(dbcon, &members, TransmittalPendingAck {
            transmittal: transmittal.id,
            document: transmittal.document,
        })?;

        reminded += 1;
    }

    Ok(reminded)
}
