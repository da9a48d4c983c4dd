use diesel::{
    prelude::*,
    result::Error as DbError,
};

use crate::{
    WorkflowError,
    db::{
        Connection,
        models as db,
        schema::events,
    },
    events::{DecodeEventError, Event as EventData},
};

/// A workflow event stored for one recipient.
#[derive(Debug)]
pub struct Event {
    data: db::Event,
}

impl Event {
    /// Get all unread events of a user.
    pub fn unread(dbcon: &Connection, user: i32) -> Result<Vec<Event>, DbError> {
        events::table
            .filter(events::user.eq(user)
                .and(events::is_unread.eq(true)))
            .order(events::timestamp.asc())
            .get_results::<db::Event>(dbcon)
            .map(|v| v.into_iter().map(|data| Event { data }).collect())
    }

    /// Find an event belonging to a user by ID.
    pub fn by_id(dbcon: &Connection, id: i32, user: i32)
    -> Result<Event, FindEventError> {
        events::table
            .filter(events::user.eq(user)
                .and(events::id.eq(id)))
            .get_result::<db::Event>(dbcon)
            .optional()?
            .ok_or(FindEventError::NotFound)
            .map(|data| Event { data })
    }

    /// Load this event's data.
    pub fn load(&self) -> Result<EventData, DecodeEventError> {
        EventData::from_parts(&self.data.kind, &self.data.data)
    }

    /// Change this event's unread state.
    pub fn set_unread(&mut self, dbcon: &Connection, is_unread: bool)
    -> Result<(), DbError> {
        diesel::update(&self.data)
            .set(events::is_unread.eq(is_unread))
            .execute(dbcon)?;
        self.data.is_unread = is_unread;
        Ok(())
    }
}

impl std::ops::Deref for Event {
    type Target = db::Event;

    fn deref(&self) -> &db::Event {
        &self.data
    }
}

#[derive(WorkflowError, Debug, Fail)]
pub enum FindEventError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// No event matching given criteria found.
    #[fail(display = "Event not found")]
    #[workflow(code = "event:not-found")]
    NotFound,
}

impl_from! { for FindEventError ;
    DbError => |e| match e {
        DbError::NotFound => FindEventError::NotFound,
        e => FindEventError::Database(e),
    },
}
