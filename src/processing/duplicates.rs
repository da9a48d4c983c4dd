//! Compensation for duplicated reviews.
//!
//! The unique constraint on (reviewer, document, revision) prevents
//! duplicates structurally, but rows imported from legacy systems may
//! predate it. Rather than failing interactive callers, a periodic scan
//! cancels the offending rounds so they can be restarted cleanly.

use diesel::{
    prelude::*,
    result::Error as DbError,
};
use itertools::Itertools;

use crate::{
    db::{Connection, schema::reviews},
    models::{Document, document::FindDocumentError},
};

/// Find rounds holding duplicated reviews and cancel them.
///
/// Returns the (document, revision) pairs that were affected. Rounds
/// which cannot be cancelled (e.g. already closed) are logged and left
/// alone.
pub fn find_and_cancel(dbcon: &Connection) -> Result<Vec<(i32, i32)>, DbError> {
    let triples = reviews::table
        .select((reviews::document, reviews::revision, reviews::reviewer))
        .order((reviews::document, reviews::revision, reviews::reviewer))
        .get_results::<(i32, i32, i32)>(dbcon)?;

    let offending = triples.iter()
        .tuple_windows()
        .filter(|(a, b)| a == b)
        .map(|(&(document, revision, _), _)| (document, revision))
        .unique()
        .collect::<Vec<_>>();

    for &(document, revision) in &offending {
        let doc = match Document::by_id(dbcon, document) {
            Ok(doc) => doc,
            Err(FindDocumentError::Database(err)) => return Err(err),
            Err(FindDocumentError::NotFound) => {
                warn!("duplicated reviews reference missing document {}",
                    document);
                continue;
            }
        };

        let mut rev = doc.revision(dbcon, revision)?;

        match rev.cancel_review(dbcon) {
            Ok(()) => warn!(
                "cancelled review round of {} revision {:02}: \
                duplicated reviews",
                doc.document_key, revision,
            ),
            Err(err) => warn!(
                "could not cancel duplicated round of {} revision {:02}: {}",
                doc.document_key, revision, err,
            ),
        }
    }

    Ok(offending)
}
