//! Export generation worker.

use chrono::Duration;
use diesel::result::Error as DbError;

use crate::{
    config,
    db::Connection,
    models::Export,
};

/// Age after which a stuck export is given up on.
const STALE_AFTER_HOURS: i64 = 24;

/// Process queued exports until the queue is empty.
///
/// A request whose generation fails is left in processing and reported;
/// [`cleanup_stale()`] deletes it later so the owner can enqueue a new
/// one. The worker moves on to the next request either way.
pub fn process_pending(dbcon: &Connection, cfg: &config::Storage)
-> Result<usize, DbError> {
    let mut processed = 0;

    while let Some(mut export) = Export::take_pending(dbcon)? {
        match export.write_file(dbcon, cfg) {
            Ok(path) => {
                export.mark_done(dbcon)?;
                info!("generated export {}", path.display());
                processed += 1;
            }
            Err(err) => {
                error!("could not generate export {}: {}", export.id, err);
            }
        }
    }

    Ok(processed)
}

/// Delete exports stuck in processing.
pub fn cleanup_stale(dbcon: &Connection) -> Result<usize, DbError> {
    let deleted = Export::cleanup_stale(
        dbcon, Duration::hours(STALE_AFTER_HOURS))?;

    if deleted > 0 {
        info!("deleted {} stale exports", deleted);
    }

    Ok(deleted)
}
