//! Process-wide cache of per-user review counts.
//!
//! Dashboards and reminder jobs ask for the number of open reviews a user
//! holds in each role far more often than reviews change. Counts are
//! cached here keyed by (user, role) and must be invalidated explicitly
//! whenever a review is created, updated, or deleted.

use diesel::{prelude::*, result::Error as DbError};
use std::{collections::HashMap, sync::RwLock};

use crate::db::{Connection, schema::reviews, types::ReviewRole};

lazy_static! {
    static ref COUNTS: RwLock<HashMap<(i32, ReviewRole), i64>> =
        RwLock::new(HashMap::new());
}

/// Number of open reviews a user holds in a role.
pub fn open_review_count(dbcon: &Connection, user: i32, role: ReviewRole)
-> Result<i64, DbError> {
    if let Some(count) = cached(user, role) {
        return Ok(count);
    }

    let count = reviews::table
        .filter(reviews::reviewer.eq(user)
            .and(reviews::role.eq(role))
            .and(reviews::closed_on.is_null()))
        .count()
        .get_result::<i64>(dbcon)?;

    COUNTS.write()
        .unwrap_or_else(|poison| poison.into_inner())
        .insert((user, role), count);

    Ok(count)
}

/// Get the cached count for (user, role), if any.
pub fn cached(user: i32, role: ReviewRole) -> Option<i64> {
    COUNTS.read()
        .unwrap_or_else(|poison| poison.into_inner())
        .get(&(user, role))
        .cloned()
}

/// Drop the cached count for (user, role).
pub fn invalidate(user: i32, role: ReviewRole) {
    COUNTS.write()
        .unwrap_or_else(|poison| poison.into_inner())
        .remove(&(user, role));
}

/// Drop cached counts for every review of a round.
pub fn invalidate_reviews<'r, I>(reviews: I)
where
    I: IntoIterator<Item = &'r crate::db::models::Review>,
{
    let mut counts = COUNTS.write()
        .unwrap_or_else(|poison| poison.into_inner());

    for review in reviews {
        counts.remove(&(review.reviewer, review.role));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prime(user: i32, role: ReviewRole, count: i64) {
        COUNTS.write().unwrap().insert((user, role), count);
    }

    #[test]
    fn invalidation_drops_only_the_given_key() {
        prime(101, ReviewRole::Reviewer, 3);
        prime(101, ReviewRole::Leader, 1);

        invalidate(101, ReviewRole::Reviewer);

        assert_eq!(cached(101, ReviewRole::Reviewer), None);
        assert_eq!(cached(101, ReviewRole::Leader), Some(1));
    }
}
