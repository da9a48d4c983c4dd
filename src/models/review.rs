use chrono::Utc;
use diesel::{
    prelude::*,
    result::Error as DbError,
};

use crate::{
    WorkflowError,
    cache,
    db::{
        Connection,
        models as db,
        schema::reviews,
        types::{ReviewRole, ReviewStatus},
    },
};

/// One user's participation in a review round.
#[derive(Debug)]
pub struct Review {
    data: db::Review,
}

impl Review {
    /// Construct `Review` from its database counterpart.
    pub(super) fn from_db(data: db::Review) -> Review {
        Review { data }
    }

    /// Get all reviews of a round, in creation order.
    pub fn for_round(dbcon: &Connection, document: i32, revision: i32)
    -> Result<Vec<Review>, DbError> {
        reviews::table
            .filter(reviews::document.eq(document)
                .and(reviews::revision.eq(revision)))
            .order(reviews::id.asc())
            .get_results::<db::Review>(dbcon)
            .map(|v| v.into_iter().map(Review::from_db).collect())
    }

    /// Find the review a user holds in a round.
    pub fn of_user(dbcon: &Connection, document: i32, revision: i32, user: i32)
    -> Result<Review, FindReviewError> {
        reviews::table
            .filter(reviews::document.eq(document)
                .and(reviews::revision.eq(revision))
                .and(reviews::reviewer.eq(user)))
            .get_result::<db::Review>(dbcon)
            .optional()?
            .ok_or(FindReviewError::NotFound)
            .map(Review::from_db)
    }

    /// Get all open reviews a user holds in a role.
    pub fn open_of(dbcon: &Connection, user: i32, role: ReviewRole)
    -> Result<Vec<Review>, DbError> {
        reviews::table
            .filter(reviews::reviewer.eq(user)
                .and(reviews::role.eq(role))
                .and(reviews::closed_on.is_null()))
            .order(reviews::due_date.asc())
            .get_results::<db::Review>(dbcon)
            .map(|v| v.into_iter().map(Review::from_db).collect())
    }

    /// Record this review's outcome.
    ///
    /// Posting with a comments file marks the review commented, posting
    /// without marks it reviewed. Posting again while the step is still
    /// open replaces the outcome and records the amendment time. Posting
    /// to a review whose step was closed is an error.
    pub fn post(
        &mut self,
        dbcon: &Connection,
        comments: Option<&str>,
        return_code: Option<&str>,
    ) -> Result<(), PostReviewError> {
        if self.data.closed_on.is_some() {
            return Err(PostReviewError::Closed);
        }

        if self.data.status == ReviewStatus::Pending {
            return Err(PostReviewError::StepNotStarted);
        }

        let status = if comments.is_some() {
            ReviewStatus::Commented
        } else {
            ReviewStatus::Reviewed
        };

        let amended_on = if self.is_posted() {
            Some(Utc::now().naive_utc())
        } else {
            self.data.amended_on
        };

        let data = diesel::update(&self.data)
            .set((
                reviews::status.eq(status),
                reviews::return_code.eq(return_code),
                reviews::comments.eq(comments),
                reviews::amended_on.eq(amended_on),
            ))
            .get_result::<db::Review>(dbcon)?;

        cache::invalidate(data.reviewer, data.role);
        self.data = data;

        Ok(())
    }

    /// Has the reviewer posted an outcome?
    pub fn is_posted(&self) -> bool {
        match self.data.status {
            ReviewStatus::Reviewed | ReviewStatus::Commented => true,
            _ => false,
        }
    }

    /// Tell if the review is overdue.
    ///
    /// A review is overdue only if it is still open (closed reviews cannot
    /// be overdue) and the due date is past.
    pub fn is_overdue(&self) -> bool {
        let today = Utc::now().naive_utc().date();
        self.data.closed_on.is_none() && self.data.due_date < today
    }

    /// Number of days between the due date and the review end.
    ///
    /// If the review was closed, returns the delay between the due date
    /// and the closing date. If it is still open, returns the delay
    /// between the due date and the present day.
    pub fn days_of_delay(&self) -> i64 {
        let checked_date = match self.data.closed_on {
            Some(closed_on) => closed_on.date(),
            None => Utc::now().naive_utc().date(),
        };

        (checked_date - self.data.due_date).num_days()
    }

    /// Unwrap into the underlying database row.
    pub fn into_db(self) -> db::Review {
        self.data
    }
}

impl std::ops::Deref for Review {
    type Target = db::Review;

    fn deref(&self) -> &db::Review {
        &self.data
    }
}

#[derive(WorkflowError, Debug, Fail)]
pub enum FindReviewError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// No review found matching given criteria.
    #[fail(display = "No such review")]
    #[workflow(code = "review:not-found")]
    NotFound,
}

impl_from! { for FindReviewError ;
    DbError => |e| FindReviewError::Database(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum PostReviewError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// The review's step was already closed.
    #[fail(display = "Review was already closed")]
    #[workflow(code = "review:closed")]
    Closed,
    /// The review's step has not started yet.
    #[fail(display = "Review's step has not started yet")]
    #[workflow(code = "review:invalid-state")]
    StepNotStarted,
    /// The acting user holds no review in this round.
    #[fail(display = "No such review")]
    #[workflow(code = "review:not-found")]
    NotFound,
    /// The revision is not under review.
    #[fail(display = "Revision is not under review")]
    #[workflow(code = "review:invalid-state")]
    NotUnderReview,
}

impl_from! { for PostReviewError ;
    DbError => |e| PostReviewError::Database(e),
    FindReviewError => |e| match e {
        FindReviewError::Database(e) => PostReviewError::Database(e),
        FindReviewError::NotFound => PostReviewError::NotFound,
    },
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, Utc};

    use super::*;

    fn review(due_date: NaiveDate, closed_on: Option<chrono::NaiveDateTime>)
    -> Review {
        Review {
            data: db::Review {
                id: 1,
                document: 1,
                revision: 1,
                reviewer: 1,
                role: ReviewRole::Reviewer,
                status: ReviewStatus::InProgress,
                docclass: 1,
                start_date: due_date - Duration::days(8),
                due_date,
                closed_on,
                amended_on: None,
                comments: None,
                return_code: None,
            },
        }
    }

    #[test]
    fn open_review_past_due_date_is_overdue() {
        let today = Utc::now().naive_utc().date();

        assert!(review(today - Duration::days(2), None).is_overdue());
        assert!(!review(today + Duration::days(2), None).is_overdue());
    }

    #[test]
    fn closed_review_is_never_overdue() {
        let today = Utc::now().naive_utc().date();
        let closed = Utc::now().naive_utc();

        assert!(!review(today - Duration::days(2), Some(closed)).is_overdue());
    }

    #[test]
    fn delay_counts_from_closing_date_when_closed() {
        let today = Utc::now().naive_utc().date();
        let closed = Utc::now().naive_utc();

        assert_eq!(review(today - Duration::days(3), Some(closed))
            .days_of_delay(), 3);
        assert_eq!(review(today + Duration::days(2), None).days_of_delay(), -2);
    }
}
