use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::{
    Connection as _Connection,
    prelude::*,
    result::Error as DbError,
};
use itertools::Itertools;
use std::fmt;

use crate::{
    WorkflowError,
    cache,
    config,
    db::{
        Connection,
        models as db,
        schema::{revision_reviewers, revisions, reviews},
        types::{ReviewRole, ReviewStatus},
    },
    events::{
        self,
        ReviewCancelled,
        ReviewStarted,
        RevisionEdited,
        SentBackToLeader,
        StepClosed,
    },
};
use super::{
    Review,
    distribution_list::{self, InvalidUserError},
    review::PostReviewError,
    transmittal,
};

/// A single revision of a document, carrying the review round state.
#[derive(Debug)]
pub struct Revision {
    data: db::Revision,
    document: db::Document,
}

/// Step a review round is currently at.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReviewStep {
    /// The round has not started.
    Pending,
    /// Reviewers are posting their reviews.
    Reviewer,
    /// The leader is reviewing.
    Leader,
    /// The approver is reviewing.
    Approver,
    /// The round was closed.
    Closed,
}

/// Overall state of a revision's review round.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundState {
    NotUnderReview,
    InProgress,
    Closed,
}

/// Step a round is at, given its milestone dates.
fn step_of(data: &db::Revision) -> ReviewStep {
    if data.review_start_date.is_none() {
        ReviewStep::Pending
    } else if data.reviewers_step_closed.is_none() {
        ReviewStep::Reviewer
    } else if data.leader_step_closed.is_none() {
        ReviewStep::Leader
    } else if data.review_end_date.is_none() {
        ReviewStep::Approver
    } else {
        ReviewStep::Closed
    }
}

/// Check that closing `role`'s step is legal at the current step.
///
/// Steps close strictly in order: reviewers first, then the leader, then
/// the approver.
fn check_close_ordering(step: ReviewStep, role: ReviewRole)
-> Result<(), CloseStepError> {
    let expected = match role {
        ReviewRole::Reviewer => ReviewStep::Reviewer,
        ReviewRole::Leader => ReviewStep::Leader,
        ReviewRole::Approver => ReviewStep::Approver,
    };

    if step == expected {
        return Ok(());
    }

    Err(match (step, role) {
        (ReviewStep::Pending, _) => CloseStepError::NotUnderReview,
        (ReviewStep::Reviewer, _) => CloseStepError::ReviewersStepOpen,
        (ReviewStep::Leader, ReviewRole::Approver) =>
            CloseStepError::LeaderStepOpen,
        _ => CloseStepError::AlreadyClosed,
    })
}

impl Revision {
    /// Construct `Revision` from its database counterpart.
    pub(super) fn from_db(data: db::Revision, document: db::Document)
    -> Revision {
        Revision { data, document }
    }

    /// Find a revision by ID.
    pub fn by_id(dbcon: &Connection, id: i32)
    -> Result<Revision, FindRevisionError> {
        use crate::db::schema::documents;

        revisions::table
            .filter(revisions::id.eq(id))
            .inner_join(documents::table)
            .get_result::<(db::Revision, db::Document)>(dbcon)
            .optional()?
            .ok_or(FindRevisionError::NotFound)
            .map(|(data, document)| Revision { data, document })
    }

    /// The document this is a revision of.
    pub fn document(&self) -> &db::Document {
        &self.document
    }

    /// Name under which this revision's file is stored.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}_{:02}.{}",
            self.document.document_key, self.data.revision, extension)
    }

    /// Step this revision's round is currently at.
    pub fn current_step(&self) -> ReviewStep {
        step_of(&self.data)
    }

    /// Overall state of this revision's round.
    pub fn round_state(&self) -> RoundState {
        match (self.data.review_start_date, self.data.review_end_date) {
            (None, _) => RoundState::NotUnderReview,
            (Some(_), None) => RoundState::InProgress,
            (Some(_), Some(_)) => RoundState::Closed,
        }
    }

    /// Users assigned as reviewers for this revision.
    pub fn reviewers(&self, dbcon: &Connection) -> Result<Vec<i32>, DbError> {
        revision_reviewers::table
            .filter(revision_reviewers::revision.eq(self.data.id))
            .get_results::<db::RevisionReviewer>(dbcon)
            .map(|v| v.into_iter().map(|r| r.user).collect())
    }

    /// All reviews of this revision's round, in creation order.
    pub fn reviews(&self, dbcon: &Connection) -> Result<Vec<Review>, DbError> {
        Review::for_round(dbcon, self.data.document, self.data.revision)
    }

    /// Is this revision ready to be reviewed?
    ///
    /// A revision can only be reviewed if a leader was assigned, and only
    /// once.
    pub fn can_be_reviewed(&self) -> bool {
        self.data.leader.is_some() && self.data.review_start_date.is_none()
    }

    /// Is this revision ready to be packaged into a transmittal?
    ///
    /// A revision can be transmitted once its review round was closed with
    /// a final return code, unless it is already part of a transmittal the
    /// recipient has not acknowledged yet.
    pub fn can_be_transmitted(&self, dbcon: &Connection)
    -> Result<bool, DbError> {
        use crate::db::schema::{exported_revisions, outgoing_transmittals};

        if self.round_state() != RoundState::Closed
            || self.data.return_code.is_none()
        {
            return Ok(false);
        }

        let pending = exported_revisions::table
            .inner_join(outgoing_transmittals::table)
            .filter(exported_revisions::document.eq(self.data.document)
                .and(exported_revisions::revision.eq(self.data.revision))
                .and(outgoing_transmittals::ack_of_receipt_date.is_null()))
            .count()
            .get_result::<i64>(dbcon)?;

        Ok(pending == 0)
    }

    /// Assign a distribution to this revision.
    ///
    /// The assignment seeds review creation when a round starts; changing
    /// it later never alters an in-flight round.
    pub fn set_distribution(
        &mut self,
        dbcon: &Connection,
        leader: &db::User,
        approver: Option<&db::User>,
        reviewers: &[db::User],
    ) -> Result<(), SetDistributionError> {
        if self.data.review_start_date.is_some() {
            return Err(SetDistributionError::UnderReview);
        }

        let members = std::iter::once(leader)
            .chain(approver)
            .chain(reviewers);
        distribution_list::ensure_internal(members)?;

        dbcon.transaction(|| {
            let data = diesel::update(&self.data)
                .set((
                    revisions::leader.eq(leader.id),
                    revisions::approver.eq(approver.map(|user| user.id)),
                ))
                .get_result::<db::Revision>(dbcon)?;

            diesel::delete(revision_reviewers::table
                .filter(revision_reviewers::revision.eq(self.data.id)))
                .execute(dbcon)?;

            let rows = reviewers.iter()
                .map(|user| db::RevisionReviewer {
                    revision: self.data.id,
                    user: user.id,
                })
                .collect::<Vec<_>>();

            diesel::insert_into(revision_reviewers::table)
                .values(&rows)
                .execute(dbcon)?;

            self.data = data;

            Ok(())
        })
    }

    /// Start a review round for this revision.
    ///
    /// Creates one review per assigned user. The revision is claimed with
    /// a conditional update, so of two concurrent calls exactly one
    /// succeeds; the other fails as if the round had already been started.
    pub fn start_review(
        &mut self,
        dbcon: &Connection,
        cfg: &config::Review,
        at: Option<NaiveDate>,
        due: Option<NaiveDate>,
    ) -> Result<(), StartReviewError> {
        let leader = match self.data.leader {
            Some(leader) => leader,
            None => return Err(StartReviewError::MissingLeader),
        };

        let start_date = at.unwrap_or_else(|| Utc::now().naive_utc().date());
        let due_date = due.unwrap_or_else(||
            self.data.received_date + cfg.duration_for_class(self.data.docclass));

        dbcon.transaction(|| {
            let claimed = diesel::update(revisions::table
                .filter(revisions::id.eq(self.data.id)
                    .and(revisions::review_start_date.is_null())))
                .set((
                    revisions::review_start_date.eq(start_date),
                    revisions::review_due_date.eq(due_date),
                ))
                .execute(dbcon)?;

            if claimed == 0 {
                return Err(StartReviewError::AlreadyUnderReview);
            }

            let reviewers = self.reviewers(dbcon)?;

            let mut rows = Vec::with_capacity(reviewers.len() + 2);
            for &reviewer in &reviewers {
                rows.push(db::NewReview {
                    document: self.data.document,
                    revision: self.data.revision,
                    reviewer,
                    role: ReviewRole::Reviewer,
                    status: ReviewStatus::InProgress,
                    docclass: self.data.docclass,
                    start_date,
                    due_date,
                    comments: None,
                });
            }

            // With no reviewers the reviewer step closes immediately and
            // the leader starts right away.
            let leader_status = if reviewers.is_empty() {
                ReviewStatus::InProgress
            } else {
                ReviewStatus::Pending
            };

            rows.push(db::NewReview {
                document: self.data.document,
                revision: self.data.revision,
                reviewer: leader,
                role: ReviewRole::Leader,
                status: leader_status,
                docclass: self.data.docclass,
                start_date,
                due_date,
                comments: None,
            });

            if let Some(approver) = self.data.approver {
                rows.push(db::NewReview {
                    document: self.data.document,
                    revision: self.data.revision,
                    reviewer: approver,
                    role: ReviewRole::Approver,
                    status: ReviewStatus::Pending,
                    docclass: self.data.docclass,
                    start_date,
                    due_date,
                    comments: None,
                });
            }

            diesel::insert_into(reviews::table)
                .values(&rows)
                .execute(dbcon)?;

            if reviewers.is_empty() {
                diesel::update(revisions::table
                    .filter(revisions::id.eq(self.data.id)))
                    .set(revisions::reviewers_step_closed.eq(start_date))
                    .execute(dbcon)?;
            }

            self.reload(dbcon)?;

            let users = rows.iter()
                .map(|row| row.reviewer)
                .unique()
                .collect::<Vec<_>>();
            events::emit(dbcon, &users, ReviewStarted {
                document: self.data.document,
                revision: self.data.revision,
            })?;

            for row in &rows {
                cache::invalidate(row.reviewer, row.role);
            }

            Ok(())
        })
    }

    /// Record a user's review and close steps it completes.
    ///
    /// A reviewer posting the last missing review closes the reviewer
    /// step; the leader or approver posting closes their step outright.
    pub fn post_review(
        &mut self,
        dbcon: &Connection,
        cfg: &config::Review,
        user: &db::User,
        comments: Option<&str>,
        return_code: Option<&str>,
    ) -> Result<Review, PostReviewError> {
        if self.round_state() != RoundState::InProgress {
            return Err(PostReviewError::NotUnderReview);
        }

        dbcon.transaction(|| {
            let mut review = Review::of_user(
                dbcon, self.data.document, self.data.revision, user.id)?;
            review.post(dbcon, comments, return_code)?;

            match review.role {
                ReviewRole::Reviewer
                    if self.current_step() == ReviewStep::Reviewer =>
                {
                    let unposted = reviews::table
                        .filter(reviews::document.eq(self.data.document)
                            .and(reviews::revision.eq(self.data.revision))
                            .and(reviews::role.eq(ReviewRole::Reviewer))
                            .and(reviews::status.ne(ReviewStatus::Reviewed))
                            .and(reviews::status.ne(ReviewStatus::Commented)))
                        .count()
                        .get_result::<i64>(dbcon)?;

                    if unposted == 0 {
                        self.do_close_step(
                            dbcon, cfg, ReviewRole::Reviewer, None)?;
                    }
                }
                ReviewRole::Leader
                    if self.current_step() == ReviewStep::Leader =>
                {
                    self.do_close_step(dbcon, cfg, ReviewRole::Leader, None)?;
                }
                ReviewRole::Approver
                    if self.current_step() == ReviewStep::Approver =>
                {
                    self.do_close_step(dbcon, cfg, ReviewRole::Approver, None)?;
                }
                _ => (),
            }

            Ok(review)
        })
    }

    /// Close a review step.
    ///
    /// Reviews of the step which were not posted are marked not reviewed.
    /// Closing the final step closes the round and records the revision's
    /// final return code as the most severe one among the round's reviews.
    pub fn close_step(
        &mut self,
        dbcon: &Connection,
        cfg: &config::Review,
        role: ReviewRole,
        at: Option<NaiveDate>,
    ) -> Result<(), CloseStepError> {
        check_close_ordering(self.current_step(), role)?;

        dbcon.transaction(|| {
            self.do_close_step(dbcon, cfg, role, at).map_err(Into::into)
        })
    }

    /// Close `role`'s step, assuming ordering was already checked.
    fn do_close_step(
        &mut self,
        dbcon: &Connection,
        cfg: &config::Review,
        role: ReviewRole,
        at: Option<NaiveDate>,
    ) -> Result<(), DbError> {
        let end_date = at.unwrap_or_else(|| Utc::now().naive_utc().date());
        let end_time = at
            .map(|date| date.and_hms(0, 0, 0))
            .unwrap_or_else(|| Utc::now().naive_utc());

        let round = reviews::document.eq(self.data.document)
            .and(reviews::revision.eq(self.data.revision));

        // Reviews of this step which were never posted.
        diesel::update(reviews::table
            .filter(round.and(reviews::role.eq(role))
                .and(reviews::status.ne(ReviewStatus::Reviewed))
                .and(reviews::status.ne(ReviewStatus::Commented))))
            .set(reviews::status.eq(ReviewStatus::NotReviewed))
            .execute(dbcon)?;

        diesel::update(reviews::table
            .filter(round.and(reviews::role.eq(role))
                .and(reviews::closed_on.is_null())))
            .set(reviews::closed_on.eq(end_time))
            .execute(dbcon)?;

        match role {
            ReviewRole::Reviewer => {
                diesel::update(reviews::table
                    .filter(round.and(reviews::role.eq(ReviewRole::Leader))
                        .and(reviews::status.eq(ReviewStatus::Pending))))
                    .set(reviews::status.eq(ReviewStatus::InProgress))
                    .execute(dbcon)?;

                let data = diesel::update(&self.data)
                    .set(revisions::reviewers_step_closed.eq(end_date))
                    .get_result::<db::Revision>(dbcon)?;
                self.data = data;
            }
            ReviewRole::Leader => {
                diesel::update(reviews::table
                    .filter(round.and(reviews::role.eq(ReviewRole::Approver))
                        .and(reviews::status.eq(ReviewStatus::Pending))))
                    .set(reviews::status.eq(ReviewStatus::InProgress))
                    .execute(dbcon)?;

                let data = diesel::update(&self.data)
                    .set(revisions::leader_step_closed.eq(end_date))
                    .get_result::<db::Revision>(dbcon)?;
                self.data = data;

                // With no approver the leader step is the last one.
                if self.data.approver.is_none() {
                    self.finish_round(dbcon, cfg, end_date)?;
                }
            }
            ReviewRole::Approver => {
                self.finish_round(dbcon, cfg, end_date)?;
            }
        }

        let all = reviews::table
            .filter(round)
            .get_results::<db::Review>(dbcon)?;
        cache::invalidate_reviews(&all);

        let recipients = match role {
            ReviewRole::Reviewer => self.data.leader.into_iter().collect(),
            _ => self.data.leader.into_iter()
                .chain(self.data.approver)
                .unique()
                .collect::<Vec<_>>(),
        };
        events::emit(dbcon, &recipients, StepClosed {
            document: self.data.document,
            revision: self.data.revision,
            role,
        })?;

        Ok(())
    }

    /// Close the round: stamp the end date and compute the final return
    /// code from a consistent read of all the round's reviews.
    fn finish_round(
        &mut self,
        dbcon: &Connection,
        cfg: &config::Review,
        end_date: NaiveDate,
    ) -> Result<(), DbError> {
        let all = reviews::table
            .filter(reviews::document.eq(self.data.document)
                .and(reviews::revision.eq(self.data.revision)))
            .get_results::<db::Review>(dbcon)?;

        let worst = cfg.worst_return_code(all.iter()
                .filter_map(|review| review.return_code.as_ref())
                .map(String::as_str))
            .map(str::to_string);

        let data = diesel::update(&self.data)
            .set((
                revisions::review_end_date.eq(end_date),
                revisions::return_code.eq(worst),
            ))
            .get_result::<db::Revision>(dbcon)?;
        self.data = data;

        Ok(())
    }

    /// Reopen the leader step.
    ///
    /// Only available while the round is at the approver step. The
    /// reviewer step stays closed.
    pub fn send_back_to_leader(&mut self, dbcon: &Connection)
    -> Result<(), SendBackError> {
        if self.current_step() != ReviewStep::Approver {
            return Err(SendBackError::NotAtApproverStep);
        }

        dbcon.transaction(|| {
            let round = reviews::document.eq(self.data.document)
                .and(reviews::revision.eq(self.data.revision));

            diesel::update(reviews::table
                .filter(round.and(reviews::role.eq(ReviewRole::Leader))))
                .set((
                    reviews::closed_on.eq(None::<NaiveDateTime>),
                    reviews::status.eq(ReviewStatus::InProgress),
                ))
                .execute(dbcon)?;

            diesel::update(reviews::table
                .filter(round.and(reviews::role.eq(ReviewRole::Approver))))
                .set(reviews::status.eq(ReviewStatus::Pending))
                .execute(dbcon)?;

            let data = diesel::update(&self.data)
                .set(revisions::leader_step_closed.eq(None::<NaiveDate>))
                .get_result::<db::Revision>(dbcon)?;
            self.data = data;

            if let Some(leader) = self.data.leader {
                cache::invalidate(leader, ReviewRole::Leader);
                events::emit(dbcon, &[leader], SentBackToLeader {
                    document: self.data.document,
                    revision: self.data.revision,
                })?;
            }

            Ok(())
        })
    }

    /// Cancel the review round.
    ///
    /// Deletes all of the round's reviews and reverts the revision to its
    /// pre-review state. Collaborating systems scoped to the round (e.g.
    /// review discussions) clean up on receiving the cancellation event.
    pub fn cancel_review(&mut self, dbcon: &Connection)
    -> Result<(), CancelReviewError> {
        match self.round_state() {
            RoundState::NotUnderReview =>
                return Err(CancelReviewError::NotUnderReview),
            RoundState::Closed => return Err(CancelReviewError::AlreadyClosed),
            RoundState::InProgress => (),
        }

        dbcon.transaction(|| {
            let old = reviews::table
                .filter(reviews::document.eq(self.data.document)
                    .and(reviews::revision.eq(self.data.revision)))
                .get_results::<db::Review>(dbcon)?;

            diesel::delete(reviews::table
                .filter(reviews::document.eq(self.data.document)
                    .and(reviews::revision.eq(self.data.revision))))
                .execute(dbcon)?;

            let data = diesel::update(&self.data)
                .set((
                    revisions::review_start_date.eq(None::<NaiveDate>),
                    revisions::review_due_date.eq(None::<NaiveDate>),
                    revisions::reviewers_step_closed.eq(None::<NaiveDate>),
                    revisions::leader_step_closed.eq(None::<NaiveDate>),
                    revisions::review_end_date.eq(None::<NaiveDate>),
                ))
                .get_result::<db::Revision>(dbcon)?;
            self.data = data;

            let users = old.iter()
                .map(|review| review.reviewer)
                .unique()
                .collect::<Vec<_>>();
            events::emit(dbcon, &users, ReviewCancelled {
                document: self.data.document,
                revision: self.data.revision,
            })?;

            cache::invalidate_reviews(&old);

            Ok(())
        })
    }

    /// Update this revision's metadata.
    ///
    /// Snapshots of this revision held by unacknowledged transmittals are
    /// brought up to date in the same transaction.
    pub fn edit(
        &mut self,
        dbcon: &Connection,
        status: Option<&str>,
        docclass: Option<i32>,
        return_code: Option<&str>,
    ) -> Result<(), DbError> {
        dbcon.transaction(|| {
            let data = diesel::update(&self.data)
                .set((
                    revisions::status.eq(
                        status.unwrap_or(&self.data.status)),
                    revisions::docclass.eq(
                        docclass.unwrap_or(self.data.docclass)),
                    revisions::return_code.eq(return_code
                        .map(str::to_string)
                        .or_else(|| self.data.return_code.clone())),
                ))
                .get_result::<db::Revision>(dbcon)?;
            self.data = data;

            transmittal::sync_on_revision_change(dbcon, &self.data)?;

            let recipients = self.data.leader.into_iter().collect::<Vec<_>>();
            events::emit(dbcon, &recipients, RevisionEdited {
                document: self.data.document,
                revision: self.data.revision,
            })?;

            Ok(())
        })
    }

    /// Re-read this revision's row.
    fn reload(&mut self, dbcon: &Connection) -> Result<(), DbError> {
        self.data = revisions::table
            .filter(revisions::id.eq(self.data.id))
            .get_result::<db::Revision>(dbcon)?;
        Ok(())
    }
}

impl std::ops::Deref for Revision {
    type Target = db::Revision;

    fn deref(&self) -> &db::Revision {
        &self.data
    }
}

impl fmt::Display for ReviewStep {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match *self {
            ReviewStep::Pending => "pending",
            ReviewStep::Reviewer => "reviewer",
            ReviewStep::Leader => "leader",
            ReviewStep::Approver => "approver",
            ReviewStep::Closed => "closed",
        })
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match *self {
            RoundState::NotUnderReview => "not under review",
            RoundState::InProgress => "in progress",
            RoundState::Closed => "closed",
        })
    }
}

#[derive(WorkflowError, Debug, Fail)]
pub enum FindRevisionError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// No revision found matching given criteria.
    #[fail(display = "No such revision")]
    #[workflow(code = "revision:not-found")]
    NotFound,
}

impl_from! { for FindRevisionError ;
    DbError => |e| FindRevisionError::Database(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum StartReviewError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// A round is already open for this revision.
    #[fail(display = "Revision is already under review")]
    #[workflow(code = "review:invalid-state")]
    AlreadyUnderReview,
    /// No leader was assigned.
    #[fail(display = "Cannot start review without a leader")]
    #[workflow(code = "review:missing-leader")]
    MissingLeader,
}

impl_from! { for StartReviewError ;
    DbError => |e| StartReviewError::Database(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum CloseStepError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// The revision is not under review.
    #[fail(display = "Revision is not under review")]
    #[workflow(code = "review:invalid-state")]
    NotUnderReview,
    /// The reviewer step has not been closed yet.
    #[fail(display = "Reviewer step is still open")]
    #[workflow(code = "review:invalid-state")]
    ReviewersStepOpen,
    /// The leader step has not been closed yet.
    #[fail(display = "Leader step is still open")]
    #[workflow(code = "review:invalid-state")]
    LeaderStepOpen,
    /// The step was already closed.
    #[fail(display = "Step was already closed")]
    #[workflow(code = "review:invalid-state")]
    AlreadyClosed,
}

impl_from! { for CloseStepError ;
    DbError => |e| CloseStepError::Database(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum SendBackError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// The round is not at the approver step.
    #[fail(display = "Review is not at the approver step")]
    #[workflow(code = "review:invalid-state")]
    NotAtApproverStep,
}

impl_from! { for SendBackError ;
    DbError => |e| SendBackError::Database(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum CancelReviewError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// The revision is not under review.
    #[fail(display = "Revision is not under review")]
    #[workflow(code = "review:invalid-state")]
    NotUnderReview,
    /// The round was already closed.
    #[fail(display = "Review was already closed")]
    #[workflow(code = "review:invalid-state")]
    AlreadyClosed,
}

impl_from! { for CancelReviewError ;
    DbError => |e| CancelReviewError::Database(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum SetDistributionError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// The revision is under review; distribution is frozen for the
    /// duration of the round.
    #[fail(display = "Revision is under review")]
    #[workflow(code = "review:invalid-state")]
    UnderReview,
    /// An external user cannot take part in reviews.
    #[fail(display = "{}", _0)]
    External(#[cause] InvalidUserError),
}

impl_from! { for SetDistributionError ;
    DbError => |e| SetDistributionError::Database(e),
    InvalidUserError => |e| SetDistributionError::External(e),
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn revision() -> db::Revision {
        db::Revision {
            id: 1,
            document: 1,
            revision: 1,
            status: "STD".to_string(),
            docclass: 1,
            return_code: None,
            received_date: NaiveDate::from_ymd(2019, 5, 10),
            leader: Some(2),
            approver: Some(3),
            review_start_date: None,
            review_due_date: None,
            reviewers_step_closed: None,
            leader_step_closed: None,
            review_end_date: None,
        }
    }

    fn date(day: u32) -> Option<NaiveDate> {
        Some(NaiveDate::from_ymd(2019, 6, day))
    }

    #[test]
    fn step_follows_milestone_dates() {
        let mut data = revision();
        assert_eq!(step_of(&data), ReviewStep::Pending);

        data.review_start_date = date(1);
        assert_eq!(step_of(&data), ReviewStep::Reviewer);

        data.reviewers_step_closed = date(4);
        assert_eq!(step_of(&data), ReviewStep::Leader);

        data.leader_step_closed = date(6);
        assert_eq!(step_of(&data), ReviewStep::Approver);

        data.review_end_date = date(8);
        assert_eq!(step_of(&data), ReviewStep::Closed);
    }

    #[test]
    fn steps_close_strictly_in_order() {
        // Leader cannot close before the reviewer step.
        assert!(match check_close_ordering(
            ReviewStep::Reviewer, ReviewRole::Leader,
        ) {
            Err(CloseStepError::ReviewersStepOpen) => true,
            _ => false,
        });

        // Approver cannot close before the leader step.
        assert!(match check_close_ordering(
            ReviewStep::Leader, ReviewRole::Approver,
        ) {
            Err(CloseStepError::LeaderStepOpen) => true,
            _ => false,
        });

        assert!(check_close_ordering(
            ReviewStep::Reviewer, ReviewRole::Reviewer).is_ok());
        assert!(check_close_ordering(
            ReviewStep::Leader, ReviewRole::Leader).is_ok());
        assert!(check_close_ordering(
            ReviewStep::Approver, ReviewRole::Approver).is_ok());
    }

    #[test]
    fn closed_steps_cannot_close_again() {
        let mut data = revision();
        data.review_start_date = date(1);
        data.reviewers_step_closed = date(4);

        assert!(match check_close_ordering(
            step_of(&data), ReviewRole::Reviewer,
        ) {
            Err(CloseStepError::AlreadyClosed) => true,
            _ => false,
        });
    }

    #[test]
    fn nothing_closes_before_the_round_starts() {
        assert!(match check_close_ordering(
            ReviewStep::Pending, ReviewRole::Reviewer,
        ) {
            Err(CloseStepError::NotUnderReview) => true,
            _ => false,
        });
    }

    #[test]
    fn file_name_includes_zero_padded_revision() {
        let document = db::Document {
            id: 1,
            category: 1,
            document_key: "FAC10005-CTR-000-EXP-LAY-4891".to_string(),
            title: "Layout".to_string(),
            current_revision: 1,
        };
        let revision = Revision::from_db(revision(), document);

        assert_eq!(
            revision.file_name("pdf"),
            "FAC10005-CTR-000-EXP-LAY-4891_01.pdf",
        );
    }
}
