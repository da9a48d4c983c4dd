use diesel::{
    Connection as _Connection,
    prelude::*,
    result::{DatabaseErrorKind, Error as DbError},
};

use crate::{
    WorkflowError,
    db::{
        Connection,
        models as db,
        schema::{
            distribution_list_categories,
            distribution_list_reviewers,
            distribution_lists,
            users,
        },
    },
};
use super::Category;

/// A named, reusable set of reviewer, leader, and approver assignments.
///
/// Lists are templates: applying one copies its current membership onto
/// a revision. Later edits to the list never alter rounds already seeded
/// from it.
#[derive(Debug)]
pub struct DistributionList {
    data: db::DistributionList,
}

/// A snapshot of a distribution list's membership.
#[derive(Debug)]
pub struct Membership {
    pub leader: db::User,
    pub approver: Option<db::User>,
    pub reviewers: Vec<db::User>,
}

/// One row of a distribution list import sheet, with roles already
/// resolved to user emails.
#[derive(Debug)]
pub struct ImportRow {
    pub list: String,
    pub leader: Option<String>,
    pub approver: Option<String>,
    pub reviewers: Vec<String>,
}

impl DistributionList {
    /// Find a distribution list by ID.
    pub fn by_id(dbcon: &Connection, id: i32)
    -> Result<DistributionList, FindListError> {
        distribution_lists::table
            .filter(distribution_lists::id.eq(id))
            .get_result::<db::DistributionList>(dbcon)
            .optional()?
            .ok_or(FindListError::NotFound)
            .map(|data| DistributionList { data })
    }

    /// Find a distribution list by name.
    pub fn by_name(dbcon: &Connection, name: &str)
    -> Result<DistributionList, FindListError> {
        distribution_lists::table
            .filter(distribution_lists::name.eq(name))
            .get_result::<db::DistributionList>(dbcon)
            .optional()?
            .ok_or(FindListError::NotFound)
            .map(|data| DistributionList { data })
    }

    /// Get all lists usable in a category.
    pub fn all_of(dbcon: &Connection, category: i32)
    -> Result<Vec<DistributionList>, DbError> {
        distribution_list_categories::table
            .filter(distribution_list_categories::category.eq(category))
            .inner_join(distribution_lists::table)
            .get_results::<(db::DistributionListCategory, db::DistributionList)>(
                dbcon)
            .map(|v| {
                v.into_iter()
                    .map(|(_, data)| DistributionList { data })
                    .collect()
            })
    }

    /// Create a distribution list, or update the one with this name.
    ///
    /// External users are rejected from every role.
    pub fn create_or_update(
        dbcon: &Connection,
        name: &str,
        category: &Category,
        leader: &db::User,
        approver: Option<&db::User>,
        reviewers: &[db::User],
    ) -> Result<DistributionList, CreateListError> {
        let members = std::iter::once(leader)
            .chain(approver)
            .chain(reviewers);
        ensure_internal(members)?;

        dbcon.transaction(|| {
            let existing = distribution_lists::table
                .filter(distribution_lists::name.eq(name))
                .get_result::<db::DistributionList>(dbcon)
                .optional()?;

            let data = match existing {
                Some(list) => {
                    diesel::delete(distribution_list_reviewers::table
                        .filter(distribution_list_reviewers::list.eq(list.id)))
                        .execute(dbcon)?;

                    diesel::update(&list)
                        .set((
                            distribution_lists::leader.eq(leader.id),
                            distribution_lists::approver
                                .eq(approver.map(|user| user.id)),
                        ))
                        .get_result::<db::DistributionList>(dbcon)?
                }
                None => {
                    diesel::insert_into(distribution_lists::table)
                        .values(db::NewDistributionList {
                            name,
                            leader: leader.id,
                            approver: approver.map(|user| user.id),
                        })
                        .get_result::<db::DistributionList>(dbcon)?
                }
            };

            let links = reviewers.iter()
                .map(|user| db::DistributionListReviewer {
                    list: data.id,
                    user: user.id,
                })
                .collect::<Vec<_>>();

            diesel::insert_into(distribution_list_reviewers::table)
                .values(&links)
                .execute(dbcon)?;

            diesel::insert_into(distribution_list_categories::table)
                .values(&db::DistributionListCategory {
                    list: data.id,
                    category: category.id,
                })
                .on_conflict_do_nothing()
                .execute(dbcon)?;

            Ok(DistributionList { data })
        })
    }

    /// Copy this list's current membership into a [`Membership`] snapshot.
    ///
    /// Fails if the list is not usable in the given category. The snapshot
    /// is detached: edits to the list made after this call do not affect
    /// it.
    pub fn resolve(&self, dbcon: &Connection, category: &Category)
    -> Result<Membership, ResolveListError> {
        let linked = distribution_list_categories::table
            .filter(distribution_list_categories::list.eq(self.data.id)
                .and(distribution_list_categories::category.eq(category.id)))
            .count()
            .get_result::<i64>(dbcon)?;

        if linked == 0 {
            return Err(ResolveListError::NotFound);
        }

        let leader = users::table
            .filter(users::id.eq(self.data.leader))
            .get_result::<db::User>(dbcon)?;

        let approver = match self.data.approver {
            Some(id) => Some(users::table
                .filter(users::id.eq(id))
                .get_result::<db::User>(dbcon)?),
            None => None,
        };

        let reviewers = distribution_list_reviewers::table
            .filter(distribution_list_reviewers::list.eq(self.data.id))
            .inner_join(users::table)
            .get_results::<(db::DistributionListReviewer, db::User)>(dbcon)?
            .into_iter()
            .map(|(_, user)| user)
            .collect::<Vec<_>>();

        // Users may have been marked external after the list was created.
        let members = std::iter::once(&leader)
            .chain(&approver)
            .chain(&reviewers);
        ensure_internal(members)?;

        Ok(Membership { leader, approver, reviewers })
    }

    /// Import distribution lists from parsed sheet rows.
    ///
    /// Each row names a list and assigns users, by email, to the three
    /// roles. Existing lists are updated; a row without a leader is
    /// rejected.
    pub fn import(
        dbcon: &Connection,
        category: &Category,
        rows: &[ImportRow],
    ) -> Result<Vec<DistributionList>, ImportListsError> {
        let mut lists = Vec::with_capacity(rows.len());

        for row in rows {
            let leader = match row.leader {
                Some(ref email) => find_member(dbcon, email)?,
                None => return Err(ImportListsError::MissingLeader(
                    row.list.clone())),
            };

            let approver = match row.approver {
                Some(ref email) => Some(find_member(dbcon, email)?),
                None => None,
            };

            let reviewers = row.reviewers.iter()
                .map(|email| find_member(dbcon, email))
                .collect::<Result<Vec<_>, _>>()?;

            let list = DistributionList::create_or_update(
                dbcon,
                &row.list,
                category,
                &leader,
                approver.as_ref(),
                &reviewers,
            )?;

            lists.push(list);
        }

        Ok(lists)
    }
}

fn find_member(dbcon: &Connection, email: &str)
-> Result<db::User, ImportListsError> {
    users::table
        .filter(users::email.eq(email))
        .get_result::<db::User>(dbcon)
        .optional()?
        .ok_or_else(|| ImportListsError::UnknownUser(email.to_string()))
}

/// Check that no member of a distribution is an external user.
pub(super) fn ensure_internal<'u, I>(users: I) -> Result<(), InvalidUserError>
where
    I: IntoIterator<Item = &'u db::User>,
{
    for user in users {
        if user.is_external {
            return Err(InvalidUserError {
                email: user.email.clone(),
            });
        }
    }

    Ok(())
}

impl std::ops::Deref for DistributionList {
    type Target = db::DistributionList;

    fn deref(&self) -> &db::DistributionList {
        &self.data
    }
}

/// An external user was assigned a review role.
#[derive(WorkflowError, Debug, Fail)]
#[workflow(code = "distribution-list:invalid-user")]
#[fail(display = "External user {} cannot take part in reviews", email)]
pub struct InvalidUserError {
    email: String,
}

#[derive(WorkflowError, Debug, Fail)]
pub enum FindListError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// No distribution list found matching given criteria.
    #[fail(display = "No such distribution list")]
    #[workflow(code = "distribution-list:not-found")]
    NotFound,
}

impl_from! { for FindListError ;
    DbError => |e| FindListError::Database(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum CreateListError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// Duplicate distribution list.
    #[fail(display = "Distribution list already exists")]
    #[workflow(code = "distribution-list:exists")]
    Duplicate,
    /// An external user was assigned a role.
    #[fail(display = "{}", _0)]
    External(#[cause] InvalidUserError),
}

impl_from! { for CreateListError ;
    DbError => |e| match e {
        DbError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) =>
            CreateListError::Duplicate,
        e => CreateListError::Database(e),
    },
    InvalidUserError => |e| CreateListError::External(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum ResolveListError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// The list does not exist, or is not usable in this category.
    #[fail(display = "No such distribution list in this category")]
    #[workflow(code = "distribution-list:not-found")]
    NotFound,
    /// A member of the list is an external user.
    #[fail(display = "{}", _0)]
    External(#[cause] InvalidUserError),
}

impl_from! { for ResolveListError ;
    DbError => |e| ResolveListError::Database(e),
    InvalidUserError => |e| ResolveListError::External(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum ImportListsError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// A row assigns a role to an unknown email address.
    #[fail(display = "No user with email {}", _0)]
    #[workflow(code = "user:not-found")]
    UnknownUser(String),
    /// A row has no leader.
    #[fail(display = "List {} has no leader", _0)]
    #[workflow(code = "distribution-list:missing-leader")]
    MissingLeader(String),
    /// Creating or updating a list failed.
    #[fail(display = "{}", _0)]
    List(#[cause] CreateListError),
}

impl_from! { for ImportListsError ;
    DbError => |e| ImportListsError::Database(e),
    CreateListError => |e| ImportListsError::List(e),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i32, email: &str, is_external: bool) -> db::User {
        db::User {
            id,
            email: email.to_string(),
            name: email.to_string(),
            is_external,
            entity: None,
            permissions: 0,
        }
    }

    #[test]
    fn internal_members_are_accepted() {
        let members = [
            user(1, "leader@example.com", false),
            user(2, "reviewer@example.com", false),
        ];

        assert!(ensure_internal(&members).is_ok());
    }

    #[test]
    fn external_members_are_rejected() {
        let members = [
            user(1, "leader@example.com", false),
            user(2, "third-party@example.com", true),
        ];

        let err = ensure_internal(&members).unwrap_err();
        assert_eq!(
            err.code().as_ref().map(|c| c.as_ref()),
            Some("distribution-list:invalid-user"),
        );
    }
}
