use diesel::{
    prelude::*,
    result::{DatabaseErrorKind, Error as DbError},
};

use crate::{
    WorkflowError,
    db::{
        Connection,
        models as db,
        schema::users,
    },
    permissions::PermissionBits,
};

/// A single user in the system.
#[derive(Debug)]
pub struct User {
    data: db::User,
}

impl User {
    /// Construct `User` from its database counterpart.
    pub(super) fn from_db(data: db::User) -> User {
        User { data }
    }

    /// Get all users.
    pub fn all(dbcon: &Connection) -> Result<Vec<User>, DbError> {
        users::table
            .get_results::<db::User>(dbcon)
            .map(|v| v.into_iter().map(|data| User { data }).collect())
    }

    /// Find a user by ID.
    pub fn by_id(dbcon: &Connection, id: i32) -> Result<User, FindUserError> {
        users::table
            .filter(users::id.eq(id))
            .get_result::<db::User>(dbcon)
            .optional()?
            .ok_or(FindUserError::NotFound)
            .map(|data| User { data })
    }

    /// Find a user by email address.
    pub fn by_email(dbcon: &Connection, email: &str)
    -> Result<User, FindUserError> {
        users::table
            .filter(users::email.eq(email))
            .get_result::<db::User>(dbcon)
            .optional()?
            .ok_or(FindUserError::NotFound)
            .map(|data| User { data })
    }

    /// Create a new user.
    pub fn create(
        dbcon: &Connection,
        email: &str,
        name: &str,
        is_external: bool,
        entity: Option<i32>,
        permissions: PermissionBits,
    ) -> Result<User, CreateUserError> {
        diesel::insert_into(users::table)
            .values(db::NewUser {
                email,
                name,
                is_external,
                entity,
                permissions: permissions.bits(),
            })
            .get_result::<db::User>(dbcon)
            .map(|data| User { data })
            .map_err(Into::into)
    }

    /// Permissions this user has.
    pub fn permissions(&self) -> PermissionBits {
        PermissionBits::from_bits_truncate(self.data.permissions)
    }

    /// Unwrap into the underlying database row.
    pub fn into_db(self) -> db::User {
        self.data
    }
}

impl std::ops::Deref for User {
    type Target = db::User;

    fn deref(&self) -> &db::User {
        &self.data
    }
}

#[derive(WorkflowError, Debug, Fail)]
pub enum FindUserError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// No user found matching given criteria.
    #[fail(display = "No such user")]
    #[workflow(code = "user:not-found")]
    NotFound,
}

impl_from! { for FindUserError ;
    DbError => |e| FindUserError::Database(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum CreateUserError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// Duplicate user.
    #[fail(display = "User already exists")]
    #[workflow(code = "user:exists")]
    Duplicate,
}

impl_from! { for CreateUserError ;
    DbError => |e| match e {
        DbError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) =>
            CreateUserError::Duplicate,
        e => CreateUserError::Database(e),
    },
}
