use diesel::{
    prelude::*,
    result::{DatabaseErrorKind, Error as DbError},
};

use crate::{
    WorkflowError,
    db::{
        Connection,
        models as db,
        schema::entities,
    },
};

/// A third-party organisation taking part in the project, for example
/// a contractor or a client.
#[derive(Debug)]
pub struct Entity {
    data: db::Entity,
}

impl Entity {
    /// Get all entities.
    pub fn all(dbcon: &Connection) -> Result<Vec<Entity>, DbError> {
        entities::table
            .get_results::<db::Entity>(dbcon)
            .map(|v| v.into_iter().map(|data| Entity { data }).collect())
    }

    /// Find an entity by ID.
    pub fn by_id(dbcon: &Connection, id: i32) -> Result<Entity, FindEntityError> {
        entities::table
            .filter(entities::id.eq(id))
            .get_result::<db::Entity>(dbcon)
            .optional()?
            .ok_or(FindEntityError::NotFound)
            .map(|data| Entity { data })
    }

    /// Find an entity by its trigram.
    pub fn by_trigram(dbcon: &Connection, trigram: &str)
    -> Result<Entity, FindEntityError> {
        entities::table
            .filter(entities::trigram.eq(trigram))
            .get_result::<db::Entity>(dbcon)
            .optional()?
            .ok_or(FindEntityError::NotFound)
            .map(|data| Entity { data })
    }

    /// Create a new entity.
    pub fn create(dbcon: &Connection, trigram: &str, name: &str)
    -> Result<Entity, CreateEntityError> {
        diesel::insert_into(entities::table)
            .values(db::NewEntity { trigram, name })
            .get_result::<db::Entity>(dbcon)
            .map(|data| Entity { data })
            .map_err(Into::into)
    }

    /// Get all users belonging to this entity.
    pub fn members(&self, dbcon: &Connection) -> Result<Vec<db::User>, DbError> {
        use crate::db::schema::users;

        users::table
            .filter(users::entity.eq(self.data.id))
            .get_results::<db::User>(dbcon)
    }
}

impl std::ops::Deref for Entity {
    type Target = db::Entity;

    fn deref(&self) -> &db::Entity {
        &self.data
    }
}

#[derive(WorkflowError, Debug, Fail)]
pub enum FindEntityError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// No entity found matching given criteria.
    #[fail(display = "No such entity")]
    #[workflow(code = "entity:not-found")]
    NotFound,
}

impl_from! { for FindEntityError ;
    DbError => |e| FindEntityError::Database(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum CreateEntityError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// Duplicate entity.
    #[fail(display = "Entity already exists")]
    #[workflow(code = "entity:exists")]
    Duplicate,
}

impl_from! { for CreateEntityError ;
    DbError => |e| match e {
        DbError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) =>
            CreateEntityError::Duplicate,
        e => CreateEntityError::Database(e),
    },
}
