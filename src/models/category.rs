use diesel::{
    prelude::*,
    result::{DatabaseErrorKind, Error as DbError},
};

use crate::{
    WorkflowError,
    db::{
        Connection,
        models as db,
        schema::{categories, category_contracts, category_third_parties},
        types::CategoryKind,
    },
};

/// A category groups documents sharing an originator, a metadata
/// vocabulary, and a document kind.
#[derive(Debug)]
pub struct Category {
    data: db::Category,
}

impl Category {
    /// Get all categories.
    pub fn all(dbcon: &Connection) -> Result<Vec<Category>, DbError> {
        categories::table
            .get_results::<db::Category>(dbcon)
            .map(|v| v.into_iter().map(|data| Category { data }).collect())
    }

    /// Find a category by ID.
    pub fn by_id(dbcon: &Connection, id: i32)
    -> Result<Category, FindCategoryError> {
        categories::table
            .filter(categories::id.eq(id))
            .get_result::<db::Category>(dbcon)
            .optional()?
            .ok_or(FindCategoryError::NotFound)
            .map(|data| Category { data })
    }

    /// Find a category by name.
    pub fn by_name(dbcon: &Connection, name: &str)
    -> Result<Category, FindCategoryError> {
        categories::table
            .filter(categories::name.eq(name))
            .get_result::<db::Category>(dbcon)
            .optional()?
            .ok_or(FindCategoryError::NotFound)
            .map(|data| Category { data })
    }

    /// Create a new category.
    pub fn create(
        dbcon: &Connection,
        name: &str,
        originator: &str,
        kind: CategoryKind,
    ) -> Result<Category, CreateCategoryError> {
        diesel::insert_into(categories::table)
            .values(db::NewCategory { name, originator, kind })
            .get_result::<db::Category>(dbcon)
            .map(|data| Category { data })
            .map_err(Into::into)
    }

    /// Contract numbers covered by this category.
    pub fn contracts(&self, dbcon: &Connection) -> Result<Vec<String>, DbError> {
        category_contracts::table
            .filter(category_contracts::category.eq(self.data.id))
            .get_results::<db::CategoryContract>(dbcon)
            .map(|v| v.into_iter().map(|c| c.contract_number).collect())
    }

    /// Register a contract number with this category.
    pub fn add_contract(&self, dbcon: &Connection, contract_number: &str)
    -> Result<(), DbError> {
        diesel::insert_into(category_contracts::table)
            .values(&db::CategoryContract {
                category: self.data.id,
                contract_number: contract_number.to_string(),
            })
            .on_conflict_do_nothing()
            .execute(dbcon)?;
        Ok(())
    }

    /// Link a third-party entity to this category, allowing it to receive
    /// transmittals of this category's documents.
    pub fn link_third_party(&self, dbcon: &Connection, entity: i32)
    -> Result<(), DbError> {
        diesel::insert_into(category_third_parties::table)
            .values(&db::CategoryThirdParty {
                category: self.data.id,
                entity,
            })
            .on_conflict_do_nothing()
            .execute(dbcon)?;
        Ok(())
    }

    /// Check whether an entity is linked to this category.
    pub fn is_linked_to(&self, dbcon: &Connection, entity: i32)
    -> Result<bool, DbError> {
        category_third_parties::table
            .filter(category_third_parties::category.eq(self.data.id)
                .and(category_third_parties::entity.eq(entity)))
            .count()
            .get_result::<i64>(dbcon)
            .map(|count| count > 0)
    }

    /// Check whether a contract number belongs to this category.
    pub fn has_contract(&self, dbcon: &Connection, contract_number: &str)
    -> Result<bool, DbError> {
        category_contracts::table
            .filter(category_contracts::category.eq(self.data.id)
                .and(category_contracts::contract_number.eq(contract_number)))
            .count()
            .get_result::<i64>(dbcon)
            .map(|count| count > 0)
    }
}

impl std::ops::Deref for Category {
    type Target = db::Category;

    fn deref(&self) -> &db::Category {
        &self.data
    }
}

#[derive(WorkflowError, Debug, Fail)]
pub enum FindCategoryError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// No category found matching given criteria.
    #[fail(display = "No such category")]
    #[workflow(code = "category:not-found")]
    NotFound,
}

impl_from! { for FindCategoryError ;
    DbError => |e| FindCategoryError::Database(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum CreateCategoryError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// Duplicate category.
    #[fail(display = "Category already exists")]
    #[workflow(code = "category:exists")]
    Duplicate,
}

impl_from! { for CreateCategoryError ;
    DbError => |e| match e {
        DbError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) =>
            CreateCategoryError::Duplicate,
        e => CreateCategoryError::Database(e),
    },
}
