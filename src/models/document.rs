use chrono::NaiveDate;
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
        schema::{documents, revision_reviewers, revisions},
    },
};
use super::{Category, Revision};

/// A deliverable document: an immutable identity owning an ordered
/// sequence of revisions.
#[derive(Debug)]
pub struct Document {
    data: db::Document,
}

impl Document {
    /// Construct `Document` from its database counterpart.
    pub(super) fn from_db(data: db::Document) -> Document {
        Document { data }
    }

    /// Find a document by ID.
    pub fn by_id(dbcon: &Connection, id: i32)
    -> Result<Document, FindDocumentError> {
        documents::table
            .filter(documents::id.eq(id))
            .get_result::<db::Document>(dbcon)
            .optional()?
            .ok_or(FindDocumentError::NotFound)
            .map(|data| Document { data })
    }

    /// Find a document by its key.
    pub fn by_key(dbcon: &Connection, document_key: &str)
    -> Result<Document, FindDocumentError> {
        documents::table
            .filter(documents::document_key.eq(document_key))
            .get_result::<db::Document>(dbcon)
            .optional()?
            .ok_or(FindDocumentError::NotFound)
            .map(|data| Document { data })
    }

    /// Get all documents of a category.
    pub fn all_of(dbcon: &Connection, category: i32)
    -> Result<Vec<Document>, DbError> {
        documents::table
            .filter(documents::category.eq(category))
            .order(documents::document_key.asc())
            .get_results::<db::Document>(dbcon)
            .map(|v| v.into_iter().map(|data| Document { data }).collect())
    }

    /// Create a new document together with its first revision.
    ///
    /// Both rows are created in a single transaction; there is no
    /// intermediate state in which the document exists without a revision.
    pub fn create(
        dbcon: &Connection,
        category: &Category,
        document_key: &str,
        title: &str,
        status: &str,
        docclass: i32,
        received_date: NaiveDate,
    ) -> Result<(Document, Revision), CreateDocumentError> {
        dbcon.transaction(|| {
            let document = diesel::insert_into(documents::table)
                .values(db::NewDocument {
                    category: category.id,
                    document_key,
                    title,
                    current_revision: 1,
                })
                .get_result::<db::Document>(dbcon)?;

            let revision = diesel::insert_into(revisions::table)
                .values(db::NewRevision {
                    document: document.id,
                    revision: 1,
                    status,
                    docclass,
                    received_date,
                    leader: None,
                    approver: None,
                })
                .get_result::<db::Revision>(dbcon)?;

            Ok((
                Document { data: document.clone() },
                Revision::from_db(revision, document),
            ))
        })
    }

    /// Upload a new revision of this document.
    ///
    /// The new revision gets the next sequential number and becomes the
    /// document's current revision. The distribution assigned to the
    /// previous revision carries over as a starting point.
    pub fn add_revision(
        &mut self,
        dbcon: &Connection,
        status: &str,
        docclass: i32,
        received_date: NaiveDate,
    ) -> Result<Revision, DbError> {
        dbcon.transaction(|| {
            let previous = revisions::table
                .filter(revisions::document.eq(self.data.id)
                    .and(revisions::revision.eq(self.data.current_revision)))
                .get_result::<db::Revision>(dbcon)?;

            let number = self.data.current_revision + 1;

            let revision = diesel::insert_into(revisions::table)
                .values(db::NewRevision {
                    document: self.data.id,
                    revision: number,
                    status,
                    docclass,
                    received_date,
                    leader: previous.leader,
                    approver: previous.approver,
                })
                .get_result::<db::Revision>(dbcon)?;

            let reviewers = revision_reviewers::table
                .filter(revision_reviewers::revision.eq(previous.id))
                .get_results::<db::RevisionReviewer>(dbcon)?
                .into_iter()
                .map(|r| db::RevisionReviewer {
                    revision: revision.id,
                    user: r.user,
                })
                .collect::<Vec<_>>();

            diesel::insert_into(revision_reviewers::table)
                .values(&reviewers)
                .execute(dbcon)?;

            let data = diesel::update(&self.data)
                .set(documents::current_revision.eq(number))
                .get_result::<db::Document>(dbcon)?;
            self.data = data;

            Ok(Revision::from_db(revision, self.data.clone()))
        })
    }

    /// Get this document's current revision.
    pub fn current_revision(&self, dbcon: &Connection)
    -> Result<Revision, DbError> {
        self.revision(dbcon, self.data.current_revision)
    }

    /// Get a specific revision of this document.
    pub fn revision(&self, dbcon: &Connection, number: i32)
    -> Result<Revision, DbError> {
        revisions::table
            .filter(revisions::document.eq(self.data.id)
                .and(revisions::revision.eq(number)))
            .get_result::<db::Revision>(dbcon)
            .map(|data| Revision::from_db(data, self.data.clone()))
    }
}

impl std::ops::Deref for Document {
    type Target = db::Document;

    fn deref(&self) -> &db::Document {
        &self.data
    }
}

#[derive(WorkflowError, Debug, Fail)]
pub enum FindDocumentError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// No document found matching given criteria.
    #[fail(display = "No such document")]
    #[workflow(code = "document:not-found")]
    NotFound,
}

impl_from! { for FindDocumentError ;
    DbError => |e| FindDocumentError::Database(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum CreateDocumentError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// A document with this key already exists.
    #[fail(display = "Document already exists")]
    #[workflow(code = "document:exists")]
    Duplicate,
}

impl_from! { for CreateDocumentError ;
    DbError => |e| match e {
        DbError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) =>
            CreateDocumentError::Duplicate,
        e => CreateDocumentError::Database(e),
    },
}
