use chrono::{Duration, Utc};
use diesel::{
    Connection as _Connection,
    prelude::*,
    result::Error as DbError,
};
use std::{fs, io::Write, path::PathBuf};
use uuid::Uuid;

use crate::{
    WorkflowError,
    config,
    db::{
        Connection,
        models as db,
        schema::{documents, exports, revisions},
        types::{ExportFormat, ExportStatus},
    },
};

/// A request to export a category's document register, processed by
/// a background worker outside any workflow transaction.
#[derive(Debug)]
pub struct Export {
    data: db::Export,
}

impl Export {
    /// Find an export by ID.
    pub fn by_id(dbcon: &Connection, id: Uuid)
    -> Result<Export, FindExportError> {
        exports::table
            .filter(exports::id.eq(id))
            .get_result::<db::Export>(dbcon)
            .optional()?
            .ok_or(FindExportError::NotFound)
            .map(|data| Export { data })
    }

    /// Enqueue a new export request.
    pub fn create(
        dbcon: &Connection,
        owner: i32,
        category: i32,
        format: ExportFormat,
    ) -> Result<Export, DbError> {
        diesel::insert_into(exports::table)
            .values(db::NewExport {
                id: Uuid::new_v4(),
                owner,
                category,
                format,
            })
            .get_result::<db::Export>(dbcon)
            .map(|data| Export { data })
    }

    /// Claim the oldest queued export for processing.
    ///
    /// The row is locked and moved to processing within one transaction,
    /// so concurrent workers never claim the same request.
    pub fn take_pending(dbcon: &Connection)
    -> Result<Option<Export>, DbError> {
        dbcon.transaction(|| {
            let row = exports::table
                .filter(exports::status.eq(ExportStatus::New))
                .order(exports::created_on.asc())
                .for_update()
                .first::<db::Export>(dbcon)
                .optional()?;

            let row = match row {
                Some(row) => row,
                None => return Ok(None),
            };

            diesel::update(&row)
                .set(exports::status.eq(ExportStatus::Processing))
                .get_result::<db::Export>(dbcon)
                .map(|data| Some(Export { data }))
        })
    }

    /// Is the generated file ready for download?
    pub fn is_ready(&self) -> bool {
        self.data.status == ExportStatus::Done
    }

    /// Name the generated file is stored under.
    pub fn file_name(&self) -> String {
        format!("export_{}_{}.{}",
            self.data.created_on.format("%Y%m%d"),
            self.data.id,
            self.data.format)
    }

    /// Generate the export file.
    ///
    /// Writes one line per document of the category, with its current
    /// revision's review outcome.
    pub fn write_file(&self, dbcon: &Connection, cfg: &config::Storage)
    -> Result<PathBuf, WriteExportError> {
        let docs = documents::table
            .filter(documents::category.eq(self.data.category))
            .order(documents::document_key.asc())
            .get_results::<db::Document>(dbcon)?;

        fs::create_dir_all(&cfg.exports)?;
        let path = cfg.exports.join(self.file_name());
        let mut file = fs::File::create(&path)?;

        writeln!(file, "document_key,title,revision,status,return_code")?;

        for doc in docs {
            let revision = revisions::table
                .filter(revisions::document.eq(doc.id)
                    .and(revisions::revision.eq(doc.current_revision)))
                .get_result::<db::Revision>(dbcon)?;

            writeln!(
                file,
                "{},{},{:02},{},{}",
                doc.document_key,
                doc.title,
                revision.revision,
                revision.status,
                revision.return_code.as_ref().map(String::as_str).unwrap_or(""),
            )?;
        }

        Ok(path)
    }

    /// Mark this export as completed.
    pub fn mark_done(&mut self, dbcon: &Connection) -> Result<(), DbError> {
        let data = diesel::update(&self.data)
            .set(exports::status.eq(ExportStatus::Done))
            .get_result::<db::Export>(dbcon)?;
        self.data = data;
        Ok(())
    }

    /// Delete exports stuck in processing.
    ///
    /// A worker crash leaves its claimed request in processing forever;
    /// deleting old ones lets the owner enqueue a fresh request.
    pub fn cleanup_stale(dbcon: &Connection, max_age: Duration)
    -> Result<usize, DbError> {
        let cutoff = Utc::now().naive_utc() - max_age;

        diesel::delete(exports::table
            .filter(exports::status.eq(ExportStatus::Processing)
                .and(exports::created_on.lt(cutoff))))
            .execute(dbcon)
    }
}

impl std::ops::Deref for Export {
    type Target = db::Export;

    fn deref(&self) -> &db::Export {
        &self.data
    }
}

#[derive(WorkflowError, Debug, Fail)]
pub enum FindExportError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// No export found matching given criteria.
    #[fail(display = "No such export")]
    #[workflow(code = "export:not-found")]
    NotFound,
}

impl_from! { for FindExportError ;
    DbError => |e| FindExportError::Database(e),
}

#[derive(Debug, Fail)]
pub enum WriteExportError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    Database(#[cause] DbError),
    /// Error writing the file.
    #[fail(display = "{}", _0)]
    Io(#[cause] std::io::Error),
}

impl_from! { for WriteExportError ;
    DbError => |e| WriteExportError::Database(e),
    std::io::Error => |e| WriteExportError::Io(e),
}
