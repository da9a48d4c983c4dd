use chrono::Utc;
use diesel::{
    Connection as _Connection,
    prelude::*,
    result::Error as DbError,
};

use crate::{
    WorkflowError,
    db::{
        Connection,
        models as db,
        schema::{
            documents,
            exported_revisions,
            outgoing_transmittals,
            revisions,
        },
        types::CategoryKind,
    },
    events::{self, TransmittalCreated},
};
use super::{Category, Entity, Revision};

/// Status given to the single revision of a transmittal's own document.
const TRANSMITTAL_STATUS: &str = "TRS";

/// A formal package of document revisions sent from one organisation to
/// another, with acknowledgement tracking.
#[derive(Debug)]
pub struct OutgoingTransmittal {
    data: db::OutgoingTransmittal,
    document: db::Document,
}

/// Key a transmittal document is filed under.
pub fn transmittal_key(
    contract_number: &str,
    originator: &str,
    recipient: &str,
    sequential_number: i32,
) -> String {
    format!("{}-{}-{}-TRS-{:05}",
        contract_number, originator, recipient, sequential_number)
}

/// Can `user` acknowledge receipt of a transmittal addressed to
/// `recipient`?
fn can_acknowledge(user: &db::User, recipient: i32) -> bool {
    user.is_external && user.entity == Some(recipient)
}

impl OutgoingTransmittal {
    /// Find a transmittal by ID.
    pub fn by_id(dbcon: &Connection, id: i32)
    -> Result<OutgoingTransmittal, FindTransmittalError> {
        outgoing_transmittals::table
            .filter(outgoing_transmittals::id.eq(id))
            .inner_join(documents::table)
            .get_result::<(db::OutgoingTransmittal, db::Document)>(dbcon)
            .optional()?
            .ok_or(FindTransmittalError::NotFound)
            .map(|(data, document)| OutgoingTransmittal { data, document })
    }

    /// Find a transmittal by its document key.
    pub fn by_key(dbcon: &Connection, key: &str)
    -> Result<OutgoingTransmittal, FindTransmittalError> {
        outgoing_transmittals::table
            .inner_join(documents::table)
            .filter(documents::document_key.eq(key))
            .get_result::<(db::OutgoingTransmittal, db::Document)>(dbcon)
            .optional()?
            .ok_or(FindTransmittalError::NotFound)
            .map(|(data, document)| OutgoingTransmittal { data, document })
    }

    /// Get all transmittals awaiting acknowledgement.
    pub fn pending_ack(dbcon: &Connection)
    -> Result<Vec<OutgoingTransmittal>, DbError> {
        outgoing_transmittals::table
            .inner_join(documents::table)
            .filter(outgoing_transmittals::ack_of_receipt_date.is_null())
            .order(outgoing_transmittals::created_on.asc())
            .get_results::<(db::OutgoingTransmittal, db::Document)>(dbcon)
            .map(|v| {
                v.into_iter()
                    .map(|(data, document)| OutgoingTransmittal {
                        data,
                        document,
                    })
                    .collect()
            })
    }

    /// Key this transmittal is filed under.
    pub fn key(&self) -> &str {
        &self.document.document_key
    }

    /// Has the recipient acknowledged receipt?
    pub fn is_acknowledged(&self) -> bool {
        self.data.ack_of_receipt_date.is_some()
    }

    /// Package a set of revisions into a new outgoing transmittal.
    ///
    /// Creates the transmittal's own document in `to_category`, and one
    /// snapshot row per packaged revision, recording each revision's
    /// status and return code at export time.
    pub fn create(
        dbcon: &Connection,
        from_category: &Category,
        to_category: &Category,
        revisions_to_send: &[Revision],
        recipient: &Entity,
        contract_number: &str,
    ) -> Result<OutgoingTransmittal, CreateTransmittalError> {
        if revisions_to_send.is_empty() {
            return Err(CreateTransmittalError::MissingRevisions);
        }

        if from_category.kind != CategoryKind::Deliverable {
            return Err(CreateTransmittalError::InvalidSourceCategory);
        }

        if to_category.kind != CategoryKind::Transmittal {
            return Err(CreateTransmittalError::InvalidDestinationCategory);
        }

        if !from_category.is_linked_to(dbcon, recipient.id)? {
            return Err(CreateTransmittalError::InvalidRecipient);
        }

        if !from_category.has_contract(dbcon, contract_number)? {
            return Err(CreateTransmittalError::InvalidContract);
        }

        for revision in revisions_to_send {
            if revision.document().category != from_category.id
                || !revision.can_be_transmitted(dbcon)?
            {
                return Err(CreateTransmittalError::InvalidRevisions(
                    revision.document().document_key.clone()));
            }
        }

        dbcon.transaction(|| {
            let last = outgoing_transmittals::table
                .select(diesel::dsl::max(
                    outgoing_transmittals::sequential_number))
                .filter(outgoing_transmittals::contract_number
                        .eq(contract_number)
                    .and(outgoing_transmittals::originator
                        .eq(&from_category.originator))
                    .and(outgoing_transmittals::recipient.eq(recipient.id)))
                .get_result::<Option<i32>>(dbcon)?;
            let sequential_number = last.unwrap_or(0) + 1;

            let key = transmittal_key(
                contract_number,
                &from_category.originator,
                &recipient.trigram,
                sequential_number,
            );

            let document = diesel::insert_into(documents::table)
                .values(db::NewDocument {
                    category: to_category.id,
                    document_key: &key,
                    title: &key,
                    current_revision: 1,
                })
                .get_result::<db::Document>(dbcon)?;

            diesel::insert_into(revisions::table)
                .values(db::NewRevision {
                    document: document.id,
                    revision: 1,
                    status: TRANSMITTAL_STATUS,
                    docclass: 1,
                    received_date: Utc::now().naive_utc().date(),
                    leader: None,
                    approver: None,
                })
                .execute(dbcon)?;

            let data = diesel::insert_into(outgoing_transmittals::table)
                .values(db::NewOutgoingTransmittal {
                    document: document.id,
                    revisions_category: from_category.id,
                    contract_number,
                    originator: &from_category.originator,
                    recipient: recipient.id,
                    sequential_number,
                })
                .get_result::<db::OutgoingTransmittal>(dbcon)?;

            let snapshots = revisions_to_send.iter()
                .map(|revision| db::NewExportedRevision {
                    transmittal: data.id,
                    document: revision.document().id,
                    revision: revision.revision,
                    title: &revision.document().title,
                    status: &revision.status,
                    return_code: revision.return_code.as_ref()
                        .map(String::as_str),
                })
                .collect::<Vec<_>>();

            diesel::insert_into(exported_revisions::table)
                .values(&snapshots)
                .execute(dbcon)?;

            let recipients = recipient.members(dbcon)?
                .into_iter()
                .map(|user| user.id)
                .collect::<Vec<_>>();
            events::emit(dbcon, &recipients, TransmittalCreated {
                transmittal: data.id,
                document: document.id,
            })?;

            Ok(OutgoingTransmittal { data, document })
        })
    }

    /// Snapshot rows of the revisions packaged in this transmittal.
    pub fn revisions(&self, dbcon: &Connection)
    -> Result<Vec<db::ExportedRevision>, DbError> {
        exported_revisions::table
            .filter(exported_revisions::transmittal.eq(self.data.id))
            .order(exported_revisions::id.asc())
            .get_results::<db::ExportedRevision>(dbcon)
    }

    /// Record the recipient's acknowledgement of receipt.
    ///
    /// Only a member of the recipient organisation can acknowledge, and
    /// only once; the stored date and author never change afterwards.
    pub fn acknowledge(&mut self, dbcon: &Connection, user: &db::User)
    -> Result<(), AckError> {
        if !can_acknowledge(user, self.data.recipient) {
            return Err(AckError::Forbidden);
        }

        if self.is_acknowledged() {
            return Err(AckError::AlreadyAcknowledged);
        }

        // The conditional update makes the transition atomic: of two
        // concurrent calls only one finds the date still unset.
        let updated = diesel::update(outgoing_transmittals::table
            .filter(outgoing_transmittals::id.eq(self.data.id)
                .and(outgoing_transmittals::ack_of_receipt_date.is_null())))
            .set((
                outgoing_transmittals::ack_of_receipt_date
                    .eq(Utc::now().naive_utc()),
                outgoing_transmittals::ack_of_receipt_author.eq(user.id),
            ))
            .get_result::<db::OutgoingTransmittal>(dbcon)
            .optional()?;

        match updated {
            Some(data) => {
                self.data = data;
                Ok(())
            }
            None => Err(AckError::AlreadyAcknowledged),
        }
    }
}

/// Propagate a revision edit into the snapshots held by transmittals the
/// recipient has not acknowledged yet.
///
/// Snapshots of acknowledged transmittals are frozen and never updated.
pub fn sync_on_revision_change(dbcon: &Connection, revision: &db::Revision)
-> Result<usize, DbError> {
    let targets = exported_revisions::table
        .inner_join(outgoing_transmittals::table)
        .filter(exported_revisions::document.eq(revision.document)
            .and(exported_revisions::revision.eq(revision.revision))
            .and(outgoing_transmittals::ack_of_receipt_date.is_null()))
        .select(exported_revisions::id)
        .get_results::<i32>(dbcon)?;

    if targets.is_empty() {
        return Ok(0);
    }

    diesel::update(exported_revisions::table
        .filter(exported_revisions::id.eq_any(&targets)))
        .set((
            exported_revisions::status.eq(&revision.status),
            exported_revisions::return_code.eq(revision.return_code.as_ref()),
        ))
        .execute(dbcon)
}

impl std::ops::Deref for OutgoingTransmittal {
    type Target = db::OutgoingTransmittal;

    fn deref(&self) -> &db::OutgoingTransmittal {
        &self.data
    }
}

#[derive(WorkflowError, Debug, Fail)]
pub enum FindTransmittalError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// No transmittal found matching given criteria.
    #[fail(display = "No such transmittal")]
    #[workflow(code = "transmittal:not-found")]
    NotFound,
}

impl_from! { for FindTransmittalError ;
    DbError => |e| FindTransmittalError::Database(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum CreateTransmittalError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// No revisions were given.
    #[fail(display = "Please provide a list of revisions to transmit")]
    #[workflow(code = "transmittal:missing-revisions")]
    MissingRevisions,
    /// The source category does not hold transmittable documents.
    #[fail(display = "Source category must contain transmittable documents")]
    #[workflow(code = "transmittal:invalid-category")]
    InvalidSourceCategory,
    /// The destination category does not hold transmittals.
    #[fail(display = "Destination category must contain transmittals")]
    #[workflow(code = "transmittal:invalid-category")]
    InvalidDestinationCategory,
    /// The recipient is not linked to the source category.
    #[fail(display = "Recipient is not linked to the document category")]
    #[workflow(code = "transmittal:invalid-recipient")]
    InvalidRecipient,
    /// The contract number is not covered by the source category.
    #[fail(display = "Contract number is not linked to the document category")]
    #[workflow(code = "transmittal:invalid-contract")]
    InvalidContract,
    /// A revision is not transmittable.
    #[fail(display = "Revision of {} cannot be transmitted", _0)]
    #[workflow(code = "transmittal:invalid-revisions")]
    InvalidRevisions(String),
}

impl_from! { for CreateTransmittalError ;
    DbError => |e| CreateTransmittalError::Database(e),
}

#[derive(WorkflowError, Debug, Fail)]
pub enum AckError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[workflow(internal)]
    Database(#[cause] DbError),
    /// The acting user does not belong to the recipient organisation.
    #[fail(display = "Only the recipient can acknowledge receipt")]
    #[workflow(code = "transmittal:forbidden")]
    Forbidden,
    /// Receipt was already acknowledged.
    #[fail(display = "Receipt was already acknowledged")]
    #[workflow(code = "transmittal:already-acked")]
    AlreadyAcknowledged,
}

impl_from! { for AckError ;
    DbError => |e| AckError::Database(e),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_format_pads_sequential_number() {
        assert_eq!(
            transmittal_key("FAC10005", "CTR", "CLT", 12),
            "FAC10005-CTR-CLT-TRS-00012",
        );
    }

    fn user(is_external: bool, entity: Option<i32>) -> db::User {
        db::User {
            id: 1,
            email: "user@example.com".to_string(),
            name: "User".to_string(),
            is_external,
            entity,
            permissions: 0,
        }
    }

    #[test]
    fn only_recipient_members_can_acknowledge() {
        assert!(can_acknowledge(&user(true, Some(4)), 4));
        // Wrong organisation.
        assert!(!can_acknowledge(&user(true, Some(5)), 4));
        // Internal users never acknowledge, even in the right entity.
        assert!(!can_acknowledge(&user(false, Some(4)), 4));
        assert!(!can_acknowledge(&user(true, None), 4));
    }
}
