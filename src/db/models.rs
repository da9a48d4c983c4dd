use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::{
    schema::*,
    types::{CategoryKind, ExportFormat, ExportStatus, ReviewRole, ReviewStatus},
};

#[derive(Clone, Debug, Identifiable, Queryable)]
#[table_name = "entities"]
pub struct Entity {
    pub id: i32,
    /// Three-letter code identifying this organisation in document and
    /// transmittal keys.
    pub trigram: String,
    pub name: String,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "entities"]
pub struct NewEntity<'a> {
    pub trigram: &'a str,
    pub name: &'a str,
}

#[derive(Associations, Clone, Debug, Identifiable, Queryable)]
#[belongs_to(Entity, foreign_key = "entity")]
pub struct User {
    pub id: i32,
    /// User's email address. We use this for identification (e.g. on the
    /// command line) and communication.
    pub email: String,
    /// User's display name. This is visible to other users.
    pub name: String,
    /// Whether this user belongs to a third-party organisation. External
    /// users receive transmittals but never take part in reviews.
    pub is_external: bool,
    /// Organisation this user belongs to.
    pub entity: Option<i32>,
    /// Bitset of this user's permissions.
    pub permissions: i32,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "users"]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub is_external: bool,
    pub entity: Option<i32>,
    pub permissions: i32,
}

#[derive(Clone, Debug, Identifiable, Queryable)]
#[table_name = "categories"]
pub struct Category {
    pub id: i32,
    pub name: String,
    /// Trigram of the organisation originating this category's documents.
    pub originator: String,
    /// What kind of documents this category holds.
    pub kind: CategoryKind,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "categories"]
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub originator: &'a str,
    pub kind: CategoryKind,
}

#[derive(Clone, Debug, Identifiable, Insertable, Queryable)]
#[table_name = "category_contracts"]
#[primary_key(category, contract_number)]
pub struct CategoryContract {
    pub category: i32,
    pub contract_number: String,
}

#[derive(Clone, Copy, Debug, Identifiable, Insertable, Queryable)]
#[table_name = "category_third_parties"]
#[primary_key(category, entity)]
pub struct CategoryThirdParty {
    pub category: i32,
    pub entity: i32,
}

#[derive(Associations, Clone, Debug, Identifiable, Queryable)]
#[belongs_to(Category, foreign_key = "category")]
pub struct Document {
    pub id: i32,
    /// Category this document belongs to.
    pub category: i32,
    /// Key uniquely identifying this document across the project.
    pub document_key: String,
    pub title: String,
    /// Number of this document's current revision.
    pub current_revision: i32,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "documents"]
pub struct NewDocument<'a> {
    pub category: i32,
    pub document_key: &'a str,
    pub title: &'a str,
    pub current_revision: i32,
}

#[derive(Associations, Clone, Debug, Identifiable, Queryable)]
#[belongs_to(Document, foreign_key = "document")]
#[table_name = "revisions"]
pub struct Revision {
    pub id: i32,
    /// Document this is a revision of.
    pub document: i32,
    /// Revision number, starting at 1.
    pub revision: i32,
    /// Revision status, drawn from the configured vocabulary.
    pub status: String,
    /// Document class, selecting the review duration.
    pub docclass: i32,
    /// Final return code of the last closed review round.
    pub return_code: Option<String>,
    /// Date this revision was received from its originator.
    pub received_date: NaiveDate,
    /// User assigned as review leader.
    pub leader: Option<i32>,
    /// User assigned as review approver.
    pub approver: Option<i32>,
    pub review_start_date: Option<NaiveDate>,
    pub review_due_date: Option<NaiveDate>,
    pub reviewers_step_closed: Option<NaiveDate>,
    pub leader_step_closed: Option<NaiveDate>,
    pub review_end_date: Option<NaiveDate>,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "revisions"]
pub struct NewRevision<'a> {
    pub document: i32,
    pub revision: i32,
    pub status: &'a str,
    pub docclass: i32,
    pub received_date: NaiveDate,
    pub leader: Option<i32>,
    pub approver: Option<i32>,
}

#[derive(Clone, Copy, Debug, Identifiable, Insertable, Queryable)]
#[table_name = "revision_reviewers"]
#[primary_key(revision, user)]
pub struct RevisionReviewer {
    pub revision: i32,
    pub user: i32,
}

#[derive(Associations, Clone, Debug, Identifiable, Queryable)]
#[belongs_to(Document, foreign_key = "document")]
#[table_name = "reviews"]
pub struct Review {
    pub id: i32,
    /// Document under review.
    pub document: i32,
    /// Number of the revision under review.
    pub revision: i32,
    /// User this review belongs to.
    pub reviewer: i32,
    /// Role the user holds in the round.
    pub role: ReviewRole,
    pub status: ReviewStatus,
    pub docclass: i32,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    /// When this review's step was closed. Null while the step is open.
    pub closed_on: Option<NaiveDateTime>,
    /// When the reviewer last amended an already posted review.
    pub amended_on: Option<NaiveDateTime>,
    /// Path to the comments file, if the reviewer posted one.
    pub comments: Option<String>,
    pub return_code: Option<String>,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "reviews"]
pub struct NewReview<'a> {
    pub document: i32,
    pub revision: i32,
    pub reviewer: i32,
    pub role: ReviewRole,
    pub status: ReviewStatus,
    pub docclass: i32,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub comments: Option<&'a str>,
}

#[derive(Clone, Debug, Identifiable, Queryable)]
#[table_name = "distribution_lists"]
pub struct DistributionList {
    pub id: i32,
    pub name: String,
    pub leader: i32,
    pub approver: Option<i32>,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "distribution_lists"]
pub struct NewDistributionList<'a> {
    pub name: &'a str,
    pub leader: i32,
    pub approver: Option<i32>,
}

#[derive(Clone, Copy, Debug, Identifiable, Insertable, Queryable)]
#[table_name = "distribution_list_categories"]
#[primary_key(list, category)]
pub struct DistributionListCategory {
    pub list: i32,
    pub category: i32,
}

#[derive(Clone, Copy, Debug, Identifiable, Insertable, Queryable)]
#[table_name = "distribution_list_reviewers"]
#[primary_key(list, user)]
pub struct DistributionListReviewer {
    pub list: i32,
    pub user: i32,
}

#[derive(Associations, Clone, Debug, Identifiable, Queryable)]
#[belongs_to(Document, foreign_key = "document")]
#[table_name = "outgoing_transmittals"]
pub struct OutgoingTransmittal {
    pub id: i32,
    /// Document representing this transmittal in its transmittal category.
    pub document: i32,
    /// Category the packaged revisions come from.
    pub revisions_category: i32,
    pub contract_number: String,
    /// Trigram of the originating organisation.
    pub originator: String,
    /// Organisation this transmittal is addressed to.
    pub recipient: i32,
    /// Sequence number within (contract, originator, recipient).
    pub sequential_number: i32,
    pub created_on: NaiveDateTime,
    /// When the recipient acknowledged receipt. Set at most once.
    pub ack_of_receipt_date: Option<NaiveDateTime>,
    /// Who acknowledged receipt.
    pub ack_of_receipt_author: Option<i32>,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "outgoing_transmittals"]
pub struct NewOutgoingTransmittal<'a> {
    pub document: i32,
    pub revisions_category: i32,
    pub contract_number: &'a str,
    pub originator: &'a str,
    pub recipient: i32,
    pub sequential_number: i32,
}

#[derive(Associations, Clone, Debug, Identifiable, Queryable)]
#[belongs_to(OutgoingTransmittal, foreign_key = "transmittal")]
#[table_name = "exported_revisions"]
pub struct ExportedRevision {
    pub id: i32,
    /// Transmittal this snapshot belongs to.
    pub transmittal: i32,
    /// Document whose revision was packaged.
    pub document: i32,
    /// Number of the packaged revision.
    pub revision: i32,
    /// Title at export time.
    pub title: String,
    /// Revision status at export time.
    pub status: String,
    /// Return code at export time.
    pub return_code: Option<String>,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "exported_revisions"]
pub struct NewExportedRevision<'a> {
    pub transmittal: i32,
    pub document: i32,
    pub revision: i32,
    pub title: &'a str,
    pub status: &'a str,
    pub return_code: Option<&'a str>,
}

#[derive(Clone, Copy, Debug, Identifiable, Queryable)]
#[table_name = "exports"]
pub struct Export {
    pub id: Uuid,
    pub owner: i32,
    pub category: i32,
    pub format: ExportFormat,
    pub status: ExportStatus,
    pub created_on: NaiveDateTime,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "exports"]
pub struct NewExport {
    pub id: Uuid,
    pub owner: i32,
    pub category: i32,
    pub format: ExportFormat,
}

#[derive(Clone, Debug, Identifiable, Queryable)]
#[table_name = "events"]
pub struct Event {
    pub id: i32,
    /// User for whom this event was generated.
    pub user: i32,
    pub timestamp: NaiveDateTime,
    /// Short string describing what kind of event this is.
    pub kind: String,
    /// True if the user has not yet reviewed this event.
    pub is_unread: bool,
    /// Actual data for the event, serialized as MessagePack.
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "events"]
pub struct NewEvent<'a> {
    pub user: i32,
    pub kind: &'a str,
    pub data: &'a [u8],
}
