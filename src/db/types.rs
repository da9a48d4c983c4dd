use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

use std::{fmt, str::FromStr};

/// What kind of documents a category holds.
#[derive(Clone, Copy, DbEnum, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[DieselType = "Category_kind"]
#[serde(rename_all = "kebab-case")]
pub enum CategoryKind {
    /// Category of deliverable documents. Their revisions can be reviewed
    /// and packaged into transmittals.
    Deliverable,
    /// Category of outgoing transmittals. Their revisions are created by
    /// the transmittal builder, never reviewed.
    Transmittal,
}

/// Role a user holds in a review round.
#[derive(Clone, Copy, DbEnum, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[DieselType = "Review_role"]
#[serde(rename_all = "kebab-case")]
pub enum ReviewRole {
    Reviewer,
    Leader,
    Approver,
}

/// State of a single review.
#[derive(Clone, Copy, DbEnum, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[DieselType = "Review_status"]
#[serde(rename_all = "kebab-case")]
pub enum ReviewStatus {
    /// The review's step has not started yet.
    Pending,
    /// The review's step is under way and the reviewer has not posted yet.
    InProgress,
    /// The reviewer posted without comments.
    Reviewed,
    /// The reviewer posted comments.
    Commented,
    /// The review's step was closed before the reviewer posted.
    NotReviewed,
}

/// Output format of a generated export.
#[derive(Clone, Copy, DbEnum, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[DieselType = "Export_format"]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    Csv,
    Pdf,
    Xlsx,
}

/// Lifecycle of an export request.
#[derive(Clone, Copy, DbEnum, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[DieselType = "Export_status"]
#[serde(rename_all = "kebab-case")]
pub enum ExportStatus {
    New,
    Processing,
    Done,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match *self {
            CategoryKind::Deliverable => "deliverable",
            CategoryKind::Transmittal => "transmittal",
        })
    }
}

impl fmt::Display for ReviewRole {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match *self {
            ReviewRole::Reviewer => "reviewer",
            ReviewRole::Leader => "leader",
            ReviewRole::Approver => "approver",
        })
    }
}

impl FromStr for ReviewRole {
    type Err = ParseReviewRoleError;

    fn from_str(v: &str) -> Result<ReviewRole, ParseReviewRoleError> {
        match v {
            "reviewer" => Ok(ReviewRole::Reviewer),
            "leader" => Ok(ReviewRole::Leader),
            "approver" => Ok(ReviewRole::Approver),
            _ => Err(ParseReviewRoleError(v.to_string())),
        }
    }
}

#[derive(Debug, Fail)]
#[fail(display = "Unknown review role: {}", _0)]
pub struct ParseReviewRoleError(String);

impl fmt::Display for ReviewStatus {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match *self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::InProgress => "in-progress",
            ReviewStatus::Reviewed => "reviewed",
            ReviewStatus::Commented => "commented",
            ReviewStatus::NotReviewed => "not-reviewed",
        })
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match *self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ParseExportFormatError;

    fn from_str(v: &str) -> Result<ExportFormat, ParseExportFormatError> {
        match v {
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            "xlsx" => Ok(ExportFormat::Xlsx),
            _ => Err(ParseExportFormatError(v.to_string())),
        }
    }
}

#[derive(Debug, Fail)]
#[fail(display = "Unknown export format: {}", _0)]
pub struct ParseExportFormatError(String);

impl fmt::Display for ExportStatus {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match *self {
            ExportStatus::New => "queued",
            ExportStatus::Processing => "processing",
            ExportStatus::Done => "done",
        })
    }
}
