use chrono::NaiveDate;

use crate::db::types::ReviewRole;

/// A workflow event, carried by the notification boundary.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Event {
    ReviewStarted(ReviewStarted),
    ReviewCancelled(ReviewCancelled),
    StepClosed(StepClosed),
    SentBackToLeader(SentBackToLeader),
    RevisionEdited(RevisionEdited),
    TransmittalCreated(TransmittalCreated),
    ReviewOverdue(ReviewOverdue),
    TransmittalPendingAck(TransmittalPendingAck),
}

/// A review round was started.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ReviewStarted {
    pub document: i32,
    pub revision: i32,
}

/// A review round was cancelled. Collaborators holding state scoped to
/// the round (discussions, notes) delete it on receiving this event.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ReviewCancelled {
    pub document: i32,
    pub revision: i32,
}

/// A review step was closed.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StepClosed {
    pub document: i32,
    pub revision: i32,
    pub role: ReviewRole,
}

/// The round was sent from the approver step back to the leader.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SentBackToLeader {
    pub document: i32,
    pub revision: i32,
}

/// A revision's metadata changed after creation.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RevisionEdited {
    pub document: i32,
    pub revision: i32,
}

/// An outgoing transmittal was created. Consumers generate the archive
/// document and notify the recipient organisation.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TransmittalCreated {
    pub transmittal: i32,
    pub document: i32,
}

/// A review is past its due date.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ReviewOverdue {
    pub document: i32,
    pub revision: i32,
    pub due_date: NaiveDate,
}

/// A transmittal is still awaiting acknowledgement of receipt.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TransmittalPendingAck {
    pub transmittal: i32,
    pub document: i32,
}

impl Event {
    /// Short string identifying this event's kind.
    pub fn kind(&self) -> &'static str {
        match *self {
            Event::ReviewStarted(_) => "review_started",
            Event::ReviewCancelled(_) => "review_cancelled",
            Event::StepClosed(StepClosed { role, .. }) => match role {
                ReviewRole::Reviewer => "closed_reviewer_step",
                ReviewRole::Leader => "closed_leader_step",
                ReviewRole::Approver => "closed_approver_step",
            },
            Event::SentBackToLeader(_) => "sent_back_to_leader_step",
            Event::RevisionEdited(_) => "revision_edited",
            Event::TransmittalCreated(_) => "transmittal_created",
            Event::ReviewOverdue(_) => "review_overdue",
            Event::TransmittalPendingAck(_) => "transmittal_pending_ack",
        }
    }

    /// Serialize this event's payload.
    pub fn data(&self) -> Vec<u8> {
        // Serializing our own payload types cannot fail.
        match *self {
            Event::ReviewStarted(ref ev) => rmps::to_vec_named(ev),
            Event::ReviewCancelled(ref ev) => rmps::to_vec_named(ev),
            Event::StepClosed(ref ev) => rmps::to_vec_named(ev),
            Event::SentBackToLeader(ref ev) => rmps::to_vec_named(ev),
            Event::RevisionEdited(ref ev) => rmps::to_vec_named(ev),
            Event::TransmittalCreated(ref ev) => rmps::to_vec_named(ev),
            Event::ReviewOverdue(ref ev) => rmps::to_vec_named(ev),
            Event::TransmittalPendingAck(ref ev) => rmps::to_vec_named(ev),
        }.expect("could not serialize event payload")
    }

    /// Rebuild an event from its stored kind and payload.
    pub fn from_parts(kind: &str, data: &[u8])
    -> Result<Event, DecodeEventError> {
        Ok(match kind {
            "review_started" =>
                Event::ReviewStarted(rmps::from_slice(data)?),
            "review_cancelled" =>
                Event::ReviewCancelled(rmps::from_slice(data)?),
            "closed_reviewer_step"
            | "closed_leader_step"
            | "closed_approver_step" =>
                Event::StepClosed(rmps::from_slice(data)?),
            "sent_back_to_leader_step" =>
                Event::SentBackToLeader(rmps::from_slice(data)?),
            "revision_edited" =>
                Event::RevisionEdited(rmps::from_slice(data)?),
            "transmittal_created" =>
                Event::TransmittalCreated(rmps::from_slice(data)?),
            "review_overdue" =>
                Event::ReviewOverdue(rmps::from_slice(data)?),
            "transmittal_pending_ack" =>
                Event::TransmittalPendingAck(rmps::from_slice(data)?),
            _ => return Err(DecodeEventError::UnknownKind(kind.to_string())),
        })
    }
}

impl_from! { for Event ;
    ReviewStarted => |e| Event::ReviewStarted(e),
    ReviewCancelled => |e| Event::ReviewCancelled(e),
    StepClosed => |e| Event::StepClosed(e),
    SentBackToLeader => |e| Event::SentBackToLeader(e),
    RevisionEdited => |e| Event::RevisionEdited(e),
    TransmittalCreated => |e| Event::TransmittalCreated(e),
    ReviewOverdue => |e| Event::ReviewOverdue(e),
    TransmittalPendingAck => |e| Event::TransmittalPendingAck(e),
}

#[derive(Debug, Fail)]
pub enum DecodeEventError {
    /// The stored kind is not one we know.
    #[fail(display = "Unknown event kind: {}", _0)]
    UnknownKind(String),
    /// The stored payload does not match the kind.
    #[fail(display = "Malformed event payload: {}", _0)]
    Payload(#[cause] rmps::decode::Error),
}

impl_from! { for DecodeEventError ;
    rmps::decode::Error => |e| DecodeEventError::Payload(e),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_events_carry_their_role_in_the_kind() {
        let event = Event::from(StepClosed {
            document: 1,
            revision: 2,
            role: ReviewRole::Leader,
        });

        assert_eq!(event.kind(), "closed_leader_step");
    }

    #[test]
    fn events_survive_a_storage_round_trip() {
        let event = Event::from(ReviewStarted {
            document: 7,
            revision: 3,
        });

        let restored = Event::from_parts(event.kind(), &event.data()).unwrap();

        match restored {
            Event::ReviewStarted(ev) => {
                assert_eq!(ev.document, 7);
                assert_eq!(ev.revision, 3);
            }
            _ => panic!("wrong event kind"),
        }
    }

    #[test]
    fn unknown_kinds_are_rejected() {
        assert!(Event::from_parts("no_such_kind", &[]).is_err());
    }
}
