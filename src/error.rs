//! Error types for problem construction.

use crate::schedule::{ParticipantId, Part, RoomId, SlotId};

/// Reasons a [`SchedulingProblem`](crate::schedule::SchedulingProblem) can be rejected.
///
/// Raised at construction, before any model is built. Nothing is corrected silently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no participants configured")]
    NoParticipants,

    #[error("no rooms configured")]
    NoRooms,

    #[error("no time slots configured")]
    NoTimeSlots,

    #[error("no parts configured")]
    NoParts,

    #[error("no participant is flagged as instructor")]
    NoInstructors,

    /// Participant ids must be positive.
    #[error("participant '{0}' has id 0; ids must be positive")]
    InvalidParticipantId(String),

    #[error("participant id {0} is used more than once")]
    DuplicateParticipant(ParticipantId),

    #[error("room id {0} is used more than once")]
    DuplicateRoom(RoomId),

    #[error("time slot id {0} is used more than once")]
    DuplicateTimeSlot(SlotId),

    #[error("part {0} is listed more than once")]
    DuplicatePart(Part),

    #[error("participant {0} belongs to no part")]
    EmptyPartSet(ParticipantId),

    #[error("participant {id} has overlap priority {priority}, expected 0..=100")]
    PriorityOutOfRange { id: ParticipantId, priority: u8 },
}
