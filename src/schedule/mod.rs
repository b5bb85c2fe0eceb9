//! Domain model: parts, participants, rooms, time slots and the problem aggregate.

mod export;
mod solution;

pub use export::export_timetable_xlsx;
pub use solution::{PracticeSession, SchedulingSolution, Timetable, fairness_score};

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_OVERLAP_PRIORITY, MAX_OVERLAP_PRIORITY};
use crate::error::ValidationError;

pub type ParticipantId = u32;
pub type RoomId = u32;
pub type SlotId = u32;

/// A subject that has to be practiced exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Part {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
}

impl Part {
    pub const ALL: [Part; 9] = [
        Part::A,
        Part::B,
        Part::C,
        Part::D,
        Part::E,
        Part::F,
        Part::G,
        Part::H,
        Part::I,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Part::A => "A",
            Part::B => "B",
            Part::C => "C",
            Part::D => "D",
            Part::E => "E",
            Part::F => "F",
            Part::G => "G",
            Part::H => "H",
            Part::I => "I",
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_overlap_priority() -> u8 {
    DEFAULT_OVERLAP_PRIORITY
}

/// A member of one or more parts. Instructors are participants too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub parts: BTreeSet<Part>,
    #[serde(default)]
    pub is_instructor: bool,
    /// 0 makes this participant's overlaps free, 100 makes them as costly as possible.
    #[serde(default = "default_overlap_priority")]
    pub overlap_priority: u8,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>, parts: impl IntoIterator<Item = Part>) -> Self {
        Self {
            id,
            name: name.into(),
            parts: parts.into_iter().collect(),
            is_instructor: false,
            overlap_priority: DEFAULT_OVERLAP_PRIORITY,
        }
    }

    pub fn instructor(mut self) -> Self {
        self.is_instructor = true;
        self
    }

    pub fn with_overlap_priority(mut self, priority: u8) -> Self {
        self.overlap_priority = priority;
        self
    }

    pub fn belongs_to(&self, part: Part) -> bool {
        self.parts.contains(&part)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
}

impl Room {
    pub fn new(id: RoomId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// A period of the day. Slots carry no ordering in the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: SlotId,
    pub name: String,
}

impl TimeSlot {
    pub fn new(id: SlotId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// Everything the model is built from. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulingProblem {
    participants: Vec<Participant>,
    rooms: Vec<Room>,
    time_slots: Vec<TimeSlot>,
    parts: Vec<Part>,
}

/// Validates and assembles a [`SchedulingProblem`].
pub fn build_problem(
    participants: Vec<Participant>,
    rooms: Vec<Room>,
    time_slots: Vec<TimeSlot>,
    parts: Vec<Part>,
) -> Result<SchedulingProblem, ValidationError> {
    SchedulingProblem::new(participants, rooms, time_slots, parts)
}

impl SchedulingProblem {
    pub fn new(
        participants: Vec<Participant>,
        rooms: Vec<Room>,
        time_slots: Vec<TimeSlot>,
        parts: Vec<Part>,
    ) -> Result<Self, ValidationError> {
        if participants.is_empty() {
            return Err(ValidationError::NoParticipants);
        }
        if rooms.is_empty() {
            return Err(ValidationError::NoRooms);
        }
        if time_slots.is_empty() {
            return Err(ValidationError::NoTimeSlots);
        }
        if parts.is_empty() {
            return Err(ValidationError::NoParts);
        }
        if !participants.iter().any(|p| p.is_instructor) {
            return Err(ValidationError::NoInstructors);
        }

        let mut seen = HashSet::new();
        for p in &participants {
            if p.id == 0 {
                return Err(ValidationError::InvalidParticipantId(p.name.clone()));
            }
            if !seen.insert(p.id) {
                return Err(ValidationError::DuplicateParticipant(p.id));
            }
            if p.parts.is_empty() {
                return Err(ValidationError::EmptyPartSet(p.id));
            }
            if p.overlap_priority > MAX_OVERLAP_PRIORITY {
                return Err(ValidationError::PriorityOutOfRange {
                    id: p.id,
                    priority: p.overlap_priority,
                });
            }
        }

        let mut seen = HashSet::new();
        if let Some(room) = rooms.iter().find(|r| !seen.insert(r.id)) {
            return Err(ValidationError::DuplicateRoom(room.id));
        }
        let mut seen = HashSet::new();
        if let Some(slot) = time_slots.iter().find(|t| !seen.insert(t.id)) {
            return Err(ValidationError::DuplicateTimeSlot(slot.id));
        }
        let mut seen = HashSet::new();
        if let Some(part) = parts.iter().find(|p| !seen.insert(**p)) {
            return Err(ValidationError::DuplicatePart(*part));
        }

        Ok(Self {
            participants,
            rooms,
            time_slots,
            parts,
        })
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn time_slots(&self) -> &[TimeSlot] {
        &self.time_slots
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn instructors(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_instructor)
    }

    pub fn non_instructors(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| !p.is_instructor)
    }

    /// Everyone whose part set contains `part`, instructors included.
    pub fn participants_by_part(&self, part: Part) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(move |p| p.belongs_to(part))
    }

    pub fn instructors_by_part(&self, part: Part) -> impl Iterator<Item = &Participant> {
        self.participants_by_part(part).filter(|p| p.is_instructor)
    }

    pub fn non_instructors_by_part(&self, part: Part) -> impl Iterator<Item = &Participant> {
        self.participants_by_part(part).filter(|p| !p.is_instructor)
    }
}

impl<'de> Deserialize<'de> for SchedulingProblem {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            participants: Vec<Participant>,
            rooms: Vec<Room>,
            time_slots: Vec<TimeSlot>,
            parts: Vec<Part>,
        }

        let raw = Raw::deserialize(deserializer)?;
        SchedulingProblem::new(raw.participants, raw.rooms, raw.time_slots, raw.parts)
            .map_err(serde::de::Error::custom)
    }
}
