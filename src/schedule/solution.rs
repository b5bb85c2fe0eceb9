//! Solved schedules and read-only views over them.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ParticipantId, Part, RoomId, SchedulingProblem, SlotId};

/// One concrete occurrence of a part: room, slot, instructor and roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSession {
    pub id: usize,
    pub part: Part,
    pub room_id: RoomId,
    pub time_slot_id: SlotId,
    pub instructor_id: ParticipantId,
    /// Everyone belonging to `part`, instructors included.
    pub participant_ids: Vec<ParticipantId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingSolution {
    pub sessions: Vec<PracticeSession>,
    /// Objective value the engine reached for the model.
    pub objective_value: f64,
    /// Negated population variance of instructor session counts. 0 is perfectly even.
    pub fairness: f64,
    pub is_optimal: bool,
    pub solve_time_seconds: f64,
}

impl SchedulingSolution {
    pub fn session_for_part(&self, part: Part) -> Option<&PracticeSession> {
        self.sessions.iter().find(|s| s.part == part)
    }

    pub fn sessions_for_instructor(&self, instructor_id: ParticipantId) -> impl Iterator<Item = &PracticeSession> {
        self.sessions.iter().filter(move |s| s.instructor_id == instructor_id)
    }

    /// Session count for every instructor of `problem`, zero included.
    pub fn instructor_session_counts(&self, problem: &SchedulingProblem) -> BTreeMap<ParticipantId, usize> {
        problem
            .instructors()
            .map(|i| (i.id, self.sessions_for_instructor(i.id).count()))
            .collect()
    }

    /// Slot × room view. Computed on every call, never stored.
    pub fn timetable<'a>(&'a self, problem: &'a SchedulingProblem) -> Timetable<'a> {
        let mut cells = BTreeMap::new();
        for slot in problem.time_slots() {
            for room in problem.rooms() {
                cells.insert((slot.id, room.id), Vec::new());
            }
        }
        for session in &self.sessions {
            cells
                .entry((session.time_slot_id, session.room_id))
                .or_insert_with(Vec::new)
                .push(session);
        }
        Timetable { problem, cells }
    }
}

/// Sessions grouped by `(time_slot_id, room_id)`; every pair of the problem is present.
#[derive(Debug, Clone)]
pub struct Timetable<'a> {
    problem: &'a SchedulingProblem,
    cells: BTreeMap<(SlotId, RoomId), Vec<&'a PracticeSession>>,
}

impl<'a> Timetable<'a> {
    pub fn cell(&self, time_slot_id: SlotId, room_id: RoomId) -> &[&'a PracticeSession] {
        self.cells
            .get(&(time_slot_id, room_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Rows in problem slot order, each with its cells in problem room order.
    pub fn rows(&self) -> impl Iterator<Item = (SlotId, Vec<(RoomId, &[&'a PracticeSession])>)> + '_ {
        self.problem.time_slots().iter().map(move |slot| {
            let row = self
                .problem
                .rooms()
                .iter()
                .map(|room| (room.id, self.cell(slot.id, room.id)))
                .collect();
            (slot.id, row)
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Negated population variance of the counts. Empty input scores 0.
pub fn fairness_score(counts: impl IntoIterator<Item = usize>) -> f64 {
    let counts: Vec<f64> = counts.into_iter().map(|c| c as f64).collect();
    if counts.is_empty() {
        return 0.0;
    }
    let n = counts.len() as f64;
    let mean = counts.iter().sum::<f64>() / n;
    let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
    -variance
}
