//! Hard structural constraints on session variables.
use super::linear::ConstraintFamily;
use super::model_context::{ModelBuilderContext, SessionKey};
use log::{debug, warn};

/// Every part is practiced exactly once across all rooms, slots and instructors.
///
/// A part without any variable still gets its row (`0 == 1`), so the model reports
/// no solution instead of silently dropping the part.
pub fn add_part_coverage_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let problem = ctx.problem;
    for &part in problem.parts() {
        let mut sessions = Vec::new();
        for room in problem.rooms() {
            for slot in problem.time_slots() {
                for instructor in problem.instructors() {
                    if let Some(var) = ctx.vars.get(&SessionKey::new(part, room.id, slot.id, instructor.id)) {
                        sessions.push(var);
                    }
                }
            }
        }
        if sessions.is_empty() {
            warn!("part {part} has no assignable room, slot and instructor");
        }
        ctx.model.add_exactly_one(ConstraintFamily::PartCoverage, sessions);
    }
    debug!("added {} part coverage constraints", problem.parts().len());
}

/// A room hosts at most one session per slot.
pub fn add_room_slot_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let problem = ctx.problem;
    let mut added = 0;
    for room in problem.rooms() {
        for slot in problem.time_slots() {
            let mut sessions = Vec::new();
            for &part in problem.parts() {
                for instructor in problem.instructors() {
                    if let Some(var) = ctx.vars.get(&SessionKey::new(part, room.id, slot.id, instructor.id)) {
                        sessions.push(var);
                    }
                }
            }
            if sessions.len() > 1 {
                ctx.model.add_at_most_one(ConstraintFamily::RoomSlot, sessions);
                added += 1;
            }
        }
    }
    debug!("added {added} room/slot exclusivity constraints");
}

/// An instructor teaches at most one session per slot.
pub fn add_instructor_slot_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let problem = ctx.problem;
    let mut added = 0;
    for instructor in problem.instructors() {
        for slot in problem.time_slots() {
            let mut sessions = Vec::new();
            for &part in problem.parts() {
                for room in problem.rooms() {
                    if let Some(var) = ctx.vars.get(&SessionKey::new(part, room.id, slot.id, instructor.id)) {
                        sessions.push(var);
                    }
                }
            }
            if sessions.len() > 1 {
                ctx.model.add_at_most_one(ConstraintFamily::InstructorSlot, sessions);
                added += 1;
            }
        }
    }
    debug!("added {added} instructor/slot constraints");
}
