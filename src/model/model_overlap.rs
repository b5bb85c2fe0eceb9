//! Soft penalty for participants whose own parts run in the same slot.
use super::linear::{ConstraintFamily, LinearExpr};
use super::model_context::{ModelBuilderContext, OverlapTerm, SessionKey};
use log::{debug, trace};

/// For each non-instructor and slot, adds `overlap_priority * excess` to the objective,
/// where `excess >= Σ own-part sessions in the slot - 1` and `excess >= 0`.
///
/// Terms that can never be non-zero (priority 0, or at most one own-part session
/// possible in the slot) are left out.
pub fn add_overlap_penalties(ctx: &mut ModelBuilderContext<'_>) {
    let problem = ctx.problem;
    let rooms = problem.rooms().len() as i64;
    let mut skipped = 0;

    for participant in problem.non_instructors() {
        if participant.overlap_priority == 0 {
            trace!("participant {} has priority 0, overlaps are free", participant.id);
            continue;
        }
        let priority = i64::from(participant.overlap_priority);

        for slot in problem.time_slots() {
            let mut sessions = Vec::new();
            let mut parts_in_slot = 0_i64;
            for &part in problem.parts() {
                if !participant.belongs_to(part) {
                    continue;
                }
                let before = sessions.len();
                for room in problem.rooms() {
                    for instructor in problem.instructors() {
                        let key = SessionKey::new(part, room.id, slot.id, instructor.id);
                        if let Some(var) = ctx.vars.get(&key) {
                            sessions.push(var);
                        }
                    }
                }
                if sessions.len() > before {
                    parts_in_slot += 1;
                }
            }

            // each part runs once and each room holds one session per slot
            let max_concurrent = parts_in_slot.min(rooms);
            if max_concurrent < 2 {
                skipped += 1;
                continue;
            }

            let excess = ctx.model.new_int_var(
                0,
                max_concurrent - 1,
                format!("overlap_excess_{}_{}", participant.id, slot.id),
            );
            ctx.model.add_ge(
                ConstraintFamily::OverlapExcess,
                LinearExpr::from(excess) - LinearExpr::sum(sessions.iter().copied()),
                -1,
            );
            ctx.model.minimize(LinearExpr::from(excess) * priority);
            ctx.terms.overlaps.push(OverlapTerm {
                participant_id: participant.id,
                time_slot_id: slot.id,
                priority,
                sessions,
                excess,
            });
        }
    }
    debug!(
        "added {} overlap penalty terms ({skipped} participant/slot pairs cannot overlap)",
        ctx.terms.overlaps.len()
    );
}
