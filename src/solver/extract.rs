//! Reading a schedule back out of an engine assignment.
use crate::model::{Assignment, SessionVars};
use crate::schedule::{PracticeSession, SchedulingProblem, fairness_score};

/// Materializes one [`PracticeSession`] per true session variable.
///
/// Walks the variables in allocation order (part, room, slot, instructor), so the same
/// assignment always yields the same list with ids `0..n`.
pub fn extract_sessions(
    problem: &SchedulingProblem,
    vars: &SessionVars,
    assignment: &Assignment,
) -> Vec<PracticeSession> {
    vars.iter()
        .filter(|&(_, var)| assignment.is_true(var))
        .enumerate()
        .map(|(id, (key, _))| PracticeSession {
            id,
            part: key.part,
            room_id: key.room_id,
            time_slot_id: key.time_slot_id,
            instructor_id: key.instructor_id,
            participant_ids: problem.participants_by_part(key.part).map(|p| p.id).collect(),
        })
        .collect()
}

/// Fairness of realized instructor workloads over every instructor in `problem`.
pub fn score_sessions(problem: &SchedulingProblem, sessions: &[PracticeSession]) -> f64 {
    fairness_score(
        problem
            .instructors()
            .map(|i| sessions.iter().filter(|s| s.instructor_id == i.id).count()),
    )
}
