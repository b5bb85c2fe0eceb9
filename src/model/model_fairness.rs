//! Instructor workload balance.
//!
//! Variance of session counts is quadratic; the model minimizes the range
//! `max_sessions - min_sessions` instead, which stays linear.
use super::linear::{ConstraintFamily, LinearExpr};
use super::model_context::{FairnessTerm, ModelBuilderContext};
use log::{debug, warn};

/// Adds `(max_sessions - min_sessions) * equality_weight` to the objective, bounding every
/// instructor's session count between the two auxiliaries. With a single instructor the
/// term becomes that instructor's negated session count.
pub fn add_fairness_objective(ctx: &mut ModelBuilderContext<'_>) {
    let problem = ctx.problem;
    let instructors: Vec<_> = problem.instructors().collect();

    match instructors.as_slice() {
        [] => {
            warn!("no instructors, fairness term skipped");
        }
        [only] => {
            let sessions = ctx.vars.matching(|k| k.instructor_id == only.id);
            ctx.model.minimize(-LinearExpr::sum(sessions.iter().copied()));
            ctx.terms.fairness = FairnessTerm::SingleInstructor { sessions };
            debug!("single instructor {}: maximizing session count", only.id);
        }
        _ => {
            let bound = ctx.max_sessions_per_instructor();
            let weight = ctx.config.equality_weight;
            // counts always sum to the number of parts, so the busiest instructor has at
            // least the average and the idlest at most the average
            let parts = problem.parts().len() as i64;
            let n = instructors.len() as i64;
            let busiest_floor = ((parts + n - 1) / n).min(bound);
            let idlest_ceiling = (parts / n).min(bound);
            let max_sessions = ctx.model.new_int_var(busiest_floor, bound, "max_sessions");
            let min_sessions = ctx.model.new_int_var(0, idlest_ceiling, "min_sessions");

            let mut per_instructor = Vec::with_capacity(instructors.len());
            for instructor in &instructors {
                let sessions = ctx.vars.matching(|k| k.instructor_id == instructor.id);
                let count = ctx.session_count_expr(instructor.id);
                ctx.model.add_le(
                    ConstraintFamily::SessionBounds,
                    count.clone() - LinearExpr::from(max_sessions),
                    0,
                );
                ctx.model.add_ge(
                    ConstraintFamily::SessionBounds,
                    count - LinearExpr::from(min_sessions),
                    0,
                );
                per_instructor.push((instructor.id, sessions));
            }

            let range = LinearExpr::from(max_sessions) - LinearExpr::from(min_sessions);
            if let Some(cap) = ctx.config.max_session_spread {
                ctx.model.add_le(ConstraintFamily::SessionSpread, range.clone(), cap);
                debug!("session spread capped at {cap}");
            }
            ctx.model.minimize(range * weight);

            ctx.terms.fairness = FairnessTerm::Range {
                weight,
                per_instructor,
                max_sessions,
                min_sessions,
            };
            debug!(
                "fairness over {} instructors, weight {weight}, count bound {bound}",
                instructors.len()
            );
        }
    }
}
