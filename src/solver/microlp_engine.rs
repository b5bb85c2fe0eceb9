//! Pure-Rust MILP backend through `good_lp`'s `microlp` solver.
use anyhow::{Result, anyhow};
use good_lp::{
    Constraint, Expression, ProblemVariables, ResolutionError, Solution, SolutionStatus, SolverModel, Variable,
    WithTimeLimit, constraint, microlp, variable,
};
use log::{debug, warn};

use super::{EngineOutcome, EngineStatus, SolveEngine};
use crate::config::SolveConfig;
use crate::model::{Assignment, Domain, LinearConstraint, LinearExpr, LinearModel, Relation};

/// Branch-and-bound bounded by `time_limit_seconds`.
///
/// An incumbent found before the budget runs out without an optimality proof is reported
/// as `Feasible`; no incumbent at all is `TimedOut`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpEngine;

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::with_capacity(expr.terms().len());
    for &(coef, var) in expr.terms() {
        out.add_mul(coef as f64, handles[var.index()]);
    }
    out += expr.constant_value() as f64;
    out
}

fn to_constraint(row: &LinearConstraint, handles: &[Variable]) -> Constraint {
    let lhs = to_expression(&row.expr, handles);
    let rhs = row.rhs as f64;
    match row.relation {
        Relation::Eq => constraint::eq(lhs, rhs),
        Relation::Le => constraint::leq(lhs, rhs),
        Relation::Ge => constraint::geq(lhs, rhs),
    }
}

impl SolveEngine for MicroLpEngine {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, model: &LinearModel, config: &SolveConfig) -> Result<EngineOutcome> {
        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = model
            .variables()
            .iter()
            .map(|def| {
                let definition = match def.domain {
                    Domain::Bool => variable().binary(),
                    Domain::Int { min, max } => variable().integer().min(min as f64).max(max as f64),
                };
                vars.add(definition.name(def.name.clone()))
            })
            .collect();

        let mut problem = vars
            .minimise(to_expression(model.objective(), &handles))
            .using(microlp);
        if config.time_limit_seconds.is_finite() {
            problem = problem.with_time_limit(config.time_limit_seconds.max(0.0));
        } else {
            warn!("time limit {} is not finite, searching without one", config.time_limit_seconds);
        }
        for row in model.constraints() {
            if row.expr.is_constant() {
                if row.is_trivially_violated() {
                    return Ok(EngineOutcome::without_solution(EngineStatus::Infeasible));
                }
                continue;
            }
            problem = problem.with(to_constraint(row, &handles));
        }

        match problem.solve() {
            Ok(solution) => {
                let values = handles.iter().map(|&h| solution.value(h).round() as i64).collect();
                let assignment = Assignment::from_values(values);
                let objective = model.evaluate(&assignment) as f64;
                let status = match solution.status() {
                    SolutionStatus::Optimal => EngineStatus::Optimal,
                    other => {
                        debug!("microlp stopped with {other:?}, incumbent objective {objective}");
                        EngineStatus::Feasible
                    }
                };
                Ok(EngineOutcome {
                    status,
                    assignment: Some(assignment),
                    objective_value: Some(objective),
                })
            }
            Err(ResolutionError::Infeasible) => Ok(EngineOutcome::without_solution(EngineStatus::Infeasible)),
            // the only `Other` microlp raises: budget spent before the first incumbent
            Err(ResolutionError::Other(reason)) if reason.contains("Time limit") => {
                debug!("microlp: {reason}");
                Ok(EngineOutcome::without_solution(EngineStatus::TimedOut))
            }
            Err(err) => Err(anyhow!("microlp failed: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintFamily, ModelBuilder};

    #[test]
    fn picks_the_cheapest_feasible_row() {
        let mut builder = ModelBuilder::new();
        let a = builder.new_bool_var("a");
        let b = builder.new_bool_var("b");
        let c = builder.new_bool_var("c");
        builder.add_exactly_one(ConstraintFamily::PartCoverage, [a, b, c]);
        builder.minimize([(5, a), (2, b), (9, c)].into_iter().collect());
        let model = builder.finish();

        let outcome = MicroLpEngine.solve(&model, &SolveConfig::default()).unwrap();
        assert_eq!(outcome.status, EngineStatus::Optimal);
        let assignment = outcome.assignment.unwrap();
        assert!(assignment.is_true(b));
        assert!(!assignment.is_true(a));
        assert_eq!(outcome.objective_value, Some(2.0));
    }

    #[test]
    fn reports_infeasibility() {
        let mut builder = ModelBuilder::new();
        let a = builder.new_bool_var("a");
        let b = builder.new_bool_var("b");
        builder.add_at_most_one(ConstraintFamily::RoomSlot, [a, b]);
        builder.add_ge(ConstraintFamily::PartCoverage, LinearExpr::sum([a, b]), 2);
        let model = builder.finish();

        let outcome = MicroLpEngine.solve(&model, &SolveConfig::default()).unwrap();
        assert_eq!(outcome.status, EngineStatus::Infeasible);
        assert!(outcome.assignment.is_none());
    }

    #[test]
    fn integer_auxiliaries_respect_bounds() {
        let mut builder = ModelBuilder::new();
        let a = builder.new_bool_var("a");
        let b = builder.new_bool_var("b");
        let excess = builder.new_int_var(0, 1, "excess");
        builder.add_eq(ConstraintFamily::PartCoverage, LinearExpr::sum([a, b]), 2);
        builder.add_ge(
            ConstraintFamily::OverlapExcess,
            LinearExpr::from(excess) - LinearExpr::sum([a, b]),
            -1,
        );
        builder.minimize(LinearExpr::from(excess) * 30);
        let model = builder.finish();

        let outcome = MicroLpEngine.solve(&model, &SolveConfig::default()).unwrap();
        let assignment = outcome.assignment.unwrap();
        assert_eq!(assignment.value(excess), 1);
        assert_eq!(outcome.objective_value, Some(30.0));
        assert!(model.is_satisfied_by(&assignment));
    }

    #[test]
    fn zero_budget_times_out_without_an_error() {
        let mut builder = ModelBuilder::new();
        let a = builder.new_bool_var("a");
        let b = builder.new_bool_var("b");
        builder.add_exactly_one(ConstraintFamily::PartCoverage, [a, b]);
        builder.minimize([(3, a), (1, b)].into_iter().collect());
        let model = builder.finish();

        let outcome = MicroLpEngine.solve(&model, &SolveConfig::new(0.0, 100)).unwrap();
        assert_eq!(outcome.status, EngineStatus::TimedOut);
        assert!(outcome.assignment.is_none());
    }

    #[test]
    fn cp_sat_only_knobs_do_not_change_the_outcome() {
        let mut builder = ModelBuilder::new();
        let a = builder.new_bool_var("a");
        let b = builder.new_bool_var("b");
        builder.add_exactly_one(ConstraintFamily::PartCoverage, [a, b]);
        builder.minimize([(3, a), (1, b)].into_iter().collect());
        let model = builder.finish();

        let tuned = SolveConfig {
            num_search_workers: 1,
            random_seed: 7,
            log_search_progress: true,
            ..SolveConfig::default()
        };
        let plain = MicroLpEngine.solve(&model, &SolveConfig::default()).unwrap();
        let tuned = MicroLpEngine.solve(&model, &tuned).unwrap();
        assert_eq!(plain.status, tuned.status);
        assert_eq!(plain.assignment, tuned.assignment);
        assert_eq!(plain.objective_value, Some(1.0));
    }
}
