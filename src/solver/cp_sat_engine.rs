//! OR-Tools CP-SAT backend (`cp-sat` feature).
use anyhow::{Result, anyhow};
use cp_sat::builder::{BoolVar, CpModelBuilder, IntVar, LinearExpr as CpExpr};
use cp_sat::proto::{CpSolverResponse, CpSolverStatus, SatParameters};
use log::debug;

use super::{EngineOutcome, EngineStatus, SolveEngine};
use crate::config::SolveConfig;
use crate::model::{Assignment, Domain, LinearExpr, LinearModel, Relation};

/// Honors the time limit: when it runs out with an incumbent the outcome is `Feasible`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpSatEngine;

#[derive(Clone)]
enum Handle {
    Bool(BoolVar),
    Int(IntVar),
}

impl Handle {
    fn value(&self, response: &CpSolverResponse) -> i64 {
        match self {
            Handle::Bool(var) => i64::from(var.solution_value(response)),
            Handle::Int(var) => var.solution_value(response),
        }
    }
}

fn to_cp_expr(expr: &LinearExpr, handles: &[Handle]) -> CpExpr {
    let mut bools: Vec<(i64, BoolVar)> = Vec::new();
    let mut ints: Vec<(i64, IntVar)> = Vec::new();
    for &(coef, var) in expr.terms() {
        match &handles[var.index()] {
            Handle::Bool(b) => bools.push((coef, b.clone())),
            Handle::Int(i) => ints.push((coef, i.clone())),
        }
    }
    let bools: CpExpr = bools.into_iter().collect();
    let ints: CpExpr = ints.into_iter().collect();
    bools + ints + expr.constant_value()
}

fn parameters(config: &SolveConfig) -> SatParameters {
    let mut params = SatParameters::default();
    params.max_time_in_seconds = Some(config.time_limit_seconds);
    params.num_search_workers = Some(config.num_search_workers);
    params.random_seed = Some(config.random_seed);
    params.log_search_progress = Some(config.log_search_progress);
    params
}

impl SolveEngine for CpSatEngine {
    fn name(&self) -> &'static str {
        "cp-sat"
    }

    fn solve(&self, model: &LinearModel, config: &SolveConfig) -> Result<EngineOutcome> {
        let mut cp = CpModelBuilder::default();
        let handles: Vec<Handle> = model
            .variables()
            .iter()
            .map(|def| match def.domain {
                Domain::Bool => Handle::Bool(cp.new_bool_var_with_name(&def.name)),
                Domain::Int { min, max } => Handle::Int(cp.new_int_var_with_name([(min, max)], &def.name)),
            })
            .collect();

        for row in model.constraints() {
            let lhs = to_cp_expr(&row.expr, &handles);
            match row.relation {
                Relation::Eq => cp.add_eq(lhs, row.rhs),
                Relation::Le => cp.add_le(lhs, row.rhs),
                Relation::Ge => cp.add_ge(lhs, row.rhs),
            };
        }
        cp.minimize(to_cp_expr(model.objective(), &handles));
        debug!(
            "cp-sat model: {} variables, {} constraints",
            handles.len(),
            model.constraints().len()
        );

        let response = cp.solve_with_parameters(&parameters(config));
        let status = match response.status() {
            CpSolverStatus::Optimal => EngineStatus::Optimal,
            CpSolverStatus::Feasible => EngineStatus::Feasible,
            CpSolverStatus::Infeasible => EngineStatus::Infeasible,
            CpSolverStatus::Unknown => EngineStatus::TimedOut,
            CpSolverStatus::ModelInvalid => return Err(anyhow!("cp-sat rejected the model as invalid")),
        };
        if !status.has_solution() {
            return Ok(EngineOutcome::without_solution(status));
        }

        let values = handles.iter().map(|h| h.value(&response)).collect();
        Ok(EngineOutcome {
            status,
            assignment: Some(Assignment::from_values(values)),
            objective_value: Some(response.objective_value),
        })
    }
}
