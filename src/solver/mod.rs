//! Solve driver: builds the model, hands it to an engine and reads the schedule back.

#[cfg(feature = "cp-sat")]
mod cp_sat_engine;
mod extract;
mod microlp_engine;

#[cfg(feature = "cp-sat")]
pub use cp_sat_engine::CpSatEngine;
pub use extract::{extract_sessions, score_sessions};
pub use microlp_engine::MicroLpEngine;

use std::time::Instant;

use anyhow::Result;
use log::{info, warn};

use crate::config::SolveConfig;
use crate::model::{Assignment, LinearModel, build_model_pipeline};
use crate::schedule::{SchedulingProblem, SchedulingSolution};

/// What the engine concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// Proven optimal.
    Optimal,
    /// Feasible, optimality not proven within the budget.
    Feasible,
    Infeasible,
    /// Budget spent before any feasible assignment was found.
    TimedOut,
}

impl EngineStatus {
    pub fn has_solution(self) -> bool {
        matches!(self, EngineStatus::Optimal | EngineStatus::Feasible)
    }
}

#[derive(Debug, Clone)]
pub struct EngineOutcome {
    pub status: EngineStatus,
    /// Present whenever `status.has_solution()`.
    pub assignment: Option<Assignment>,
    pub objective_value: Option<f64>,
}

impl EngineOutcome {
    pub fn without_solution(status: EngineStatus) -> Self {
        Self {
            status,
            assignment: None,
            objective_value: None,
        }
    }
}

/// A combinatorial search backend.
///
/// Receives the frozen model and must not keep state between calls. Errors are reserved
/// for engine failures; infeasibility and timeouts are reported through [`EngineStatus`].
pub trait SolveEngine {
    fn name(&self) -> &'static str;

    fn solve(&self, model: &LinearModel, config: &SolveConfig) -> Result<EngineOutcome>;
}

#[cfg(feature = "cp-sat")]
pub type DefaultEngine = CpSatEngine;
#[cfg(not(feature = "cp-sat"))]
pub type DefaultEngine = MicroLpEngine;

/// Solves with the default engine. `Ok(None)` means no schedule exists within the budget.
pub fn solve(
    problem: &SchedulingProblem,
    time_limit_seconds: f64,
    equality_weight: i64,
) -> Result<Option<SchedulingSolution>> {
    solve_with_config(problem, &SolveConfig::new(time_limit_seconds, equality_weight))
}

pub fn solve_with_config(problem: &SchedulingProblem, config: &SolveConfig) -> Result<Option<SchedulingSolution>> {
    solve_with_engine(problem, config, &DefaultEngine::default())
}

/// Single solve attempt with `engine`; no retries.
pub fn solve_with_engine<E: SolveEngine + ?Sized>(
    problem: &SchedulingProblem,
    config: &SolveConfig,
    engine: &E,
) -> Result<Option<SchedulingSolution>> {
    let model = build_model_pipeline(problem, config);

    if let Some(row) = model.linear.trivially_infeasible() {
        warn!(
            "model is infeasible before search: {:?} row {} {} {}",
            row.family,
            row.expr.constant_value(),
            row.relation,
            row.rhs
        );
        return Ok(None);
    }

    info!(
        "solving with {} (time limit {:.1}s, equality weight {})",
        engine.name(),
        config.time_limit_seconds,
        config.equality_weight
    );
    let start = Instant::now();
    let outcome = engine.solve(&model.linear, config)?;
    let solve_time_seconds = start.elapsed().as_secs_f64();
    info!("engine finished with {:?} in {:.2}s", outcome.status, solve_time_seconds);

    let assignment = match (outcome.status.has_solution(), outcome.assignment) {
        (true, Some(assignment)) => assignment,
        (true, None) => anyhow::bail!("{} reported {:?} without an assignment", engine.name(), outcome.status),
        (false, _) => return Ok(None),
    };

    let sessions = extract_sessions(problem, &model.session_vars, &assignment);
    let fairness = score_sessions(problem, &sessions);
    let objective_value = outcome
        .objective_value
        .unwrap_or_else(|| model.linear.evaluate(&assignment) as f64);

    Ok(Some(SchedulingSolution {
        sessions,
        objective_value,
        fairness,
        is_optimal: outcome.status == EngineStatus::Optimal,
        solve_time_seconds,
    }))
}
