//! Shared state for the model-building pipeline and the session variable table.
use super::linear::{Assignment, LinearExpr, LinearModel, ModelBuilder, VarId};
use super::model_fairness::add_fairness_objective;
use super::model_overlap::add_overlap_penalties;
use super::model_sessions::{
    add_instructor_slot_constraints, add_part_coverage_constraints, add_room_slot_constraints,
};
use crate::config::SolveConfig;
use crate::schedule::{ParticipantId, Part, RoomId, SchedulingProblem, SlotId};
use log::{debug, info};
use std::collections::HashMap;

/// Identity of one session decision: `part` taught in `room_id` during `time_slot_id` by `instructor_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey {
    pub part: Part,
    pub room_id: RoomId,
    pub time_slot_id: SlotId,
    pub instructor_id: ParticipantId,
}

impl SessionKey {
    pub fn new(part: Part, room_id: RoomId, time_slot_id: SlotId, instructor_id: ParticipantId) -> Self {
        Self {
            part,
            room_id,
            time_slot_id,
            instructor_id,
        }
    }

    pub fn var_name(&self) -> String {
        format!(
            "session_{}_{}_{}_{}",
            self.part, self.room_id, self.time_slot_id, self.instructor_id
        )
    }
}

/// Sparse map from [`SessionKey`] to its boolean variable, remembering allocation order.
#[derive(Debug, Clone, Default)]
pub struct SessionVars {
    by_key: HashMap<SessionKey, VarId>,
    order: Vec<(SessionKey, VarId)>,
}

impl SessionVars {
    /// Returns the existing variable for `key` or allocates one through `model`.
    fn get_or_insert(&mut self, key: SessionKey, model: &mut ModelBuilder) -> VarId {
        if let Some(&var) = self.by_key.get(&key) {
            return var;
        }
        let var = model.new_bool_var(key.var_name());
        self.by_key.insert(key, var);
        self.order.push((key, var));
        var
    }

    pub fn get(&self, key: &SessionKey) -> Option<VarId> {
        self.by_key.get(key).copied()
    }

    /// Entries in allocation order: part, room, slot, instructor, each in problem order.
    pub fn iter(&self) -> impl Iterator<Item = (SessionKey, VarId)> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Variables whose key satisfies `pred`, in allocation order.
    pub fn matching(&self, pred: impl Fn(&SessionKey) -> bool) -> Vec<VarId> {
        self.order
            .iter()
            .filter(|(key, _)| pred(key))
            .map(|&(_, var)| var)
            .collect()
    }
}

/// Objective pieces kept in structured form next to the flattened objective row.
#[derive(Debug, Clone, Default)]
pub struct ObjectiveTerms {
    pub fairness: FairnessTerm,
    pub overlaps: Vec<OverlapTerm>,
}

#[derive(Debug, Clone, Default)]
pub enum FairnessTerm {
    #[default]
    Absent,
    /// One instructor: minimize the negated session count.
    SingleInstructor { sessions: Vec<VarId> },
    /// `(max_sessions - min_sessions) * weight`.
    Range {
        weight: i64,
        per_instructor: Vec<(ParticipantId, Vec<VarId>)>,
        max_sessions: VarId,
        min_sessions: VarId,
    },
}

/// Penalty for one participant in one slot: `priority * max(0, Σ sessions - 1)`.
#[derive(Debug, Clone)]
pub struct OverlapTerm {
    pub participant_id: ParticipantId,
    pub time_slot_id: SlotId,
    pub priority: i64,
    pub sessions: Vec<VarId>,
    pub excess: VarId,
}

impl OverlapTerm {
    pub fn excess_at(&self, assignment: &Assignment) -> i64 {
        let concurrent: i64 = self.sessions.iter().map(|&v| assignment.value(v)).sum();
        (concurrent - 1).max(0)
    }
}

impl ObjectiveTerms {
    /// Objective implied by the session variables alone, with every auxiliary
    /// variable at the tightest value the constraints allow.
    pub fn score(&self, assignment: &Assignment) -> i64 {
        let fairness = match &self.fairness {
            FairnessTerm::Absent => 0,
            FairnessTerm::SingleInstructor { sessions } => {
                -sessions.iter().map(|&v| assignment.value(v)).sum::<i64>()
            }
            FairnessTerm::Range {
                weight,
                per_instructor,
                ..
            } => {
                let counts: Vec<i64> = per_instructor
                    .iter()
                    .map(|(_, vars)| vars.iter().map(|&v| assignment.value(v)).sum())
                    .collect();
                let max = counts.iter().copied().max().unwrap_or(0);
                let min = counts.iter().copied().min().unwrap_or(0);
                weight * (max - min)
            }
        };
        let overlap: i64 = self
            .overlaps
            .iter()
            .map(|term| term.priority * term.excess_at(assignment))
            .sum();
        fairness + overlap
    }

    /// Sets every auxiliary variable to the value [`ObjectiveTerms::score`] assumes.
    pub fn complete(&self, assignment: &mut Assignment) {
        if let FairnessTerm::Range {
            per_instructor,
            max_sessions,
            min_sessions,
            ..
        } = &self.fairness
        {
            let counts: Vec<i64> = per_instructor
                .iter()
                .map(|(_, vars)| vars.iter().map(|&v| assignment.value(v)).sum())
                .collect();
            assignment.set(*max_sessions, counts.iter().copied().max().unwrap_or(0));
            assignment.set(*min_sessions, counts.iter().copied().min().unwrap_or(0));
        }
        for term in &self.overlaps {
            let excess = term.excess_at(assignment);
            assignment.set(term.excess, excess);
        }
    }
}

/// The complete model for one problem: engine-facing rows plus the lookup tables
/// needed to read a result back.
#[derive(Debug, Clone)]
pub struct SchedulingModel {
    pub linear: LinearModel,
    pub session_vars: SessionVars,
    pub objective_terms: ObjectiveTerms,
}

impl SchedulingModel {
    /// Assignment with exactly the given sessions switched on and auxiliaries completed.
    pub fn assignment_for(&self, sessions: impl IntoIterator<Item = SessionKey>) -> Assignment {
        let mut assignment = Assignment::zeroed(self.linear.num_vars());
        for key in sessions {
            if let Some(var) = self.session_vars.get(&key) {
                assignment.set(var, 1);
            }
        }
        self.objective_terms.complete(&mut assignment);
        assignment
    }
}

/// Context threaded through the `add_*` pipeline stages.
pub struct ModelBuilderContext<'a> {
    pub problem: &'a SchedulingProblem,
    pub config: &'a SolveConfig,
    pub model: ModelBuilder,
    pub vars: SessionVars,
    pub terms: ObjectiveTerms,
}

impl<'a> ModelBuilderContext<'a> {
    pub fn new(problem: &'a SchedulingProblem, config: &'a SolveConfig) -> Self {
        Self {
            problem,
            config,
            model: ModelBuilder::new(),
            vars: SessionVars::default(),
            terms: ObjectiveTerms::default(),
        }
    }

    /// One boolean per (part, room, slot, instructor). Non-instructors never get one.
    pub fn allocate_session_vars(&mut self) {
        let problem = self.problem;
        for &part in problem.parts() {
            for room in problem.rooms() {
                for slot in problem.time_slots() {
                    for instructor in problem.instructors() {
                        if self.config.restrict_to_declared_parts && !instructor.belongs_to(part) {
                            continue;
                        }
                        let key = SessionKey::new(part, room.id, slot.id, instructor.id);
                        self.vars.get_or_insert(key, &mut self.model);
                    }
                }
            }
        }
        debug!("allocated {} session variables", self.vars.len());
    }

    /// Number of sessions `instructor_id` teaches, as an expression.
    pub fn session_count_expr(&self, instructor_id: ParticipantId) -> LinearExpr {
        LinearExpr::sum(self.vars.matching(|k| k.instructor_id == instructor_id))
    }

    /// Upper bound on any instructor's session count: each part runs once and an
    /// instructor teaches at most once per slot.
    pub fn max_sessions_per_instructor(&self) -> i64 {
        self.problem.parts().len().min(self.problem.time_slots().len()) as i64
    }

    pub fn finish(self) -> SchedulingModel {
        let linear = self.model.finish();
        info!(
            "model built: {} variables, {} constraints, {} overlap terms",
            linear.num_vars(),
            linear.constraints().len(),
            self.terms.overlaps.len()
        );
        SchedulingModel {
            linear,
            session_vars: self.vars,
            objective_terms: self.terms,
        }
    }
}

/// Runs every pipeline stage in order and freezes the result.
pub fn build_model_pipeline(problem: &SchedulingProblem, config: &SolveConfig) -> SchedulingModel {
    let mut ctx = ModelBuilderContext::new(problem, config);
    ctx.allocate_session_vars();
    add_part_coverage_constraints(&mut ctx);
    add_room_slot_constraints(&mut ctx);
    add_instructor_slot_constraints(&mut ctx);
    add_fairness_objective(&mut ctx);
    add_overlap_penalties(&mut ctx);
    ctx.finish()
}
