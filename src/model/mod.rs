//! Model building: session variables, hard constraints and the objective.

mod linear;
mod model_context;
mod model_fairness;
mod model_overlap;
mod model_sessions;

pub use linear::{
    Assignment, ConstraintFamily, Domain, LinearConstraint, LinearExpr, LinearModel, ModelBuilder,
    Relation, VarDef, VarId,
};
pub use model_context::{
    FairnessTerm, ModelBuilderContext, ObjectiveTerms, OverlapTerm, SchedulingModel, SessionKey,
    SessionVars, build_model_pipeline,
};
