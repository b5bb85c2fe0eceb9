//! Engine-neutral linear model: variables, linear constraints, one objective.
//!
//! [`ModelBuilder`] accumulates; [`LinearModel`] is the frozen snapshot handed to a
//! [`SolveEngine`](crate::solver::SolveEngine). Variables are referenced by [`VarId`],
//! an index into the model's variable table.

use std::fmt;
use std::ops;

/// Handle to a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Bool,
    Int { min: i64, max: i64 },
}

impl Domain {
    pub fn bounds(self) -> (i64, i64) {
        match self {
            Domain::Bool => (0, 1),
            Domain::Int { min, max } => (min, max),
        }
    }

    pub fn contains(self, value: i64) -> bool {
        let (lo, hi) = self.bounds();
        lo <= value && value <= hi
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDef {
    pub name: String,
    pub domain: Domain,
}

/// `Σ coef·var + constant`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(i64, VarId)>,
    constant: i64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Unweighted sum of `vars`.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        vars.into_iter().map(|v| (1, v)).collect()
    }

    pub fn add_term(&mut self, coef: i64, var: VarId) {
        if coef != 0 {
            self.terms.push((coef, var));
        }
    }

    pub fn terms(&self) -> &[(i64, VarId)] {
        &self.terms
    }

    pub fn constant_value(&self) -> i64 {
        self.constant
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn evaluate(&self, assignment: &Assignment) -> i64 {
        self.terms
            .iter()
            .map(|&(coef, var)| coef * assignment.value(var))
            .sum::<i64>()
            + self.constant
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        Self {
            terms: vec![(1, var)],
            constant: 0,
        }
    }
}

impl FromIterator<(i64, VarId)> for LinearExpr {
    fn from_iter<T: IntoIterator<Item = (i64, VarId)>>(iter: T) -> Self {
        let mut expr = LinearExpr::new();
        for (coef, var) in iter {
            expr.add_term(coef, var);
        }
        expr
    }
}

impl ops::Add for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: LinearExpr) -> LinearExpr {
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl ops::Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self * -1
    }
}

impl ops::Sub for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: LinearExpr) -> LinearExpr {
        self + -rhs
    }
}

impl ops::Mul<i64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(self, factor: i64) -> LinearExpr {
        LinearExpr {
            terms: self
                .terms
                .into_iter()
                .filter(|_| factor != 0)
                .map(|(coef, var)| (coef * factor, var))
                .collect(),
            constant: self.constant * factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

impl Relation {
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Relation::Eq => lhs == rhs,
            Relation::Le => lhs <= rhs,
            Relation::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Eq => "==",
            Relation::Le => "<=",
            Relation::Ge => ">=",
        })
    }
}

/// Which rule a constraint row encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintFamily {
    /// Each part is scheduled exactly once.
    PartCoverage,
    /// A room hosts at most one session per slot.
    RoomSlot,
    /// An instructor teaches at most one session per slot.
    InstructorSlot,
    /// Links instructor session counts to `max_sessions` / `min_sessions`.
    SessionBounds,
    /// Links a participant's concurrent own-part sessions to their excess variable.
    OverlapExcess,
    /// Optional cap on `max_sessions - min_sessions`.
    SessionSpread,
}

/// `expr (relation) rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub family: ConstraintFamily,
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: i64,
}

impl LinearConstraint {
    pub fn holds(&self, assignment: &Assignment) -> bool {
        self.relation.holds(self.expr.evaluate(assignment), self.rhs)
    }

    /// No variables left and the constant side already fails, e.g. `0 == 1`.
    pub fn is_trivially_violated(&self) -> bool {
        self.expr.is_constant() && !self.relation.holds(self.expr.constant_value(), self.rhs)
    }
}

/// One value per variable, indexed by [`VarId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    values: Vec<i64>,
}

impl Assignment {
    pub fn from_values(values: Vec<i64>) -> Self {
        Self { values }
    }

    /// All variables at zero.
    pub fn zeroed(num_vars: usize) -> Self {
        Self {
            values: vec![0; num_vars],
        }
    }

    pub fn value(&self, var: VarId) -> i64 {
        self.values.get(var.0).copied().unwrap_or(0)
    }

    pub fn is_true(&self, var: VarId) -> bool {
        self.value(var) != 0
    }

    pub fn set(&mut self, var: VarId, value: i64) {
        if var.0 >= self.values.len() {
            self.values.resize(var.0 + 1, 0);
        }
        self.values[var.0] = value;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Accumulates variables and constraints. Turn it into a [`LinearModel`] with [`ModelBuilder::finish`].
#[derive(Debug, Default)]
pub struct ModelBuilder {
    variables: Vec<VarDef>,
    constraints: Vec<LinearConstraint>,
    objective: LinearExpr,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.push_var(name.into(), Domain::Bool)
    }

    pub fn new_int_var(&mut self, min: i64, max: i64, name: impl Into<String>) -> VarId {
        self.push_var(name.into(), Domain::Int { min, max })
    }

    fn push_var(&mut self, name: String, domain: Domain) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(VarDef { name, domain });
        id
    }

    pub fn add(&mut self, family: ConstraintFamily, expr: LinearExpr, relation: Relation, rhs: i64) {
        self.constraints.push(LinearConstraint {
            family,
            expr,
            relation,
            rhs,
        });
    }

    pub fn add_eq(&mut self, family: ConstraintFamily, expr: LinearExpr, rhs: i64) {
        self.add(family, expr, Relation::Eq, rhs);
    }

    pub fn add_le(&mut self, family: ConstraintFamily, expr: LinearExpr, rhs: i64) {
        self.add(family, expr, Relation::Le, rhs);
    }

    pub fn add_ge(&mut self, family: ConstraintFamily, expr: LinearExpr, rhs: i64) {
        self.add(family, expr, Relation::Ge, rhs);
    }

    pub fn add_exactly_one(&mut self, family: ConstraintFamily, vars: impl IntoIterator<Item = VarId>) {
        self.add_eq(family, LinearExpr::sum(vars), 1);
    }

    pub fn add_at_most_one(&mut self, family: ConstraintFamily, vars: impl IntoIterator<Item = VarId>) {
        self.add_le(family, LinearExpr::sum(vars), 1);
    }

    /// Adds `expr` to the objective being minimized.
    pub fn minimize(&mut self, expr: LinearExpr) {
        let objective = std::mem::take(&mut self.objective);
        self.objective = objective + expr;
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn finish(self) -> LinearModel {
        LinearModel {
            variables: self.variables,
            constraints: self.constraints,
            objective: self.objective,
        }
    }
}

/// Immutable model snapshot: what an engine receives.
#[derive(Debug, Clone)]
pub struct LinearModel {
    variables: Vec<VarDef>,
    constraints: Vec<LinearConstraint>,
    objective: LinearExpr,
}

impl LinearModel {
    pub fn variables(&self) -> &[VarDef] {
        &self.variables
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn constraints_in(&self, family: ConstraintFamily) -> impl Iterator<Item = &LinearConstraint> {
        self.constraints.iter().filter(move |c| c.family == family)
    }

    /// First constraint that no assignment can satisfy, if any.
    pub fn trivially_infeasible(&self) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| c.is_trivially_violated())
    }

    pub fn evaluate(&self, assignment: &Assignment) -> i64 {
        self.objective.evaluate(assignment)
    }

    /// Every value sits in its domain and every constraint holds.
    pub fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        self.variables
            .iter()
            .enumerate()
            .all(|(i, def)| def.domain.contains(assignment.value(VarId(i))))
            && self.constraints.iter().all(|c| c.holds(assignment))
    }
}
