//! Feasibility and saturation oracles.
//!
//! A [`Constraint`] answers two questions about a candidate set: may it be a
//! solution (`test_membership`), and is it at its tight bound so that no
//! further addition is possible even in principle (`is_saturated`).
//!
//! Constraint subtypes are detected through capability queries
//! ([`Constraint::as_knapsack`], [`Constraint::as_cardinality`]) instead of
//! runtime type identity, which makes rules like "stochastic sampling needs a
//! cardinality constraint" visible, testable preconditions.

use std::sync::Arc;

use crate::cost_function::{CostFunction, Modular};
use crate::element::{ElementId, ElementSet};

/// Default saturation tolerance, matching single-precision epsilon.
pub const DEFAULT_TOLERANCE: f64 = f32::EPSILON as f64;

/// A stateless feasibility/saturation predicate over element sets.
pub trait Constraint: Send + Sync {
    /// True if the set does not violate the constraint.
    fn test_membership(&self, set: &ElementSet) -> bool;

    /// True if the singleton `{el}` does not violate the constraint.
    fn test_element(&self, el: ElementId) -> bool;

    /// True if the bound is tight: no further additions are feasible.
    fn is_saturated(&self, set: &ElementSet) -> bool;

    /// Knapsack view, when this constraint is (or wraps) a knapsack.
    fn as_knapsack(&self) -> Option<&Knapsack> {
        None
    }

    /// Cardinality view, when this constraint is a cardinality bound.
    fn as_cardinality(&self) -> Option<&Cardinality> {
        None
    }
}

/// Budgeted modular-weight constraint: `Σ w(e) ≤ budget`.
///
/// Saturation uses a named tolerance rather than exact equality: a set whose
/// weight lands within `tolerance` of the budget counts as saturated even if
/// strictly under it, which can stop a run one step early. Pick a tolerance
/// that suits the objective's numeric scale via [`Knapsack::with_tolerance`].
#[derive(Debug, Clone)]
pub struct Knapsack {
    weights: Modular,
    budget: f64,
    tolerance: f64,
}

impl Knapsack {
    pub fn new(weights: Modular, budget: f64) -> Self {
        Self {
            weights,
            budget,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Unit-weight knapsack, i.e. a cardinality bound expressed as weight.
    pub fn uniform(budget: f64) -> Self {
        Self::new(Modular::unit(), budget)
    }

    /// Overrides the saturation tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Total constraint weight of a set; the denominator of cost-benefit
    /// ratios.
    pub fn value(&self, set: &ElementSet) -> f64 {
        self.weights.evaluate(set)
    }

    /// Constraint weight of a single element.
    pub fn value_one(&self, el: ElementId) -> f64 {
        self.weights.evaluate_one(el)
    }
}

impl Constraint for Knapsack {
    fn test_membership(&self, set: &ElementSet) -> bool {
        self.value(set) <= self.budget
    }

    fn test_element(&self, el: ElementId) -> bool {
        self.value_one(el) <= self.budget
    }

    fn is_saturated(&self, set: &ElementSet) -> bool {
        (self.value(set) - self.budget).abs() < self.tolerance
    }

    fn as_knapsack(&self) -> Option<&Knapsack> {
        Some(self)
    }
}

/// Unweighted count bound: `|S| ≤ k`.
///
/// A knapsack with unit weights; kept as its own type so algorithms that are
/// only valid under cardinality constraints can require it explicitly.
#[derive(Debug, Clone)]
pub struct Cardinality {
    inner: Knapsack,
    budget: usize,
}

impl Cardinality {
    pub fn new(budget: usize) -> Self {
        Self {
            inner: Knapsack::uniform(budget as f64),
            budget,
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }
}

impl Constraint for Cardinality {
    fn test_membership(&self, set: &ElementSet) -> bool {
        self.inner.test_membership(set)
    }

    fn test_element(&self, el: ElementId) -> bool {
        self.inner.test_element(el)
    }

    fn is_saturated(&self, set: &ElementSet) -> bool {
        self.inner.is_saturated(set)
    }

    fn as_knapsack(&self) -> Option<&Knapsack> {
        Some(&self.inner)
    }

    fn as_cardinality(&self) -> Option<&Cardinality> {
        Some(self)
    }
}

/// Shared handle to a constraint, usable across optimizer instances.
pub type ConstraintRef = Arc<dyn Constraint>;

/// The logical AND of a collection of constraints.
///
/// Membership requires every member to pass; saturation fires as soon as any
/// member is tight, since one saturated constraint makes the set maximal
/// under the conjunction.
#[derive(Clone, Default)]
pub struct ConstraintSet {
    members: Vec<ConstraintRef>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, constraint: ConstraintRef) {
        self.members.push(constraint);
    }

    /// Removes a member by handle identity.
    pub fn remove(&mut self, constraint: &ConstraintRef) {
        self.members.retain(|c| !Arc::ptr_eq(c, constraint));
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// True if every member admits the set. Vacuously true when empty.
    pub fn permits(&self, set: &ElementSet) -> bool {
        self.members.iter().all(|c| c.test_membership(set))
    }

    /// True if any member is at its tight bound.
    pub fn any_saturated(&self, set: &ElementSet) -> bool {
        self.members.iter().any(|c| c.is_saturated(set))
    }

    /// First member with a knapsack view, for cost-benefit scoring.
    pub fn knapsack_member(&self) -> Option<ConstraintRef> {
        self.members
            .iter()
            .find(|c| c.as_knapsack().is_some())
            .cloned()
    }

    /// The unique cardinality member, if the set consists of exactly one
    /// constraint and it is a cardinality bound. Anything else makes the
    /// notion of a sampling budget ambiguous.
    pub fn unique_cardinality(&self) -> Option<ConstraintRef> {
        match self.members.as_slice() {
            [only] if only.as_cardinality().is_some() => Some(Arc::clone(only)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintSet")
            .field("members", &self.members.len())
            .finish()
    }
}
