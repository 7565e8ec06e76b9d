//! Vanilla greedy execution loop.

use std::sync::Arc;

use tracing::debug;

use crate::constraint::{ConstraintRef, ConstraintSet, Knapsack};
use crate::cost_function::CostFunction;
use crate::element::{ElementId, ElementSet, GroundSet};
use crate::error::GreedyError;

/// Brute-force greedy optimizer for monotone objectives.
///
/// Wire up a ground set, a cost function, and zero or more constraints, then
/// call [`run_greedy`](VanillaGreedy::run_greedy). The solution set, its
/// value, and the saturation flag are readable afterwards; [`clear_set`]
/// (VanillaGreedy::clear_set) resets run state so the same instance can be
/// reused.
///
/// In cost-benefit mode (with a knapsack constraint attached) candidates are
/// ranked by marginal gain per unit of marginal constraint weight instead of
/// raw gain. A candidate with zero marginal cost is infinitely attractive
/// when its gain is positive and skipped otherwise.
#[derive(Default)]
pub struct VanillaGreedy {
    ground_set: Option<Arc<GroundSet>>,
    cost_function: Option<Arc<dyn CostFunction>>,
    constraints: ConstraintSet,
    cost_benefit: bool,
    max_rounds: Option<usize>,
    curr_set: ElementSet,
    curr_val: f64,
    saturated: bool,
}

impl VanillaGreedy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ground_set(&mut self, ground_set: Arc<GroundSet>) {
        self.ground_set = Some(ground_set);
    }

    pub fn set_cost_function(&mut self, cost_function: Arc<dyn CostFunction>) {
        self.cost_function = Some(cost_function);
    }

    pub fn add_constraint(&mut self, constraint: ConstraintRef) {
        self.constraints.add(constraint);
    }

    pub fn remove_constraint(&mut self, constraint: &ConstraintRef) {
        self.constraints.remove(constraint);
    }

    /// Enables ranking by cost-benefit ratio instead of raw marginal gain.
    pub fn set_cost_benefit(&mut self, cost_benefit: bool) {
        self.cost_benefit = cost_benefit;
    }

    /// Caps the number of greedy rounds. `None` (the default) terminates on
    /// saturation only.
    pub fn set_max_rounds(&mut self, max_rounds: Option<usize>) {
        self.max_rounds = max_rounds;
    }

    /// The current solution set.
    pub fn solution(&self) -> &ElementSet {
        &self.curr_set
    }

    /// Objective value of the current solution.
    pub fn value(&self) -> f64 {
        self.curr_val
    }

    /// Whether the last run ended with the constraint set saturated.
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    /// Resets run state for reuse; configuration is kept.
    pub fn clear_set(&mut self) {
        self.curr_set.clear();
        self.curr_val = 0.0;
        self.saturated = false;
    }

    /// Runs the greedy loop until saturation (or the round cap).
    pub fn run_greedy(&mut self) -> Result<(), GreedyError> {
        let ground = self
            .ground_set
            .clone()
            .filter(|g| !g.is_empty())
            .ok_or(GreedyError::EmptyGroundSet)?;
        let cost = self
            .cost_function
            .clone()
            .ok_or(GreedyError::MissingCostFunction)?;

        if self.cost_benefit {
            let member = self
                .constraints
                .knapsack_member()
                .ok_or(GreedyError::CostBenefitWithoutKnapsack)?;
            // resume-safe: price the budget already consumed
            let knap = member.as_knapsack().ok_or(GreedyError::CostBenefitWithoutKnapsack)?;
            let mut curr_cost = knap.value(&self.curr_set);
            let mut round = 0usize;
            while !self.saturated && self.max_rounds.is_none_or(|cap| round < cap) {
                round += 1;
                self.cost_benefit_step(&ground, cost.as_ref(), knap, &mut curr_cost);
                debug!(
                    round,
                    size = self.curr_set.len(),
                    value = self.curr_val,
                    budget_used = curr_cost,
                    "vanilla cost-benefit greedy round"
                );
            }
        } else {
            let mut round = 0usize;
            while !self.saturated && self.max_rounds.is_none_or(|cap| round < cap) {
                round += 1;
                self.greedy_step(&ground, cost.as_ref());
                debug!(
                    round,
                    size = self.curr_set.len(),
                    value = self.curr_val,
                    "vanilla greedy round"
                );
            }
        }
        Ok(())
    }

    /// One round: scan every candidate, commit the strictly best positive
    /// marginal gain. Ties break toward the lower id.
    fn greedy_step(&mut self, ground: &GroundSet, cost: &dyn CostFunction) {
        let mut best: Option<(ElementId, f64)> = None;

        for el in ground.iter() {
            if self.curr_set.contains(&el.id) {
                continue;
            }

            let mut test_set = self.curr_set.clone();
            test_set.insert(el.id);
            if !self.constraints.permits(&test_set) {
                continue;
            }

            let gain = cost.evaluate(&test_set) - self.curr_val;
            if best.is_none_or(|(bid, b)| gain > b || (gain == b && el.id < bid)) {
                best = Some((el.id, gain));
            }
        }

        match best {
            Some((id, gain)) if gain > 0.0 => {
                self.curr_set.insert(id);
                self.curr_val += gain;
                self.saturated = self.constraints.any_saturated(&self.curr_set);
            }
            _ => self.saturated = true,
        }
    }

    /// One cost-benefit round: rank by `Δvalue / Δcost` against the knapsack.
    fn cost_benefit_step(
        &mut self,
        ground: &GroundSet,
        cost: &dyn CostFunction,
        knapsack: &Knapsack,
        curr_cost: &mut f64,
    ) {
        let mut best: Option<(ElementId, f64, f64, f64)> = None; // (id, ratio, gain, cost)

        for el in ground.iter() {
            if self.curr_set.contains(&el.id) {
                continue;
            }

            let mut test_set = self.curr_set.clone();
            test_set.insert(el.id);
            if !self.constraints.permits(&test_set) {
                continue;
            }

            let gain = cost.evaluate(&test_set) - self.curr_val;
            let marginal_cost = knapsack.value(&test_set) - *curr_cost;
            let ratio = if marginal_cost == 0.0 {
                if gain > 0.0 {
                    f64::INFINITY
                } else {
                    continue; // free but worthless, never pick it
                }
            } else {
                gain / marginal_cost
            };

            if best.is_none_or(|(bid, r, _, _)| ratio > r || (ratio == r && el.id < bid)) {
                best = Some((el.id, ratio, gain, marginal_cost));
            }
        }

        match best {
            Some((id, _, gain, marginal_cost)) if gain > 0.0 => {
                self.curr_set.insert(id);
                self.curr_val += gain;
                *curr_cost += marginal_cost;
                self.saturated = self.constraints.any_saturated(&self.curr_set);
            }
            _ => self.saturated = true,
        }
    }
}
