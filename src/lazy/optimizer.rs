//! Lazy greedy execution loop.
//!
//! The correctness-critical piece is the re-evaluation loop in
//! [`LazyGreedy::lazy_step`]: the inner loop may only stop once the
//! re-scored queue top is still the maximum among all remaining candidates.
//! Breaking on a stale comparison would silently commit a non-greedy pick.

use std::sync::Arc;

use tracing::debug;

use crate::constraint::{ConstraintRef, ConstraintSet, Knapsack};
use crate::cost_function::CostFunction;
use crate::element::{ElementSet, GroundSet};
use crate::error::GreedyError;
use crate::marginals::{MarginalQueue, Scored};

/// Priority-queue accelerated greedy optimizer for monotone submodular
/// objectives.
///
/// Produces the same solutions as [`VanillaGreedy`](crate::vanilla::VanillaGreedy)
/// on identical deterministic inputs, with far fewer oracle calls: only
/// elements that resurface at the top of the marginal queue are re-scored.
#[derive(Default)]
pub struct LazyGreedy {
    ground_set: Option<Arc<GroundSet>>,
    cost_function: Option<Arc<dyn CostFunction>>,
    constraints: ConstraintSet,
    cost_benefit: bool,
    max_rounds: Option<usize>,
    curr_set: ElementSet,
    curr_val: f64,
    saturated: bool,
}

impl LazyGreedy {
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

    pub fn solution(&self) -> &ElementSet {
        &self.curr_set
    }

    pub fn value(&self) -> f64 {
        self.curr_val
    }

    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    /// Resets run state for reuse; configuration is kept. The marginal queue
    /// is rebuilt from scratch on every run.
    pub fn clear_set(&mut self) {
        self.curr_set.clear();
        self.curr_val = 0.0;
        self.saturated = false;
    }

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

        let mut marginals = MarginalQueue::new();
        let mut round = 0usize;

        if self.cost_benefit {
            let member = self
                .constraints
                .knapsack_member()
                .ok_or(GreedyError::CostBenefitWithoutKnapsack)?;
            let knap = member
                .as_knapsack()
                .ok_or(GreedyError::CostBenefitWithoutKnapsack)?;
            let mut curr_cost = knap.value(&self.curr_set);

            if !self.saturated && self.max_rounds.is_none_or(|cap| cap > 0) {
                round = 1;
                self.seed_queue_cost_benefit(&ground, cost.as_ref(), knap, curr_cost, &mut marginals);
                self.commit_top_cost_benefit(cost.as_ref(), knap, &mut marginals, &mut curr_cost);
            }
            while !self.saturated && self.max_rounds.is_none_or(|cap| round < cap) {
                round += 1;
                self.lazy_step_cost_benefit(cost.as_ref(), knap, &mut marginals, &mut curr_cost);
                debug!(
                    round,
                    size = self.curr_set.len(),
                    value = self.curr_val,
                    budget_used = curr_cost,
                    "lazy cost-benefit greedy round"
                );
            }
        } else {
            if !self.saturated && self.max_rounds.is_none_or(|cap| cap > 0) {
                round = 1;
                self.seed_queue(&ground, cost.as_ref(), &mut marginals);
                self.commit_top(&mut marginals);
            }
            while !self.saturated && self.max_rounds.is_none_or(|cap| round < cap) {
                round += 1;
                self.lazy_step(cost.as_ref(), &mut marginals);
                debug!(
                    round,
                    size = self.curr_set.len(),
                    value = self.curr_val,
                    "lazy greedy round"
                );
            }
        }
        Ok(())
    }

    /// First iteration: evaluate every feasible candidate once and seed the
    /// queue with exact marginals.
    fn seed_queue(&self, ground: &GroundSet, cost: &dyn CostFunction, marginals: &mut MarginalQueue) {
        for el in ground.iter() {
            if self.curr_set.contains(&el.id) {
                continue;
            }
            let mut test_set = self.curr_set.clone();
            test_set.insert(el.id);
            if !self.constraints.permits(&test_set) {
                continue;
            }
            marginals.push(Scored::new(el.id, cost.evaluate(&test_set) - self.curr_val));
        }
    }

    /// Commits the queue top if its cached score is strictly positive.
    fn commit_top(&mut self, marginals: &mut MarginalQueue) {
        match marginals.peek().copied() {
            Some(best) if best.score > 0.0 => {
                marginals.pop();
                self.curr_set.insert(best.id);
                self.curr_val += best.score;
                self.saturated = self.constraints.any_saturated(&self.curr_set);
            }
            _ => self.saturated = true,
        }
    }

    /// One lazy round: re-score queue tops until the freshest score is still
    /// the maximum, then commit it. Infeasible candidates are evicted
    /// instead of re-pushed.
    fn lazy_step(&mut self, cost: &dyn CostFunction, marginals: &mut MarginalQueue) {
        while let Some(top) = marginals.peek().copied() {
            let mut test_set = self.curr_set.clone();
            test_set.insert(top.id);
            if !self.constraints.permits(&test_set) {
                marginals.pop();
                continue;
            }

            let fresh = cost.evaluate(&test_set) - self.curr_val;
            marginals.pop();
            marginals.push(Scored::new(top.id, fresh));

            // still on top after re-scoring: guaranteed best by
            // submodularity, and its cached score is known fresh
            if marginals.peek().is_some_and(|t| t.id == top.id) {
                break;
            }
        }
        self.commit_top(marginals);
    }

    /// Seeds the queue with cost-benefit ratios.
    fn seed_queue_cost_benefit(
        &self,
        ground: &GroundSet,
        cost: &dyn CostFunction,
        knapsack: &Knapsack,
        curr_cost: f64,
        marginals: &mut MarginalQueue,
    ) {
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
            let marginal_cost = knapsack.value(&test_set) - curr_cost;
            if let Some(ratio) = cost_benefit_ratio(gain, marginal_cost) {
                marginals.push(Scored::new(el.id, ratio));
            }
        }
    }

    /// Commits the ratio-queue top, re-deriving its unscaled gain and budget
    /// consumption against the present solution.
    fn commit_top_cost_benefit(
        &mut self,
        cost: &dyn CostFunction,
        knapsack: &Knapsack,
        marginals: &mut MarginalQueue,
        curr_cost: &mut f64,
    ) {
        let Some(best) = marginals.peek().copied() else {
            self.saturated = true;
            return;
        };
        if best.score <= 0.0 {
            self.saturated = true;
            return;
        }
        let mut test_set = self.curr_set.clone();
        test_set.insert(best.id);
        let gain = cost.evaluate(&test_set) - self.curr_val;
        let marginal_cost = knapsack.value(&test_set) - *curr_cost;
        if gain > 0.0 {
            marginals.pop();
            self.curr_set.insert(best.id);
            self.curr_val += gain;
            *curr_cost += marginal_cost;
            self.saturated = self.constraints.any_saturated(&self.curr_set);
        } else {
            self.saturated = true;
        }
    }

    fn lazy_step_cost_benefit(
        &mut self,
        cost: &dyn CostFunction,
        knapsack: &Knapsack,
        marginals: &mut MarginalQueue,
        curr_cost: &mut f64,
    ) {
        while let Some(top) = marginals.peek().copied() {
            let mut test_set = self.curr_set.clone();
            test_set.insert(top.id);
            if !self.constraints.permits(&test_set) {
                marginals.pop();
                continue;
            }

            let gain = cost.evaluate(&test_set) - self.curr_val;
            let marginal_cost = knapsack.value(&test_set) - *curr_cost;
            marginals.pop();
            let Some(ratio) = cost_benefit_ratio(gain, marginal_cost) else {
                continue; // free and worthless, evict
            };
            marginals.push(Scored::new(top.id, ratio));

            if marginals.peek().is_some_and(|t| t.id == top.id) {
                break;
            }
        }
        self.commit_top_cost_benefit(cost, knapsack, marginals, curr_cost);
    }
}

/// Ratio policy for zero marginal cost: infinitely attractive when the gain
/// is positive, excluded when it is not.
fn cost_benefit_ratio(gain: f64, marginal_cost: f64) -> Option<f64> {
    if marginal_cost == 0.0 {
        if gain > 0.0 {
            Some(f64::INFINITY)
        } else {
            None
        }
    } else {
        Some(gain / marginal_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Cardinality;
    use crate::cost_function::{Modular, SquareRootModular};
    use crate::element::ElementId;
    use crate::vanilla::VanillaGreedy;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn squared_weights(n: usize) -> (Arc<GroundSet>, HashMap<ElementId, f64>) {
        let ground = Arc::new(GroundSet::generate(n));
        let weights: HashMap<ElementId, f64> =
            (1..=n as ElementId).map(|i| (i, (i * i) as f64)).collect();
        (ground, weights)
    }

    #[test]
    fn test_modular_optimality() {
        let (ground, weights) = squared_weights(10);
        let mut lazy = LazyGreedy::new();
        lazy.set_ground_set(ground);
        lazy.set_cost_function(Arc::new(Modular::new(weights)));
        lazy.add_constraint(Arc::new(Cardinality::new(3)));
        lazy.run_greedy().unwrap();

        let expected: ElementSet = [8, 9, 10].into_iter().collect();
        assert_eq!(lazy.solution(), &expected);
        assert!((lazy.value() - 245.0).abs() < 1e-9);
        assert!(lazy.is_saturated());
    }

    #[test]
    fn test_matches_vanilla_on_submodular_objective() {
        let (ground, weights) = squared_weights(12);
        let cost: Arc<dyn CostFunction> =
            Arc::new(SquareRootModular::new(Modular::new(weights)));
        let constraint: ConstraintRef = Arc::new(Cardinality::new(4));

        let mut vanilla = VanillaGreedy::new();
        vanilla.set_ground_set(Arc::clone(&ground));
        vanilla.set_cost_function(Arc::clone(&cost));
        vanilla.add_constraint(Arc::clone(&constraint));
        vanilla.run_greedy().unwrap();

        let mut lazy = LazyGreedy::new();
        lazy.set_ground_set(ground);
        lazy.set_cost_function(cost);
        lazy.add_constraint(constraint);
        lazy.run_greedy().unwrap();

        assert_eq!(lazy.solution(), vanilla.solution());
        assert!((lazy.value() - vanilla.value()).abs() < 1e-9);
    }

    #[test]
    fn test_matches_vanilla_under_tied_gains() {
        // uniform weights tie every marginal gain; both sides must resolve
        // the tie identically even when insertion order is not ascending
        use crate::element::Element;
        let ground = Arc::new(GroundSet::new(vec![
            Element::new(2, 0.0),
            Element::new(1, 0.0),
            Element::new(4, 0.0),
            Element::new(3, 0.0),
        ]));
        let cost: Arc<dyn CostFunction> = Arc::new(Modular::uniform(5.0));
        let constraint: ConstraintRef = Arc::new(Cardinality::new(2));

        let mut vanilla = VanillaGreedy::new();
        vanilla.set_ground_set(Arc::clone(&ground));
        vanilla.set_cost_function(Arc::clone(&cost));
        vanilla.add_constraint(Arc::clone(&constraint));
        vanilla.run_greedy().unwrap();

        let mut lazy = LazyGreedy::new();
        lazy.set_ground_set(ground);
        lazy.set_cost_function(cost);
        lazy.add_constraint(constraint);
        lazy.run_greedy().unwrap();

        let expected: ElementSet = [1, 2].into_iter().collect();
        assert_eq!(vanilla.solution(), &expected);
        assert_eq!(lazy.solution(), vanilla.solution());
    }

    #[test]
    fn test_clear_set_idempotence() {
        let (ground, weights) = squared_weights(10);
        let mut lazy = LazyGreedy::new();
        lazy.set_ground_set(ground);
        lazy.set_cost_function(Arc::new(Modular::new(weights)));
        lazy.add_constraint(Arc::new(Cardinality::new(3)));
        lazy.run_greedy().unwrap();
        let first_set = lazy.solution().clone();
        let first_val = lazy.value();

        lazy.clear_set();
        lazy.run_greedy().unwrap();
        assert_eq!(lazy.solution(), &first_set);
        assert!((lazy.value() - first_val).abs() < 1e-12);
    }

    #[test]
    fn test_configuration_errors() {
        let mut lazy = LazyGreedy::new();
        assert_eq!(lazy.run_greedy(), Err(GreedyError::EmptyGroundSet));

        lazy.set_ground_set(Arc::new(GroundSet::generate(3)));
        assert_eq!(lazy.run_greedy(), Err(GreedyError::MissingCostFunction));

        lazy.set_cost_function(Arc::new(Modular::unit()));
        lazy.set_cost_benefit(true);
        assert_eq!(
            lazy.run_greedy(),
            Err(GreedyError::CostBenefitWithoutKnapsack)
        );
    }

    #[test]
    fn test_cost_benefit_matches_vanilla() {
        let ground = Arc::new(GroundSet::generate(6));
        let values: HashMap<ElementId, f64> =
            [(1, 6.0), (2, 5.0), (3, 4.0), (4, 9.0), (5, 2.0), (6, 7.0)].into();
        let costs: HashMap<ElementId, f64> =
            [(1, 6.0), (2, 1.0), (3, 1.0), (4, 9.0), (5, 4.0), (6, 5.0)].into();
        let cost: Arc<dyn CostFunction> = Arc::new(Modular::new(values));
        let knapsack: ConstraintRef = Arc::new(Knapsack::new(Modular::new(costs), 7.0));

        let mut vanilla = VanillaGreedy::new();
        vanilla.set_ground_set(Arc::clone(&ground));
        vanilla.set_cost_function(Arc::clone(&cost));
        vanilla.add_constraint(Arc::clone(&knapsack));
        vanilla.set_cost_benefit(true);
        vanilla.run_greedy().unwrap();

        let mut lazy = LazyGreedy::new();
        lazy.set_ground_set(ground);
        lazy.set_cost_function(cost);
        lazy.add_constraint(knapsack);
        lazy.set_cost_benefit(true);
        lazy.run_greedy().unwrap();

        assert_eq!(lazy.solution(), vanilla.solution());
        assert!((lazy.value() - vanilla.value()).abs() < 1e-9);
    }

    proptest! {
        /// Lazy and vanilla implement the same greedy rule, so they must
        /// agree for arbitrary positive weight vectors.
        #[test]
        fn prop_lazy_equals_vanilla(
            raw in prop::collection::vec(0.01f64..100.0, 2..16),
            budget in 1usize..6,
        ) {
            let n = raw.len();
            let ground = Arc::new(GroundSet::generate(n));
            let weights: HashMap<ElementId, f64> = raw
                .iter()
                .enumerate()
                .map(|(i, w)| ((i + 1) as ElementId, *w))
                .collect();
            let cost: Arc<dyn CostFunction> =
                Arc::new(SquareRootModular::new(Modular::new(weights)));
            let constraint: ConstraintRef = Arc::new(Cardinality::new(budget));

            let mut vanilla = VanillaGreedy::new();
            vanilla.set_ground_set(Arc::clone(&ground));
            vanilla.set_cost_function(Arc::clone(&cost));
            vanilla.add_constraint(Arc::clone(&constraint));
            vanilla.run_greedy().unwrap();

            let mut lazy = LazyGreedy::new();
            lazy.set_ground_set(ground);
            lazy.set_cost_function(cost);
            lazy.add_constraint(constraint);
            lazy.run_greedy().unwrap();

            prop_assert_eq!(lazy.solution(), vanilla.solution());
            prop_assert!((lazy.value() - vanilla.value()).abs() < 1e-9);
        }
    }
}
