//! Bidirectional greedy execution loop.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::constraint::ConstraintRef;
use crate::cost_function::CostFunction;
use crate::element::{ElementSet, GroundSet};
use crate::error::GreedyError;

/// Double-greedy optimizer for possibly non-monotone objectives,
/// unconstrained only.
///
/// Attaching a constraint is reported as [`GreedyError::ConstraintUnsupported`]
/// and changes nothing. The deterministic variant carries a 1/3
/// approximation guarantee, the randomized variant 1/2 in expectation.
#[derive(Default)]
pub struct BidirectionalGreedy {
    ground_set: Option<Arc<GroundSet>>,
    cost_function: Option<Arc<dyn CostFunction>>,
    seed: Option<u64>,
    top_set: ElementSet,
    top_val: f64,
    bottom_set: ElementSet,
    bottom_val: f64,
    curr_set: ElementSet,
    curr_val: f64,
}

impl BidirectionalGreedy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ground_set(&mut self, ground_set: Arc<GroundSet>) {
        self.ground_set = Some(ground_set);
    }

    pub fn set_cost_function(&mut self, cost_function: Arc<dyn CostFunction>) {
        self.cost_function = Some(cost_function);
    }

    /// Bidirectional greedy is unconstrained; this always reports
    /// [`GreedyError::ConstraintUnsupported`] without attaching anything.
    pub fn add_constraint(&mut self, _constraint: ConstraintRef) -> Result<(), GreedyError> {
        Err(GreedyError::ConstraintUnsupported)
    }

    /// Seeds the randomized variant for reproducible runs.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = Some(seed);
    }

    /// The better of the two evolving sets after the last run.
    pub fn solution(&self) -> &ElementSet {
        &self.curr_set
    }

    pub fn value(&self) -> f64 {
        self.curr_val
    }

    /// Resets run state for reuse; configuration is kept.
    pub fn clear_set(&mut self) {
        self.top_set.clear();
        self.top_val = 0.0;
        self.bottom_set.clear();
        self.bottom_val = 0.0;
        self.curr_set.clear();
        self.curr_val = 0.0;
    }

    /// Deterministic double greedy: each element goes to whichever side
    /// gains more, ties to `bottom`.
    pub fn run_greedy(&mut self) -> Result<(), GreedyError> {
        self.run(false)
    }

    /// Randomized double greedy: draws sides with probability proportional
    /// to the clamped gains.
    pub fn run_randomized_greedy(&mut self) -> Result<(), GreedyError> {
        self.run(true)
    }

    fn run(&mut self, randomized: bool) -> Result<(), GreedyError> {
        let ground = self
            .ground_set
            .clone()
            .filter(|g| !g.is_empty())
            .ok_or(GreedyError::EmptyGroundSet)?;
        let cost = self
            .cost_function
            .clone()
            .ok_or(GreedyError::MissingCostFunction)?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        self.top_set = ground.id_set();
        self.top_val = cost.evaluate(&self.top_set);
        self.bottom_set.clear();
        self.bottom_val = cost.evaluate(&self.bottom_set); // F(∅), not assumed 0

        // fixed processing order: ground-set insertion order
        for (step, el) in ground.iter().enumerate() {
            let mut test_set = self.bottom_set.clone();
            test_set.insert(el.id);
            let bottom_gain = cost.evaluate(&test_set) - self.bottom_val;

            let mut test_set = self.top_set.clone();
            test_set.remove(&el.id);
            let top_gain = cost.evaluate(&test_set) - self.top_val;

            let take_bottom = if randomized {
                let clamped_bottom = bottom_gain.max(0.0);
                let denom = clamped_bottom + top_gain.max(0.0);
                // both clamped gains zero: default to bottom
                denom == 0.0 || rng.random::<f64>() <= clamped_bottom / denom
            } else {
                bottom_gain >= top_gain
            };

            if take_bottom {
                self.bottom_set.insert(el.id);
                self.bottom_val += bottom_gain;
            } else {
                self.top_set.remove(&el.id);
                self.top_val += top_gain;
            }

            // track the better side after every step
            if self.top_val > self.bottom_val {
                self.curr_set = self.top_set.clone();
                self.curr_val = self.top_val;
            } else {
                self.curr_set = self.bottom_set.clone();
                self.curr_val = self.bottom_val;
            }

            debug!(
                step = step + 1,
                randomized,
                top = self.top_set.len(),
                bottom = self.bottom_set.len(),
                value = self.curr_val,
                "bidirectional greedy step"
            );

            if self.top_set == self.bottom_set {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Cardinality;
    use crate::cost_function::{CenteredSqrtModular, Modular};
    use crate::element::ElementId;
    use std::collections::HashMap;

    #[test]
    fn test_constraints_are_rejected() {
        let mut greedy = BidirectionalGreedy::new();
        assert_eq!(
            greedy.add_constraint(Arc::new(Cardinality::new(3))),
            Err(GreedyError::ConstraintUnsupported)
        );
    }

    #[test]
    fn test_monotone_modular_returns_full_ground_set() {
        // adding is never harmful for a monotone objective, so both sides
        // converge on the whole universe
        let n = 8usize;
        let ground = Arc::new(GroundSet::generate(n));
        let weights: HashMap<ElementId, f64> =
            (1..=n as ElementId).map(|i| (i, i as f64)).collect();
        let total: f64 = weights.values().sum();

        let mut greedy = BidirectionalGreedy::new();
        greedy.set_ground_set(Arc::clone(&ground));
        greedy.set_cost_function(Arc::new(Modular::new(weights)));
        greedy.run_greedy().unwrap();

        assert_eq!(greedy.solution(), &ground.id_set());
        assert!((greedy.value() - total).abs() < 1e-9);
    }

    #[test]
    fn test_sides_converge_and_value_is_consistent() {
        let ground = Arc::new(GroundSet::generate(9));
        let cost = CenteredSqrtModular::centered(4.0, 10.0);

        let mut greedy = BidirectionalGreedy::new();
        greedy.set_ground_set(ground);
        greedy.set_cost_function(Arc::new(cost.clone()));
        greedy.run_greedy().unwrap();

        // after a full pass both sides are the same set, and the reported
        // value matches a fresh evaluation of the reported set
        assert_eq!(greedy.top_set, greedy.bottom_set);
        let reported = greedy.value();
        let fresh = crate::cost_function::CostFunction::evaluate(&cost, greedy.solution());
        assert!((reported - fresh).abs() < 1e-9);
    }

    #[test]
    fn test_non_monotone_beats_both_extremes() {
        // unit weights centered at 4 of 9: peak is any 4-element subset;
        // both the empty set and the full set are strictly worse
        let ground = Arc::new(GroundSet::generate(9));
        let cost = CenteredSqrtModular::centered(4.0, 10.0);
        let empty_val = CostFunction::evaluate(&cost, &ElementSet::new());
        let full_val = CostFunction::evaluate(&cost, &ground.id_set());

        let mut greedy = BidirectionalGreedy::new();
        greedy.set_ground_set(ground);
        greedy.set_cost_function(Arc::new(cost));
        greedy.run_greedy().unwrap();

        assert!(greedy.value() >= empty_val);
        assert!(greedy.value() >= full_val);
    }

    #[test]
    fn test_randomized_is_reproducible_with_seed() {
        let ground = Arc::new(GroundSet::generate(10));
        let cost: Arc<dyn CostFunction> = Arc::new(CenteredSqrtModular::centered(5.0, 8.0));

        let mut greedy = BidirectionalGreedy::new();
        greedy.set_ground_set(Arc::clone(&ground));
        greedy.set_cost_function(Arc::clone(&cost));
        greedy.set_seed(2024);
        greedy.run_randomized_greedy().unwrap();
        let first_set = greedy.solution().clone();
        let first_val = greedy.value();

        greedy.clear_set();
        greedy.run_randomized_greedy().unwrap();
        assert_eq!(greedy.solution(), &first_set);
        assert!((greedy.value() - first_val).abs() < 1e-12);
    }

    #[test]
    fn test_missing_configuration_errors() {
        let mut greedy = BidirectionalGreedy::new();
        assert_eq!(greedy.run_greedy(), Err(GreedyError::EmptyGroundSet));
        greedy.set_ground_set(Arc::new(GroundSet::generate(3)));
        assert_eq!(greedy.run_greedy(), Err(GreedyError::MissingCostFunction));
    }
}
