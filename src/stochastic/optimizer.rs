//! Stochastic greedy execution loop.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::constraint::{ConstraintRef, ConstraintSet};
use crate::cost_function::CostFunction;
use crate::element::{ElementId, ElementSet, GroundSet};
use crate::error::GreedyError;

const DEFAULT_EPSILON: f64 = 0.1;

/// Randomized sampling greedy, valid only under a unique cardinality
/// constraint.
///
/// [`add_constraint`](StochasticGreedy::add_constraint) rejects anything
/// that is not a cardinality bound, and `run_greedy` refuses to start unless
/// exactly one such constraint is attached. Seed the sampler through
/// [`set_seed`](StochasticGreedy::set_seed) for reproducible runs.
#[derive(Default)]
pub struct StochasticGreedy {
    ground_set: Option<Arc<GroundSet>>,
    cost_function: Option<Arc<dyn CostFunction>>,
    constraints: ConstraintSet,
    epsilon: f64,
    seed: Option<u64>,
    max_rounds: Option<usize>,
    curr_set: ElementSet,
    curr_val: f64,
    saturated: bool,
}

impl StochasticGreedy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ground_set(&mut self, ground_set: Arc<GroundSet>) {
        self.ground_set = Some(ground_set);
    }

    pub fn set_cost_function(&mut self, cost_function: Arc<dyn CostFunction>) {
        self.cost_function = Some(cost_function);
    }

    /// Attaches a constraint; only cardinality constraints are accepted.
    pub fn add_constraint(&mut self, constraint: ConstraintRef) -> Result<(), GreedyError> {
        if constraint.as_cardinality().is_none() {
            return Err(GreedyError::RequiresCardinality);
        }
        self.constraints.add(constraint);
        Ok(())
    }

    pub fn remove_constraint(&mut self, constraint: &ConstraintRef) {
        self.constraints.remove(constraint);
    }

    /// Sampling accuracy parameter in (0, 1); smaller means larger samples.
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    /// Seeds the sampler for reproducible runs.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = Some(seed);
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

    /// Resets run state for reuse; the sampling pool and eviction set are
    /// rebuilt on every run.
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
        let cardinality = self
            .constraints
            .unique_cardinality()
            .ok_or(GreedyError::RequiresUniqueCardinality)?;
        let budget = cardinality
            .as_cardinality()
            .ok_or(GreedyError::RequiresUniqueCardinality)?
            .budget();

        let epsilon = if self.epsilon > 0.0 && self.epsilon < 1.0 {
            self.epsilon
        } else {
            warn!(
                epsilon = self.epsilon,
                "epsilon not set or out of range, using default {DEFAULT_EPSILON}"
            );
            DEFAULT_EPSILON
        };

        let n = ground.len();
        let target = sample_size(n, budget, epsilon);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        // eligible pool: everything not yet committed or found infeasible
        let mut pool: Vec<ElementId> = ground.ids().collect();
        let mut evicted: ElementSet = ElementSet::new();
        let mut round = 0usize;

        while !self.saturated && self.max_rounds.is_none_or(|cap| round < cap) {
            round += 1;
            pool.retain(|id| !evicted.contains(id) && !self.curr_set.contains(id));
            if pool.is_empty() {
                self.saturated = true;
                break;
            }

            // sample bounded by the shrinking pool, never the original n
            let s = target.min(pool.len());
            let sample: Vec<ElementId> = rand::seq::index::sample(&mut rng, pool.len(), s)
                .into_iter()
                .map(|idx| pool[idx])
                .collect();
            self.stochastic_step(cost.as_ref(), &sample, &mut evicted);
            debug!(
                round,
                sampled = s,
                size = self.curr_set.len(),
                value = self.curr_val,
                "stochastic greedy round"
            );
        }
        Ok(())
    }

    /// Scores the sample only, commits the strictly best positive gain.
    fn stochastic_step(
        &mut self,
        cost: &dyn CostFunction,
        sample: &[ElementId],
        evicted: &mut ElementSet,
    ) {
        let mut best: Option<(ElementId, f64)> = None;

        for &id in sample {
            let mut test_set = self.curr_set.clone();
            test_set.insert(id);
            if !self.constraints.permits(&test_set) {
                evicted.insert(id); // never resample it
                continue;
            }

            let gain = cost.evaluate(&test_set) - self.curr_val;
            if best.is_none_or(|(bid, b)| gain > b || (gain == b && id < bid)) {
                best = Some((id, gain));
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
}

/// `min(n, (n/k)·ln(1/ε))`, floored at one so a round always samples
/// something.
fn sample_size(n: usize, budget: usize, epsilon: f64) -> usize {
    if budget == 0 {
        return 1;
    }
    let raw = (n as f64 / budget as f64) * (1.0 / epsilon).ln();
    (raw as usize).clamp(1, n)
}
