//! Lazier-than-lazy greedy execution loop.

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::constraint::{ConstraintRef, ConstraintSet};
use crate::cost_function::CostFunction;
use crate::element::{ElementId, ElementSet, GroundSet};
use crate::error::GreedyError;
use crate::marginals::{MarginalQueue, Scored};

const DEFAULT_EPSILON: f64 = 0.05;

/// Sampling greedy with persistent lazy marginals, valid only under a
/// unique cardinality constraint.
///
/// Fresh entries start at `f64::INFINITY` so every element is evaluated the
/// first time it surfaces; afterwards the persisted value is an overestimate
/// of the true marginal, which keeps the lazy loop's early exit sound even
/// when seeded with out-of-date scores.
#[derive(Default)]
pub struct LazierThanLazyGreedy {
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

impl LazierThanLazyGreedy {
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

    /// Resets run state for reuse; the persisted marginal map is rebuilt on
    /// every run.
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

        // persisted marginal overestimates; ids leave the map permanently
        // once committed or found infeasible
        let mut marginals: HashMap<ElementId, f64> = ground
            .ids()
            .filter(|id| !self.curr_set.contains(id))
            .map(|id| (id, f64::INFINITY))
            .collect();
        let mut pool: Vec<ElementId> = marginals.keys().copied().collect();
        pool.sort_unstable(); // deterministic sampling order for a fixed seed
        let mut round = 0usize;

        while !self.saturated && self.max_rounds.is_none_or(|cap| round < cap) {
            round += 1;
            pool.retain(|id| marginals.contains_key(id));
            if pool.is_empty() {
                self.saturated = true;
                break;
            }

            let s = target.min(pool.len());
            let sample: Vec<ElementId> = rand::seq::index::sample(&mut rng, pool.len(), s)
                .into_iter()
                .map(|idx| pool[idx])
                .collect();

            let mut sample_queue: MarginalQueue = sample
                .iter()
                .map(|id| Scored::new(*id, marginals.get(id).copied().unwrap_or(f64::INFINITY)))
                .collect();

            let sampled_everything = s == pool.len();
            self.lazier_step(
                cost.as_ref(),
                &mut sample_queue,
                &mut marginals,
                sampled_everything,
            );

            // persist freshly observed values for future rounds; a
            // non-positive marginal can never recover under a monotone
            // submodular objective, so those ids leave the map for good
            for scored in sample_queue.drain() {
                if !marginals.contains_key(&scored.id) {
                    continue;
                }
                if scored.score <= 0.0 {
                    marginals.remove(&scored.id);
                } else {
                    marginals.insert(scored.id, scored.score);
                }
            }

            debug!(
                round,
                sampled = s,
                remaining = marginals.len(),
                size = self.curr_set.len(),
                value = self.curr_val,
                "lazier-than-lazy greedy round"
            );
        }
        Ok(())
    }

    /// Lazy re-evaluation restricted to the sampled queue.
    ///
    /// Infeasible ids are purged from the persisted map permanently; a
    /// committed id leaves the map as well so it can never be resampled.
    fn lazier_step(
        &mut self,
        cost: &dyn CostFunction,
        sample_queue: &mut MarginalQueue,
        marginals: &mut HashMap<ElementId, f64>,
        sampled_everything: bool,
    ) {
        while let Some(top) = sample_queue.peek().copied() {
            let mut test_set = self.curr_set.clone();
            test_set.insert(top.id);
            if !self.constraints.permits(&test_set) {
                sample_queue.pop();
                marginals.remove(&top.id);
                continue;
            }

            let fresh = cost.evaluate(&test_set) - self.curr_val;
            sample_queue.pop();
            sample_queue.push(Scored::new(top.id, fresh));

            if sample_queue.peek().is_some_and(|t| t.id == top.id) {
                break;
            }
        }

        match sample_queue.peek().copied() {
            Some(best) if best.score > 0.0 => {
                sample_queue.pop();
                self.curr_set.insert(best.id);
                self.curr_val += best.score;
                marginals.remove(&best.id);
                self.saturated = self.constraints.any_saturated(&self.curr_set);
            }
            _ => {
                // an unlucky sample is not the feasible limit; only stop when
                // nothing is left to sample or even a full sample has no
                // positive candidate
                if marginals.is_empty() || sampled_everything {
                    self.saturated = true;
                }
            }
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
