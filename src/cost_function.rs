//! Objective oracles over element sets.
//!
//! A [`CostFunction`] evaluates a subset of the ground set to a scalar. The
//! greedy algorithms only ever observe objectives through marginal gains,
//! so the trait ships default helpers for `F(S ∪ {e}) − F(S)` with and
//! without a precomputed `F(S)`.
//!
//! Three reference objectives are provided:
//!
//! - [`Modular`]: additive weights — greedy is exactly optimal under a
//!   cardinality constraint.
//! - [`SquareRootModular`]: concave transform, strictly submodular — greedy
//!   carries the classic `(1 − 1/e)` guarantee.
//! - [`CenteredSqrtModular`]: non-monotone, the exercise objective for
//!   BidirectionalGreedy.

use std::collections::HashMap;

use crate::element::{ElementId, ElementSet};

/// An objective oracle over sets and singletons of elements.
///
/// Evaluation must be pure with respect to the optimization run: any internal
/// state (cached weights, biases) is fixed at construction. `evaluate` must
/// be well-defined on the empty set.
///
/// `evaluate_one` is a singleton shortcut. For additive objectives it equals
/// `evaluate({el})`; implementers with different singleton semantics must
/// document them.
pub trait CostFunction: Send + Sync {
    /// Value of a subset.
    fn evaluate(&self, set: &ElementSet) -> f64;

    /// Value contributed by a singleton.
    fn evaluate_one(&self, el: ElementId) -> f64;

    /// Marginal gain `F(context ∪ {el}) − F(context)`.
    fn marginal_gain(&self, el: ElementId, context: &ElementSet) -> f64 {
        self.marginal_gain_from(el, context, self.evaluate(context))
    }

    /// Marginal gain with a precomputed `F(context)`, avoiding one
    /// redundant oracle call per candidate.
    fn marginal_gain_from(&self, el: ElementId, context: &ElementSet, context_value: f64) -> f64 {
        if context.contains(&el) {
            return 0.0;
        }
        let mut test = context.clone();
        test.insert(el);
        self.evaluate(&test) - context_value
    }
}

/// Weight table for [`Modular`] and everything built on it.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum Weights {
    /// Every element weighs the same; `evaluate` degenerates to `w * |S|`.
    Uniform(f64),
    /// Per-element weights keyed by id. Unknown ids weigh 0.
    PerElement(HashMap<ElementId, f64>),
}

/// Additive (linear) set function: `F(S) = Σ_{e ∈ S} w(e)`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modular {
    weights: Weights,
}

impl Modular {
    /// Per-element weights; ids absent from the map weigh 0.
    pub fn new(weights: HashMap<ElementId, f64>) -> Self {
        Self {
            weights: Weights::PerElement(weights),
        }
    }

    /// A single global weight for every element.
    pub fn uniform(weight: f64) -> Self {
        Self {
            weights: Weights::Uniform(weight),
        }
    }

    /// Unit weights, so that `evaluate(S) = |S|`.
    pub fn unit() -> Self {
        Self::uniform(1.0)
    }

    pub fn weight(&self, el: ElementId) -> f64 {
        match &self.weights {
            Weights::Uniform(w) => *w,
            Weights::PerElement(map) => map.get(&el).copied().unwrap_or(0.0),
        }
    }
}

impl Default for Modular {
    fn default() -> Self {
        Self::unit()
    }
}

impl CostFunction for Modular {
    fn evaluate(&self, set: &ElementSet) -> f64 {
        match &self.weights {
            Weights::Uniform(w) => w * set.len() as f64,
            Weights::PerElement(map) => set
                .iter()
                .map(|id| map.get(id).copied().unwrap_or(0.0))
                .sum(),
        }
    }

    fn evaluate_one(&self, el: ElementId) -> f64 {
        self.weight(el)
    }
}

/// Square-root of a modular function: `F(S) = sqrt(Σ w(e))`.
///
/// Strictly submodular for positive weights; monotone.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SquareRootModular {
    modular: Modular,
}

impl SquareRootModular {
    pub fn new(modular: Modular) -> Self {
        Self { modular }
    }
}

impl CostFunction for SquareRootModular {
    fn evaluate(&self, set: &ElementSet) -> f64 {
        self.modular.evaluate(set).sqrt()
    }

    fn evaluate_one(&self, el: ElementId) -> f64 {
        self.modular.evaluate_one(el).sqrt()
    }
}

/// Non-monotone objective `F(S) = high − sqrt(|Σ w(e) − bias|)`.
///
/// Peaks where the modular part hits `bias` and falls off on both sides;
/// used to exercise the non-monotone (bidirectional) optimizer.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CenteredSqrtModular {
    modular: Modular,
    bias: f64,
    high: f64,
}

impl CenteredSqrtModular {
    pub fn new(modular: Modular, bias: f64, high: f64) -> Self {
        Self { modular, bias, high }
    }

    /// Unit-weight variant centered at `bias`.
    pub fn centered(bias: f64, high: f64) -> Self {
        Self::new(Modular::unit(), bias, high)
    }
}

impl CostFunction for CenteredSqrtModular {
    fn evaluate(&self, set: &ElementSet) -> f64 {
        self.high - (self.modular.evaluate(set) - self.bias).abs().sqrt()
    }

    fn evaluate_one(&self, el: ElementId) -> f64 {
        self.high - (self.modular.evaluate_one(el) - self.bias).abs().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[ElementId]) -> ElementSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_modular_uniform_degenerates_to_count() {
        let f = Modular::uniform(2.5);
        assert!((f.evaluate(&set(&[1, 2, 3])) - 7.5).abs() < 1e-12);
        assert!((f.evaluate_one(7) - 2.5).abs() < 1e-12);
        assert_eq!(f.evaluate(&set(&[])), 0.0);
    }

    #[test]
    fn test_modular_per_element_weights() {
        let weights: HashMap<ElementId, f64> = [(1, 1.0), (2, 4.0), (3, 9.0)].into();
        let f = Modular::new(weights);
        assert!((f.evaluate(&set(&[1, 3])) - 10.0).abs() < 1e-12);
        assert!((f.evaluate_one(2) - 4.0).abs() < 1e-12);
        // unknown id contributes nothing
        assert_eq!(f.evaluate_one(99), 0.0);
    }

    #[test]
    fn test_marginal_gain_matches_difference() {
        let weights: HashMap<ElementId, f64> = [(1, 1.0), (2, 4.0)].into();
        let f = Modular::new(weights);
        let ctx = set(&[1]);
        assert!((f.marginal_gain(2, &ctx) - 4.0).abs() < 1e-12);
        assert!((f.marginal_gain_from(2, &ctx, 1.0) - 4.0).abs() < 1e-12);
        // an element already in context gains nothing
        assert_eq!(f.marginal_gain(1, &ctx), 0.0);
    }

    #[test]
    fn test_sqrt_modular_diminishing_returns() {
        let f = SquareRootModular::new(Modular::unit());
        let empty = set(&[]);
        let one = set(&[1]);
        let first = f.marginal_gain(1, &empty);
        let second = f.marginal_gain(2, &one);
        assert!(first > second, "gains must shrink: {first} vs {second}");
        assert_eq!(f.evaluate(&empty), 0.0);
    }

    #[test]
    fn test_centered_sqrt_is_non_monotone() {
        // unit weights, bias 2: adding past two elements decreases value
        let f = CenteredSqrtModular::centered(2.0, 10.0);
        let peak = f.evaluate(&set(&[1, 2]));
        let over = f.evaluate(&set(&[1, 2, 3]));
        let under = f.evaluate(&set(&[1]));
        assert!(peak > over);
        assert!(peak > under);
        assert!((peak - 10.0).abs() < 1e-12);
    }
}
