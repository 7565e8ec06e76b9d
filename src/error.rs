//! Error taxonomy for optimizer configuration.
//!
//! Everything here is a recoverable configuration error reported to the
//! caller; a failed `run_greedy` leaves the optimizer's solution state
//! untouched. Normal algorithmic termination ("no further feasible element
//! with positive gain") is not an error.

use thiserror::Error;

/// Configuration errors reported by the greedy optimizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GreedyError {
    /// No ground set was configured, or it has no elements.
    #[error("no ground set given")]
    EmptyGroundSet,

    /// No cost function was configured.
    #[error("no cost function given")]
    MissingCostFunction,

    /// Cost-benefit mode needs a knapsack constraint to price elements.
    #[error("cost-benefit mode requires a knapsack constraint")]
    CostBenefitWithoutKnapsack,

    /// The optimizer only accepts cardinality constraints.
    #[error("only cardinality constraints are valid for this optimizer")]
    RequiresCardinality,

    /// Sampling-based optimizers need exactly one cardinality constraint.
    #[error("a single cardinality constraint is required")]
    RequiresUniqueCardinality,

    /// The optimizer does not support constraints at all.
    #[error("this optimizer is unconstrained; attaching constraints is not supported")]
    ConstraintUnsupported,
}
