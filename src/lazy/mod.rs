//! Lazy greedy.
//!
//! Implements the same selection rule as vanilla greedy but exploits
//! diminishing marginal returns to skip most re-evaluations: cached marginal
//! values live in a max-priority queue, and only the queue top is re-scored
//! against the current solution. Because submodularity guarantees marginals
//! never grow as the solution does, a re-scored top that stays on top is the
//! true best and can be committed without touching the rest of the queue.
//!
//! # References
//!
//! - Minoux, M. (1978). "Accelerated greedy algorithms for maximizing
//!   submodular set functions", *Optimization Techniques*, 234-243.

mod optimizer;

pub use optimizer::LazyGreedy;
