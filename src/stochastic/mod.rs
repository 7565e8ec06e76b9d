//! Stochastic greedy.
//!
//! Randomized greedy for a single cardinality constraint: each round scores
//! only a uniform sample of the remaining candidates instead of the whole
//! ground set, cutting oracle calls from `O(n·k)` to `O(n·log(1/ε))` at the
//! price of an `(1 − 1/e − ε)` expected guarantee.
//!
//! # References
//!
//! - Mirzasoleiman, B. et al. (2015). "Lazier than lazy greedy",
//!   *AAAI Conference on Artificial Intelligence*.

mod optimizer;

pub use optimizer::StochasticGreedy;
