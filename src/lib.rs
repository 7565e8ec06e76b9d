//! Greedy algorithms for constrained submodular and modular set-function
//! maximization.
//!
//! Given a finite ground set, a set-valued objective, and a feasibility
//! constraint, the optimizers here incrementally build a solution set that
//! approximately — or, for modular objectives under cardinality constraints,
//! exactly — maximizes the objective:
//!
//! - **VanillaGreedy**: brute-force best-marginal selection each round.
//! - **LazyGreedy**: priority-queue accelerated; same picks as vanilla with
//!   far fewer oracle calls, sound by diminishing marginal returns.
//! - **StochasticGreedy**: uniform sampling per round under a single
//!   cardinality constraint; `(1 − 1/e − ε)` in expectation with
//!   `O(n·log(1/ε))` oracle calls.
//! - **LazierThanLazyGreedy**: sampling plus persistent lazy marginals, the
//!   cheapest of the monotone family.
//! - **BidirectionalGreedy**: double greedy for non-monotone objectives,
//!   unconstrained only.
//!
//! # Architecture
//!
//! The shared abstractions are the [`element`] model (identity-bearing
//! elements, an immutable ground set, id-based solution sets), the
//! [`cost_function`] oracle (evaluation plus marginal-gain helpers), and the
//! [`constraint`] oracle (feasibility and saturation, with knapsack and
//! cardinality provided). Optimizers own their run state exclusively; cost
//! functions and constraints are shared read-only collaborators, so one
//! experiment can drive several optimizer instances over the same wiring.
//!
//! Everything is single-threaded and CPU-bound; randomized optimizers take
//! an explicit seed for reproducible runs.

pub mod bidirectional;
pub mod constraint;
pub mod cost_function;
pub mod element;
pub mod error;
pub mod lazier;
pub mod lazy;
mod marginals;
pub mod stochastic;
pub mod vanilla;
