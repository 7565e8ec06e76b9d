//! Vanilla greedy.
//!
//! The brute-force baseline: every round scans the whole ground set, commits
//! the feasible element with the strictly largest marginal gain, and stops
//! when no positive gain remains or the constraint set saturates. For
//! modular objectives under a cardinality constraint this is exactly
//! optimal; for monotone submodular objectives it carries the classic
//! `(1 − 1/e)` guarantee.
//!
//! # References
//!
//! - Nemhauser, G., Wolsey, L. & Fisher, M. (1978). "An analysis of
//!   approximations for maximizing submodular set functions—I",
//!   *Mathematical Programming* 14, 265-294.

mod optimizer;

pub use optimizer::VanillaGreedy;
