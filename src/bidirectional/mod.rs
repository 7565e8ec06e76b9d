//! Bidirectional (double) greedy.
//!
//! The only optimizer here that does not require monotonicity — and the only
//! one that is unconstrained. Two sets evolve toward each other: `top`
//! starts as the full ground set and only shrinks, `bottom` starts empty and
//! only grows. Each element is settled exactly once, on whichever side gains
//! more (deterministic) or by a weighted coin over the clamped gains
//! (randomized). The answer is the better of the two sides.
//!
//! # References
//!
//! - Buchbinder, N., Feldman, M., Naor, J. & Schwartz, R. (2015). "A tight
//!   linear time (1/2)-approximation for unconstrained submodular
//!   maximization", *SIAM Journal on Computing* 44(5), 1384-1402.

mod optimizer;

pub use optimizer::BidirectionalGreedy;
