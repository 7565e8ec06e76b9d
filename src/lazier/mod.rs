//! Lazier-than-lazy greedy.
//!
//! Combines stochastic sampling with lazy re-evaluation: marginal values
//! persist across rounds in a map, each round turns a random sample into a
//! local priority queue seeded from those (possibly stale) values, and the
//! lazy loop runs on the sample only. Staleness is sound because persisted
//! values are always overestimates — submodularity only ever shrinks
//! marginals as the solution grows.
//!
//! # References
//!
//! - Mirzasoleiman, B. et al. (2015). "Lazier than lazy greedy",
//!   *AAAI Conference on Artificial Intelligence*.

mod optimizer;

pub use optimizer::LazierThanLazyGreedy;
