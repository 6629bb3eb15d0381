//! Weighting
//!
//! - `ahp`: subjective dimension weights from a pairwise comparison matrix
//! - `entropy`: objective indicator weights within each dimension
//! - `composition`: final indicator weights (AHP × entropy)

pub mod ahp;
pub mod composition;
pub mod entropy;

pub use ahp::{compute_weights, random_index, AhpInput, AhpWeights, PairwiseMatrix, DEFAULT_CONSISTENCY_THRESHOLD};
pub use composition::FinalWeights;
pub use entropy::{entropy_weights, EntropyWeights};
