//! Fold partitioning and cross-validated classifier evaluation.

pub mod cross_validation;
pub mod split;
pub mod summary;

pub use cross_validation::*;
pub use split::*;
pub use summary::*;
