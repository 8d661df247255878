//! Utility functions: least squares and fold construction.

pub mod cross_validation;
pub mod ols;

pub use cross_validation::{train_test_split, walk_forward_folds, Fold, Split};
pub use ols::{ols_fit, ols_residuals, OLSResult};
