//! Image preprocessing.

mod preprocessor;

pub use preprocessor::*;
