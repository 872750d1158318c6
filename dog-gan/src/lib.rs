//! Dataset preprocessing and model definitions for training dog image GANs.

mod common;
pub mod annotation;
pub mod dataset;
pub mod model;
pub mod processor;
pub mod utils;
