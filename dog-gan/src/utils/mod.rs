//! Image utilities.

mod grid;
pub use grid::*;
