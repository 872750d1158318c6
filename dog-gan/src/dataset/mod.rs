//! Annotation index and in-memory image dataset.

mod image_dataset;
mod index;
mod record;
mod utils;

pub use image_dataset::*;
pub use index::*;
pub use record::*;
pub use utils::*;
