//! Generator and discriminator networks.

mod config;
mod dcgan;
mod gan;
mod model;

pub use config::*;
pub use dcgan::*;
pub use gan::*;
pub use model::*;
