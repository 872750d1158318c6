#[cfg(feature = "tch")]
pub use impls::*;
#[cfg(feature = "tch")]
mod impls;

#[cfg(feature = "tch")]
pub use r#trait::*;
#[cfg(feature = "tch")]
mod r#trait;

/// Activation functions used by the generator and discriminator blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Activation {
    Linear,
    Relu,
    /// Leaky ReLU with negative slope 0.2.
    LRelu,
    Logistic,
    Tanh,
}

impl Default for Activation {
    fn default() -> Self {
        Self::Linear
    }
}
