//! Neural network building blocks on top of tch.

mod common;

pub mod batch_norm;
pub use batch_norm::*;

pub mod linear_bn;
pub use linear_bn::*;

pub mod conv_bn_2d;
pub use conv_bn_2d::*;

pub mod deconv_bn_2d;
pub use deconv_bn_2d::*;

pub mod bce_with_logits_loss;
pub use bce_with_logits_loss::*;
