pub use anyhow::{ensure, format_err, Error, Result};
pub use noisy_float::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::borrow::Borrow;
pub use tch::{
    nn::{self, ModuleT as _, OptimizerConfig as _},
    Device, Kind, Reduction, Tensor,
};
pub use tch_act::{Activation, TensorActivationExt as _};

pub type Fallible<T> = Result<T, Error>;
