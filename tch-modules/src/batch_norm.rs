use crate::common::*;

/// Batch normalization options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchNormInit {
    pub momentum: R64,
    pub eps: R64,
}

impl Default for BatchNormInit {
    fn default() -> Self {
        Self {
            momentum: r64(0.1),
            eps: r64(1e-5),
        }
    }
}

impl BatchNormInit {
    fn config(&self) -> nn::BatchNormConfig {
        nn::BatchNormConfig {
            momentum: self.momentum.raw(),
            eps: self.eps.raw(),
            ..Default::default()
        }
    }

    /// Build a batch norm over `[batch, channels]` inputs.
    pub fn build_1d<'p, P>(&self, path: P, out_c: i64) -> nn::BatchNorm
    where
        P: Borrow<nn::Path<'p>>,
    {
        nn::batch_norm1d(path, out_c, self.config())
    }

    /// Build a batch norm over `[batch, channels, height, width]` inputs.
    pub fn build_2d<'p, P>(&self, path: P, out_c: i64) -> nn::BatchNorm
    where
        P: Borrow<nn::Path<'p>>,
    {
        nn::batch_norm2d(path, out_c, self.config())
    }
}
