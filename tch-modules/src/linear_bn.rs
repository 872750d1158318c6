use crate::{batch_norm::BatchNormInit, common::*};

#[derive(Debug, Clone)]
pub struct LinearBnInit {
    pub in_c: usize,
    pub out_c: usize,
    pub bias: bool,
    pub activation: Activation,
    pub batch_norm: Option<BatchNormInit>,
}

impl LinearBnInit {
    pub fn new(in_c: usize, out_c: usize) -> Self {
        Self {
            in_c,
            out_c,
            bias: true,
            activation: Activation::LRelu,
            batch_norm: Some(Default::default()),
        }
    }

    pub fn build<'p, P>(self, path: P) -> LinearBn
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();

        let Self {
            in_c,
            out_c,
            bias,
            activation,
            batch_norm,
        } = self;

        let linear = nn::linear(
            path / "linear",
            in_c as i64,
            out_c as i64,
            nn::LinearConfig {
                bias,
                ..Default::default()
            },
        );
        let bn = batch_norm.map(|init| init.build_1d(path / "bn", out_c as i64));

        LinearBn {
            linear,
            bn,
            activation,
        }
    }
}

/// Fully connected layer followed by optional batch norm and an activation.
#[derive(Debug)]
pub struct LinearBn {
    linear: nn::Linear,
    bn: Option<nn::BatchNorm>,
    activation: Activation,
}

impl nn::ModuleT for LinearBn {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        let Self {
            ref linear,
            ref bn,
            activation,
        } = *self;

        let xs = xs.apply(linear);
        let xs = match bn {
            Some(bn) => xs.apply_t(bn, train),
            None => xs,
        };
        xs.activation(activation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_bn_shape() {
        let vs = nn::VarStore::new(Device::Cpu);
        let root = vs.root();

        let block = LinearBnInit::new(7, 5).build(&root / "block");
        let xs = Tensor::randn(&[4, 7], (Kind::Float, Device::Cpu));
        let ys = xs.apply_t(&block, true);
        assert_eq!(ys.size(), vec![4, 5]);
    }
}
