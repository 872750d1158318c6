use crate::{batch_norm::BatchNormInit, common::*};

#[derive(Debug, Clone)]
pub struct ConvBn2DInit {
    pub in_c: usize,
    pub out_c: usize,
    pub k: usize,
    pub s: usize,
    pub p: usize,
    pub d: usize,
    pub g: usize,
    pub bias: bool,
    pub activation: Activation,
    pub batch_norm: Option<BatchNormInit>,
}

impl ConvBn2DInit {
    pub fn new(in_c: usize, out_c: usize, k: usize) -> Self {
        Self {
            in_c,
            out_c,
            k,
            s: 1,
            p: k / 2,
            d: 1,
            g: 1,
            bias: true,
            activation: Activation::LRelu,
            batch_norm: Some(Default::default()),
        }
    }

    /// A convolution that halves the spatial size, as used in DCGAN discriminators.
    pub fn downsample(in_c: usize, out_c: usize) -> Self {
        Self {
            s: 2,
            p: 1,
            bias: false,
            ..Self::new(in_c, out_c, 4)
        }
    }

    pub fn build<'p, P>(self, path: P) -> ConvBn2D
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();

        let Self {
            in_c,
            out_c,
            k,
            s,
            p,
            d,
            g,
            bias,
            activation,
            batch_norm,
        } = self;

        let conv = nn::conv2d(
            path / "conv",
            in_c as i64,
            out_c as i64,
            k as i64,
            nn::ConvConfig {
                stride: s as i64,
                padding: p as i64,
                dilation: d as i64,
                groups: g as i64,
                bias,
                ..Default::default()
            },
        );
        let bn = batch_norm.map(|init| init.build_2d(path / "bn", out_c as i64));

        ConvBn2D {
            conv,
            bn,
            activation,
        }
    }
}

/// 2D convolution followed by optional batch norm and an activation.
#[derive(Debug)]
pub struct ConvBn2D {
    conv: nn::Conv2D,
    bn: Option<nn::BatchNorm>,
    activation: Activation,
}

impl nn::ModuleT for ConvBn2D {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        let Self {
            ref conv,
            ref bn,
            activation,
        } = *self;

        let xs = xs.apply(conv);
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
    fn downsample_halves_size() {
        let vs = nn::VarStore::new(Device::Cpu);
        let root = vs.root();

        let conv = ConvBn2DInit::downsample(3, 8).build(&root / "conv");
        let xs = Tensor::rand(&[2, 3, 16, 16], (Kind::Float, Device::Cpu));
        let ys = xs.apply_t(&conv, true);
        assert_eq!(ys.size(), vec![2, 8, 8, 8]);
    }
}
