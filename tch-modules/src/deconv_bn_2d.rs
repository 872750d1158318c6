use crate::{batch_norm::BatchNormInit, common::*};

#[derive(Debug, Clone)]
pub struct DeconvBn2DInit {
    pub in_c: usize,
    pub out_c: usize,
    pub k: usize,
    pub s: usize,
    pub p: usize,
    pub op: usize,
    pub d: usize,
    pub g: usize,
    pub bias: bool,
    pub activation: Activation,
    pub batch_norm: Option<BatchNormInit>,
}

impl DeconvBn2DInit {
    pub fn new(in_c: usize, out_c: usize, k: usize) -> Self {
        Self {
            in_c,
            out_c,
            k,
            s: 1,
            p: k / 2,
            op: 0,
            d: 1,
            g: 1,
            bias: true,
            activation: Activation::Relu,
            batch_norm: Some(Default::default()),
        }
    }

    /// A transposed convolution that doubles the spatial size.
    pub fn upsample(in_c: usize, out_c: usize) -> Self {
        Self {
            s: 2,
            p: 1,
            bias: false,
            ..Self::new(in_c, out_c, 4)
        }
    }

    pub fn build<'p, P>(self, path: P) -> DeconvBn2D
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
            op,
            d,
            g,
            bias,
            activation,
            batch_norm,
        } = self;

        let deconv = nn::conv_transpose2d(
            path / "deconv",
            in_c as i64,
            out_c as i64,
            k as i64,
            nn::ConvTransposeConfig {
                stride: s as i64,
                padding: p as i64,
                output_padding: op as i64,
                dilation: d as i64,
                groups: g as i64,
                bias,
                ..Default::default()
            },
        );
        let bn = batch_norm.map(|init| init.build_2d(path / "bn", out_c as i64));

        DeconvBn2D {
            deconv,
            bn,
            activation,
        }
    }
}

/// 2D transposed convolution followed by optional batch norm and an activation.
#[derive(Debug)]
pub struct DeconvBn2D {
    deconv: nn::ConvTranspose2D,
    bn: Option<nn::BatchNorm>,
    activation: Activation,
}

impl nn::ModuleT for DeconvBn2D {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        let Self {
            ref deconv,
            ref bn,
            activation,
        } = *self;

        let xs = xs.apply(deconv);
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
    fn upsample_doubles_size() {
        let vs = nn::VarStore::new(Device::Cpu);
        let root = vs.root();

        let deconv = DeconvBn2DInit::upsample(8, 3).build(&root / "deconv");
        let xs = Tensor::randn(&[2, 8, 4, 4], (Kind::Float, Device::Cpu));
        let ys = xs.apply_t(&deconv, true);
        assert_eq!(ys.size(), vec![2, 3, 8, 8]);
    }
}
