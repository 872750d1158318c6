use crate::common::*;
use tch_modules::{BatchNormInit, LinearBn, LinearBnInit};

#[derive(Debug, Clone)]
pub struct MlpGeneratorInit {
    pub latent_dim: usize,
    pub image_size: usize,
    pub hidden: Vec<usize>,
    pub activation: Activation,
    pub batch_norm: Option<BatchNormInit>,
}

impl MlpGeneratorInit {
    pub fn build<'p, P>(self, path: P) -> Result<MlpGenerator>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            latent_dim,
            image_size,
            hidden,
            activation,
            batch_norm,
        } = self;
        ensure!(latent_dim > 0, "latent_dim must be positive");
        ensure!(image_size > 0, "image_size must be positive");

        let mut in_c = latent_dim;
        let blocks: Vec<_> = hidden
            .into_iter()
            .enumerate()
            .map(|(index, out_c)| {
                let block = LinearBnInit {
                    activation,
                    batch_norm,
                    ..LinearBnInit::new(in_c, out_c)
                }
                .build(path / format!("block_{}", index));
                in_c = out_c;
                block
            })
            .collect();

        let out_c = 3 * image_size * image_size;
        let output = nn::linear(
            path / "output",
            in_c as i64,
            out_c as i64,
            Default::default(),
        );

        Ok(MlpGenerator {
            blocks,
            output,
            image_size: image_size as i64,
        })
    }
}

/// The fully connected generator.
///
/// It maps `[batch, latent_dim]` noise to `[batch, 3, size, size]` images in `[0, 1]`.
#[derive(Debug)]
pub struct MlpGenerator {
    blocks: Vec<LinearBn>,
    output: nn::Linear,
    image_size: i64,
}

impl nn::ModuleT for MlpGenerator {
    fn forward_t(&self, noise: &Tensor, train: bool) -> Tensor {
        let Self {
            ref blocks,
            ref output,
            image_size,
        } = *self;

        let xs = blocks
            .iter()
            .fold(noise.shallow_clone(), |xs, block| xs.apply_t(block, train));
        xs.apply(output)
            .activation(Activation::Logistic)
            .view([-1, 3, image_size, image_size])
    }
}

#[derive(Debug, Clone)]
pub struct MlpDiscriminatorInit {
    pub image_size: usize,
    pub hidden: Vec<usize>,
    pub activation: Activation,
}

impl MlpDiscriminatorInit {
    pub fn build<'p, P>(self, path: P) -> Result<MlpDiscriminator>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            image_size,
            hidden,
            activation,
        } = self;
        ensure!(image_size > 0, "image_size must be positive");

        let mut in_c = 3 * image_size * image_size;
        let blocks: Vec<_> = hidden
            .into_iter()
            .enumerate()
            .map(|(index, out_c)| {
                let block = LinearBnInit {
                    activation,
                    batch_norm: None,
                    ..LinearBnInit::new(in_c, out_c)
                }
                .build(path / format!("block_{}", index));
                in_c = out_c;
                block
            })
            .collect();
        let output = nn::linear(path / "output", in_c as i64, 1, Default::default());

        Ok(MlpDiscriminator { blocks, output })
    }
}

/// The fully connected discriminator.
///
/// It maps `[batch, 3, size, size]` images to `[batch, 1]` logits.
#[derive(Debug)]
pub struct MlpDiscriminator {
    blocks: Vec<LinearBn>,
    output: nn::Linear,
}

impl nn::ModuleT for MlpDiscriminator {
    fn forward_t(&self, images: &Tensor, train: bool) -> Tensor {
        let xs = images.flatten(1, -1);
        let xs = self
            .blocks
            .iter()
            .fold(xs, |xs, block| xs.apply_t(block, train));
        xs.apply(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mlp_gan_shapes() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let root = vs.root();

        let generator = MlpGeneratorInit {
            latent_dim: 8,
            image_size: 8,
            hidden: vec![16, 32],
            activation: Activation::LRelu,
            batch_norm: Some(Default::default()),
        }
        .build(&root / "generator")?;
        let discriminator = MlpDiscriminatorInit {
            image_size: 8,
            hidden: vec![32, 16],
            activation: Activation::LRelu,
        }
        .build(&root / "discriminator")?;

        let noise = Tensor::randn(&[4, 8], (Kind::Float, Device::Cpu));
        let images = noise.apply_t(&generator, true);
        assert_eq!(images.size(), vec![4, 3, 8, 8]);
        assert!(bool::from(images.ge(0.0).logical_and(&images.le(1.0)).all()));

        let logits = images.apply_t(&discriminator, true);
        assert_eq!(logits.size(), vec![4, 1]);

        Ok(())
    }
}
