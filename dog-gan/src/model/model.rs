use super::*;
use crate::common::*;

/// A generator of either variant.
#[derive(Debug)]
pub enum Generator {
    Mlp(MlpGenerator),
    Conv(ConvGenerator),
}

impl nn::ModuleT for Generator {
    fn forward_t(&self, noise: &Tensor, train: bool) -> Tensor {
        match self {
            Self::Mlp(model) => model.forward_t(noise, train),
            Self::Conv(model) => model.forward_t(noise, train),
        }
    }
}

/// A discriminator of either variant.
#[derive(Debug)]
pub enum Discriminator {
    Mlp(MlpDiscriminator),
    Conv(ConvDiscriminator),
}

impl nn::ModuleT for Discriminator {
    fn forward_t(&self, images: &Tensor, train: bool) -> Tensor {
        match self {
            Self::Mlp(model) => model.forward_t(images, train),
            Self::Conv(model) => model.forward_t(images, train),
        }
    }
}

/// A generator and a discriminator, each owning its variables.
pub struct ModelPair {
    pub kind: ModelKind,
    pub latent_dim: usize,
    pub image_size: usize,
    pub generator_vs: nn::VarStore,
    pub discriminator_vs: nn::VarStore,
    pub generator: Generator,
    pub discriminator: Discriminator,
}

impl ModelPair {
    pub fn new(
        kind: ModelKind,
        config: &ModelConfig,
        image_size: usize,
        device: Device,
    ) -> Result<Self> {
        let ModelConfig {
            latent_dim,
            ref gan,
            ref dcgan,
        } = *config;
        let latent_dim = latent_dim.get();

        let generator_vs = nn::VarStore::new(device);
        let discriminator_vs = nn::VarStore::new(device);
        let generator_root = generator_vs.root();
        let discriminator_root = discriminator_vs.root();

        let (generator, discriminator) = match kind {
            ModelKind::Gan => {
                let GanConfig {
                    ref generator_hidden,
                    ref discriminator_hidden,
                    activation,
                    batch_norm,
                } = *gan;

                let generator = MlpGeneratorInit {
                    latent_dim,
                    image_size,
                    hidden: generator_hidden.iter().map(|size| size.get()).collect(),
                    activation,
                    batch_norm,
                }
                .build(&generator_root / "generator")?;
                let discriminator = MlpDiscriminatorInit {
                    image_size,
                    hidden: discriminator_hidden.iter().map(|size| size.get()).collect(),
                    activation,
                }
                .build(&discriminator_root / "discriminator")?;

                (Generator::Mlp(generator), Discriminator::Mlp(discriminator))
            }
            ModelKind::Dcgan => {
                let DcganConfig {
                    generator_channels,
                    discriminator_channels,
                    max_channels,
                    batch_norm,
                } = *dcgan;

                let generator = ConvGeneratorInit {
                    latent_dim,
                    image_size,
                    base_channels: generator_channels.get(),
                    max_channels: max_channels.get(),
                    batch_norm,
                }
                .build(&generator_root / "generator")?;
                let discriminator = ConvDiscriminatorInit {
                    image_size,
                    base_channels: discriminator_channels.get(),
                    max_channels: max_channels.get(),
                    batch_norm,
                }
                .build(&discriminator_root / "discriminator")?;

                (
                    Generator::Conv(generator),
                    Discriminator::Conv(discriminator),
                )
            }
        };

        Ok(Self {
            kind,
            latent_dim,
            image_size,
            generator_vs,
            discriminator_vs,
            generator,
            discriminator,
        })
    }

    pub fn device(&self) -> Device {
        self.generator_vs.device()
    }

    /// Draw standard normal latent vectors.
    pub fn sample_noise(&self, batch_size: usize) -> Tensor {
        Tensor::randn(
            &[batch_size as i64, self.latent_dim as i64],
            (Kind::Float, self.device()),
        )
    }

    pub fn generate(&self, noise: &Tensor, train: bool) -> Tensor {
        noise.apply_t(&self.generator, train)
    }

    pub fn num_parameters(&self) -> (i64, i64) {
        let count = |vs: &nn::VarStore| -> i64 {
            vs.trainable_variables()
                .iter()
                .map(|var| var.numel() as i64)
                .sum()
        };
        (count(&self.generator_vs), count(&self.discriminator_vs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ModelConfig {
        let nz = |size| NonZeroUsize::new(size).unwrap();
        ModelConfig {
            latent_dim: nz(16),
            gan: GanConfig {
                generator_hidden: vec![nz(32)],
                discriminator_hidden: vec![nz(32)],
                ..Default::default()
            },
            dcgan: DcganConfig {
                generator_channels: nz(4),
                discriminator_channels: nz(4),
                max_channels: nz(16),
                ..Default::default()
            },
        }
    }

    #[test]
    fn model_pair_test() -> Result<()> {
        let config = small_config();

        for kind in [ModelKind::Gan, ModelKind::Dcgan] {
            let model = ModelPair::new(kind, &config, 16, Device::Cpu)?;
            let noise = model.sample_noise(3);
            assert_eq!(noise.size(), vec![3, 16]);

            let images = model.generate(&noise, false);
            assert_eq!(images.size(), vec![3, 3, 16, 16]);

            let logits = model.discriminator.forward_t(&images, false);
            assert_eq!(logits.size(), vec![3, 1]);

            // generator and discriminator never share variables
            let (num_gen, num_dis) = model.num_parameters();
            assert!(num_gen > 0 && num_dis > 0);
            assert!(model
                .generator_vs
                .variables()
                .keys()
                .all(|name| name.starts_with("generator")));
            assert!(model
                .discriminator_vs
                .variables()
                .keys()
                .all(|name| name.starts_with("discriminator")));
        }

        Ok(())
    }
}
