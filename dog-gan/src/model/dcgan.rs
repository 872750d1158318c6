use super::num_doublings;
use crate::common::*;
use tch_modules::{
    BatchNormInit, ConvBn2D, ConvBn2DInit, DeconvBn2D, DeconvBn2DInit, LinearBn, LinearBnInit,
};

/// The spatial size of the first generator and the last discriminator feature map.
const BASE_SIZE: i64 = 4;

#[derive(Debug, Clone)]
pub struct ConvGeneratorInit {
    pub latent_dim: usize,
    pub image_size: usize,
    /// Channels of the last hidden layer. Earlier layers double it up to `max_channels`.
    pub base_channels: usize,
    pub max_channels: usize,
    pub batch_norm: Option<BatchNormInit>,
}

impl ConvGeneratorInit {
    pub fn build<'p, P>(self, path: P) -> Result<ConvGenerator>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            latent_dim,
            image_size,
            base_channels,
            max_channels,
            batch_norm,
        } = self;
        ensure!(latent_dim > 0, "latent_dim must be positive");
        ensure!(
            base_channels > 0 && max_channels >= base_channels,
            "invalid channel settings: base_channels = {}, max_channels = {}",
            base_channels,
            max_channels
        );
        let num_up = num_doublings(image_size)?;

        // channels of feature maps from 4x4 up to half of the image size
        let channels: Vec<usize> = (0..num_up)
            .map(|index| (base_channels << (num_up - 1 - index)).min(max_channels))
            .collect();
        let init_c = channels[0];

        let project = LinearBnInit {
            activation: Activation::Relu,
            batch_norm,
            bias: batch_norm.is_none(),
            ..LinearBnInit::new(latent_dim, init_c * (BASE_SIZE * BASE_SIZE) as usize)
        }
        .build(path / "project");

        let blocks: Vec<_> = channels
            .iter()
            .tuple_windows()
            .enumerate()
            .map(|(index, (&in_c, &out_c))| {
                DeconvBn2DInit {
                    activation: Activation::Relu,
                    batch_norm,
                    ..DeconvBn2DInit::upsample(in_c, out_c)
                }
                .build(path / format!("block_{}", index))
            })
            .collect();

        let output = DeconvBn2DInit {
            activation: Activation::Logistic,
            batch_norm: None,
            bias: true,
            ..DeconvBn2DInit::upsample(channels[num_up - 1], 3)
        }
        .build(path / "output");

        Ok(ConvGenerator {
            project,
            blocks,
            output,
            init_c: init_c as i64,
        })
    }
}

/// The convolutional generator.
///
/// It maps `[batch, latent_dim]` noise to `[batch, 3, size, size]` images in `[0, 1]`.
#[derive(Debug)]
pub struct ConvGenerator {
    project: LinearBn,
    blocks: Vec<DeconvBn2D>,
    output: DeconvBn2D,
    init_c: i64,
}

impl nn::ModuleT for ConvGenerator {
    fn forward_t(&self, noise: &Tensor, train: bool) -> Tensor {
        let Self {
            ref project,
            ref blocks,
            ref output,
            init_c,
        } = *self;

        let xs = noise
            .apply_t(project, train)
            .view([-1, init_c, BASE_SIZE, BASE_SIZE]);
        let xs = blocks
            .iter()
            .fold(xs, |xs, block| xs.apply_t(block, train));
        xs.apply_t(output, train)
    }
}

#[derive(Debug, Clone)]
pub struct ConvDiscriminatorInit {
    pub image_size: usize,
    /// Channels of the first layer. Later layers double it up to `max_channels`.
    pub base_channels: usize,
    pub max_channels: usize,
    pub batch_norm: Option<BatchNormInit>,
}

impl ConvDiscriminatorInit {
    pub fn build<'p, P>(self, path: P) -> Result<ConvDiscriminator>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            image_size,
            base_channels,
            max_channels,
            batch_norm,
        } = self;
        ensure!(
            base_channels > 0 && max_channels >= base_channels,
            "invalid channel settings: base_channels = {}, max_channels = {}",
            base_channels,
            max_channels
        );
        let num_down = num_doublings(image_size)?;

        let channels: Vec<usize> = (0..num_down)
            .map(|index| (base_channels << index).min(max_channels))
            .collect();

        // the first layer has no batch norm
        let first = ConvBn2DInit {
            activation: Activation::LRelu,
            batch_norm: None,
            bias: true,
            ..ConvBn2DInit::downsample(3, channels[0])
        }
        .build(path / "block_0");

        let blocks: Vec<_> = iter::once(first)
            .chain(
                channels
                    .iter()
                    .tuple_windows()
                    .enumerate()
                    .map(|(index, (&in_c, &out_c))| {
                        ConvBn2DInit {
                            activation: Activation::LRelu,
                            batch_norm,
                            bias: batch_norm.is_none(),
                            ..ConvBn2DInit::downsample(in_c, out_c)
                        }
                        .build(path / format!("block_{}", index + 1))
                    }),
            )
            .collect();

        let last_c = channels[num_down - 1] as i64;
        let output = nn::linear(
            path / "output",
            last_c * BASE_SIZE * BASE_SIZE,
            1,
            Default::default(),
        );

        Ok(ConvDiscriminator { blocks, output })
    }
}

/// The convolutional discriminator.
///
/// It maps `[batch, 3, size, size]` images to `[batch, 1]` logits.
#[derive(Debug)]
pub struct ConvDiscriminator {
    blocks: Vec<ConvBn2D>,
    output: nn::Linear,
}

impl nn::ModuleT for ConvDiscriminator {
    fn forward_t(&self, images: &Tensor, train: bool) -> Tensor {
        let xs = self
            .blocks
            .iter()
            .fold(images.shallow_clone(), |xs, block| xs.apply_t(block, train));
        xs.flatten(1, -1).apply(&self.output)
    }
}
