use crate::common::*;
use tch_modules::BatchNormInit;

/// The model variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Fully connected generator and discriminator.
    Gan,
    /// Convolutional generator and discriminator.
    Dcgan,
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gan => "gan",
            Self::Dcgan => "dcgan",
        }
    }
}

/// The model hyperparameters shared by all variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// The length of the latent noise vector.
    #[serde(default = "default_latent_dim")]
    pub latent_dim: NonZeroUsize,
    #[serde(default)]
    pub gan: GanConfig,
    #[serde(default)]
    pub dcgan: DcganConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            latent_dim: default_latent_dim(),
            gan: Default::default(),
            dcgan: Default::default(),
        }
    }
}

/// Fully connected variant options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GanConfig {
    #[serde(default = "default_generator_hidden")]
    pub generator_hidden: Vec<NonZeroUsize>,
    #[serde(default = "default_discriminator_hidden")]
    pub discriminator_hidden: Vec<NonZeroUsize>,
    #[serde(default = "default_gan_activation")]
    pub activation: Activation,
    /// Batch norm in generator hidden layers. Set to `null` to disable.
    #[serde(default = "default_batch_norm")]
    pub batch_norm: Option<BatchNormInit>,
}

impl Default for GanConfig {
    fn default() -> Self {
        Self {
            generator_hidden: default_generator_hidden(),
            discriminator_hidden: default_discriminator_hidden(),
            activation: default_gan_activation(),
            batch_norm: default_batch_norm(),
        }
    }
}

/// Convolutional variant options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcganConfig {
    /// Channels of the last generator hidden layer.
    #[serde(default = "default_base_channels")]
    pub generator_channels: NonZeroUsize,
    /// Channels of the first discriminator layer.
    #[serde(default = "default_base_channels")]
    pub discriminator_channels: NonZeroUsize,
    /// The upper bound of channels in any layer.
    #[serde(default = "default_max_channels")]
    pub max_channels: NonZeroUsize,
    #[serde(default = "default_batch_norm")]
    pub batch_norm: Option<BatchNormInit>,
}

impl Default for DcganConfig {
    fn default() -> Self {
        Self {
            generator_channels: default_base_channels(),
            discriminator_channels: default_base_channels(),
            max_channels: default_max_channels(),
            batch_norm: default_batch_norm(),
        }
    }
}

fn default_latent_dim() -> NonZeroUsize {
    NonZeroUsize::new(100).unwrap()
}

fn default_generator_hidden() -> Vec<NonZeroUsize> {
    [256, 512, 1024]
        .into_iter()
        .map(|size| NonZeroUsize::new(size).unwrap())
        .collect()
}

fn default_discriminator_hidden() -> Vec<NonZeroUsize> {
    [512, 256]
        .into_iter()
        .map(|size| NonZeroUsize::new(size).unwrap())
        .collect()
}

fn default_gan_activation() -> Activation {
    Activation::LRelu
}

fn default_batch_norm() -> Option<BatchNormInit> {
    Some(BatchNormInit::default())
}

fn default_base_channels() -> NonZeroUsize {
    NonZeroUsize::new(64).unwrap()
}

fn default_max_channels() -> NonZeroUsize {
    NonZeroUsize::new(512).unwrap()
}

/// Compute the number of doublings from 4x4 to `image_size`.
pub fn num_doublings(image_size: usize) -> Result<usize> {
    ensure!(
        image_size >= 8 && image_size.is_power_of_two(),
        "image size must be a power of two and at least 8, but get {}",
        image_size
    );
    Ok((image_size / 4).trailing_zeros() as usize)
}
