//! Training program configuration format.

use crate::common::*;

pub use dataset::*;
pub use logging::*;
pub use preprocessor::*;
pub use training::*;

/// The main training configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub preprocessor: PreprocessorConfig,
    #[serde(default)]
    pub model: ModelConfig,
    pub training: TrainingConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = std::fs::read_to_string(path)?;
        let config: Self = json5::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check option values before any work starts.
    pub fn validate(&self) -> Result<()> {
        let Self {
            preprocessor: PreprocessorConfig { image_size, .. },
            training:
                TrainingConfig {
                    ref variants,
                    batch_size,
                    label_smoothing,
                    ref generator_optimizer,
                    ref discriminator_optimizer,
                    ..
                },
            logging:
                LoggingConfig {
                    sample_rows,
                    sample_cols,
                    ..
                },
            ..
        } = *self;

        ensure!(!variants.is_empty(), "training.variants must not be empty");
        ensure!(
            variants.iter().all_unique(),
            "training.variants must not contain duplicates"
        );
        ensure!(
            batch_size.get() >= 2,
            "training.batch_size must be at least 2 for batch norm"
        );
        if variants.contains(&ModelKind::Dcgan) {
            num_doublings(image_size.get())
                .context("preprocessor.image_size is not supported by dcgan")?;
        }
        ensure!(
            (0.0..1.0).contains(&label_smoothing.raw()),
            "training.label_smoothing must be in range [0, 1)"
        );
        generator_optimizer
            .validate()
            .context("invalid training.generator_optimizer")?;
        discriminator_optimizer
            .validate()
            .context("invalid training.discriminator_optimizer")?;
        ensure!(
            sample_rows.get() * sample_cols.get() <= 1024,
            "the sample grid is too large"
        );

        Ok(())
    }
}

mod dataset {
    use super::*;

    /// Dataset options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DatasetConfig {
        /// The directory of XML annotation files.
        pub annotation_dir: PathBuf,
        /// The directory of images. It mirrors the layout of `annotation_dir`.
        pub image_dir: PathBuf,
        #[serde(default = "default_image_extension")]
        pub image_extension: String,
        /// Optional list of whitelisted classes.
        pub class_whitelist: Option<HashSet<String>>,
        /// If set, keep at most this number of leading records.
        pub max_records: Option<NonZeroUsize>,
    }

    fn default_image_extension() -> String {
        "jpg".into()
    }
}

mod preprocessor {
    use super::*;

    /// Data preprocessing options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PreprocessorConfig {
        /// The side length of training images.
        pub image_size: NonZeroUsize,
        #[serde(default)]
        pub crop_mode: CropMode,
    }
}

mod training {
    use super::*;

    /// The training options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TrainingConfig {
        /// Model variants to train, in order.
        pub variants: Vec<ModelKind>,
        /// The number of iterations per variant.
        pub max_steps: NonZeroUsize,
        pub batch_size: NonZeroUsize,
        pub generator_optimizer: OptimizerConfig,
        pub discriminator_optimizer: OptimizerConfig,
        /// The real target is `1 - label_smoothing`.
        #[serde(default = "default_label_smoothing")]
        pub label_smoothing: R64,
        /// If set, random number generators are seeded with this value.
        pub seed: Option<u64>,
        /// If set, it saves checkpoint files per this steps.
        pub save_checkpoint_steps: Option<NonZeroUsize>,
        #[serde(with = "tch_serde::serde_device")]
        pub device: Device,
    }

    /// Adam optimizer options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct OptimizerConfig {
        pub lr: R64,
        #[serde(default = "default_beta1")]
        pub beta1: R64,
        #[serde(default = "default_beta2")]
        pub beta2: R64,
        #[serde(default = "default_weight_decay")]
        pub weight_decay: R64,
    }

    impl OptimizerConfig {
        pub fn validate(&self) -> Result<()> {
            let Self {
                lr,
                beta1,
                beta2,
                weight_decay,
            } = *self;
            ensure!(lr.raw() > 0.0, "lr must be positive");
            ensure!(
                (0.0..1.0).contains(&beta1.raw()) && (0.0..1.0).contains(&beta2.raw()),
                "beta1 and beta2 must be in range [0, 1)"
            );
            ensure!(
                weight_decay.raw() >= 0.0,
                "weight_decay must not be negative"
            );
            Ok(())
        }
    }

    fn default_label_smoothing() -> R64 {
        r64(0.0)
    }

    fn default_beta1() -> R64 {
        r64(0.5)
    }

    fn default_beta2() -> R64 {
        r64(0.999)
    }

    fn default_weight_decay() -> R64 {
        r64(0.0)
    }
}

mod logging {
    use super::*;

    /// Data logging options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct LoggingConfig {
        /// The parent directory of run directories.
        pub dir: PathBuf,
        /// Log losses and scores per this steps.
        pub log_interval: NonZeroUsize,
        /// Render a sample grid per this steps.
        pub sample_interval: NonZeroUsize,
        #[serde(default = "default_grid_side")]
        pub sample_rows: NonZeroUsize,
        #[serde(default = "default_grid_side")]
        pub sample_cols: NonZeroUsize,
        /// Also write sample grids to the event file.
        #[serde(default = "default_enable_images")]
        pub enable_images: bool,
    }

    fn default_grid_side() -> NonZeroUsize {
        NonZeroUsize::new(8).unwrap()
    }

    fn default_enable_images() -> bool {
        true
    }
}
