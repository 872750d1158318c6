//! Common imports from external crates.

pub use anyhow::{bail, ensure, format_err, Context, Error, Result};
pub use bbox::CropMode;
pub use chrono::Local;
pub use dog_gan::{
    dataset::{AnnotationIndex, ImageDataset},
    model::{num_doublings, ModelConfig, ModelKind, ModelPair},
    processor::ImagePreprocessor,
    utils::{concat_horizontal, make_grid, save_image},
};
pub use futures::future::{Future, FutureExt as _};
pub use itertools::Itertools as _;
pub use noisy_float::prelude::*;
pub use rand::{prelude::*, rngs::StdRng};
pub use serde::{Deserialize, Serialize};
pub use std::{
    borrow::Cow,
    collections::HashSet,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};
pub use tch::{
    nn::{self, ModuleT as _, OptimizerConfig as _},
    Device, Kind, Reduction, Tensor,
};
pub use tch_modules::{BceWithLogitsLoss, BceWithLogitsLossInit};
pub use tch_tensor_like::TensorLike;
pub use tfrecord::{ColorSpace, EventAsyncWriter, EventWriterConfig, TchChannelOrder, TchTensorAsImage};
pub use tokio::sync::broadcast;
pub use tracing::{info, info_span, instrument, warn, Instrument};

pub type Fallible<T> = Result<T, Error>;
