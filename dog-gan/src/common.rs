pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use bbox::{prelude::*, CropMode, HW, TLBR};
pub use futures::stream::{self, StreamExt as _, TryStreamExt as _};
pub use indexmap::{IndexMap, IndexSet};
pub use itertools::Itertools as _;
pub use log::{info, warn};
pub use noisy_float::prelude::*;
pub use par_stream::prelude::*;
pub use rand::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::{
    borrow::Borrow,
    collections::HashSet,
    fmt::Debug,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    iter,
    sync::Arc,
};
pub use tch::{
    nn::{self, ModuleT as _},
    vision, Device, IndexOp as _, Kind, Tensor,
};
pub use tch_act::{Activation, TensorActivationExt as _};

pub type Fallible<T> = Result<T, Error>;
