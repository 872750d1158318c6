use super::*;
use crate::{common::*, processor::ImagePreprocessor};

/// The preprocessed training images held in memory.
#[derive(Debug)]
pub struct ImageDataset {
    /// Images in `[num_images, 3, size, size]` shape with values in `[0, 1]`.
    images: Tensor,
    /// The class label of each image.
    labels: Vec<String>,
}

impl ImageDataset {
    /// Build a dataset from stacked images.
    pub fn new(images: Tensor, labels: Vec<String>) -> Result<Self> {
        let (num_images, channels, height, width) = images.size4()?;
        ensure!(num_images > 0, "the dataset is empty");
        ensure!(channels == 3, "expect 3 channels, but get {}", channels);
        ensure!(height == width, "expect square images, but get {}x{}", width, height);
        ensure!(
            num_images as usize == labels.len(),
            "the number of images ({}) and labels ({}) mismatch",
            num_images,
            labels.len()
        );

        Ok(Self {
            images: images.set_requires_grad(false),
            labels,
        })
    }

    /// Preprocess every row of the index.
    ///
    /// Images that cannot be loaded or cropped are skipped with a warning. The
    /// remaining images keep the index order.
    pub async fn load(index: &AnnotationIndex, preprocessor: ImagePreprocessor) -> Result<Self> {
        let preprocessor = Arc::new(preprocessor);
        let rows: Vec<_> = index.rows().to_vec();
        let num_rows = rows.len();

        let samples: Vec<Option<(Tensor, String)>> = stream::iter(rows)
            .par_map(None, move |row| {
                let preprocessor = preprocessor.clone();

                move || {
                    let IndexRow {
                        record, image_path, ..
                    } = row;

                    match preprocessor.process(&image_path, &record) {
                        Ok(image) => Some((image, record.label)),
                        Err(err) => {
                            warn!("skip '{}': {:#}", image_path.display(), err);
                            None
                        }
                    }
                }
            })
            .collect()
            .await;

        let (images, labels): (Vec<_>, Vec<_>) = samples.into_iter().flatten().unzip();
        let num_skipped = num_rows - images.len();
        if num_skipped > 0 {
            warn!("skipped {} of {} records", num_skipped, num_rows);
        }
        ensure!(!images.is_empty(), "no image could be loaded");
        info!("loaded {} images", images.len());

        Self::new(Tensor::stack(&images, 0), labels)
    }

    /// Create a dataset sharing the same image storage.
    pub fn shallow_clone(&self) -> Self {
        Self {
            images: self.images.shallow_clone(),
            labels: self.labels.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The side length of the square images.
    pub fn image_size(&self) -> usize {
        self.images.size()[2] as usize
    }

    pub fn images(&self) -> &Tensor {
        &self.images
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Draw a batch uniformly at random with replacement.
    pub fn sample_batch<R>(&self, rng: &mut R, batch_size: usize, device: Device) -> Tensor
    where
        R: Rng + ?Sized,
    {
        let num_images = self.len();
        let indices: Vec<i64> = (0..batch_size)
            .map(|_| rng.gen_range(0..num_images) as i64)
            .collect();
        let indices = Tensor::of_slice(&indices);
        self.images.index_select(0, &indices).to_device(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_batch_test() -> Result<()> {
        let num_images = 5;
        // image i is filled with the value i / 10
        let images = (Tensor::arange(num_images, (Kind::Float, Device::Cpu)) / 10.0)
            .view([num_images, 1, 1, 1])
            .expand(&[num_images, 3, 4, 4], false)
            .contiguous();
        let labels = (0..num_images).map(|idx| format!("class{}", idx)).collect();
        let dataset = ImageDataset::new(images, labels)?;

        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.image_size(), 4);

        let mut rng = StdRng::seed_from_u64(7);
        let batch = dataset.sample_batch(&mut rng, 16, Device::Cpu);
        assert_eq!(batch.size(), vec![16, 3, 4, 4]);

        // every sampled image is one of the dataset images
        let values = Vec::<f32>::from(&batch.mean_dim(&[1, 2, 3], false, Kind::Float));
        assert!(values
            .iter()
            .all(|&val| (0..5).any(|idx| (val - idx as f32 / 10.0).abs() < 1e-6)));

        Ok(())
    }

    #[test]
    fn reject_inconsistent_dataset() {
        let images = Tensor::zeros(&[2, 3, 4, 4], (Kind::Float, Device::Cpu));
        assert!(ImageDataset::new(images, vec!["a".into()]).is_err());

        let images = Tensor::zeros(&[0, 3, 4, 4], (Kind::Float, Device::Cpu));
        assert!(ImageDataset::new(images, vec![]).is_err());

        let images = Tensor::zeros(&[1, 1, 4, 4], (Kind::Float, Device::Cpu));
        assert!(ImageDataset::new(images, vec!["a".into()]).is_err());
    }
}
