use crate::{annotation::AnnotationRecord, common::*};

/// Turns an annotated image into a fixed-size normalized tensor.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    image_size: usize,
    crop_mode: CropMode,
}

impl ImagePreprocessor {
    /// Build a new preprocessor.
    ///
    /// * `image_size` - The outcome image size in pixels.
    /// * `crop_mode` - The placement of the square crop inside the bounding box.
    pub fn new(image_size: usize, crop_mode: CropMode) -> Result<Self> {
        ensure!(image_size > 0, "image_size must be positive");
        Ok(Self {
            image_size,
            crop_mode,
        })
    }

    pub fn image_size(&self) -> usize {
        self.image_size
    }

    /// Load, crop, resize and normalize one image.
    ///
    /// The square crop side is the shorter side of the bounding box after clipping
    /// the box to the image. The output is a `[3, image_size, image_size]` float
    /// tensor on CPU with values in `[0, 1]`.
    pub fn process(&self, image_path: impl AsRef<Path>, record: &AnnotationRecord) -> Result<Tensor> {
        let Self {
            image_size,
            crop_mode,
        } = *self;
        let image_path = image_path.as_ref();
        let image_size = image_size as i64;

        tch::no_grad(|| -> Result<_> {
            let image = vision::image::load(image_path)
                .with_context(|| format!("failed to load image {}", image_path.display()))?;
            let (channels, height, width) = image.size3()?;
            ensure!(
                channels == 3,
                "expect 3 channels, but get {} in {}",
                channels,
                image_path.display()
            );

            if (height, width) != (record.height as i64, record.width as i64) {
                warn!(
                    "image size {}x{} of '{}' differs from the annotation {}x{}",
                    width,
                    height,
                    image_path.display(),
                    record.width,
                    record.height
                );
            }

            let crop = record
                .tlbr()?
                .clamp_to(&HW::from_hw([height, width]))
                .with_context(|| format!("invalid bounding box in {}", image_path.display()))?
                .square_crop(crop_mode);
            ensure!(!crop.hw().is_empty(), "empty crop in {}", image_path.display());
            let [t, l, b, r] = crop.tlbr();

            let cropped = image.i((.., t..b, l..r)).contiguous();
            let resized = vision::image::resize(&cropped, image_size, image_size)?;
            let output = (resized.to_kind(Kind::Float) / 255.0).set_requires_grad(false);

            Ok(output)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(width: usize, height: usize, tlbr: [i64; 4]) -> AnnotationRecord {
        let [ymin, xmin, ymax, xmax] = tlbr;
        AnnotationRecord {
            filename: "dog".into(),
            width,
            height,
            label: "Pug".into(),
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    #[test]
    fn process_image() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dog.png");

        // left half black, right half white
        let image = Tensor::zeros(&[3, 60, 80], (Kind::Uint8, Device::Cpu));
        let _ = image.i((.., .., 40i64..)).fill_(255i64);
        vision::image::save(&image, &path)?;

        let processor = ImagePreprocessor::new(32, CropMode::TopLeft)?;

        let output = processor.process(&path, &record(80, 60, [0, 40, 60, 80]))?;
        assert_eq!(output.size(), vec![3, 32, 32]);
        assert_eq!(output.kind(), Kind::Float);
        assert!(bool::from(output.ge(0.0).logical_and(&output.le(1.0)).all()));
        // the crop lies in the white half
        assert!(f64::from(&output.mean(Kind::Float)) > 0.99);

        // boxes exceeding the image are clipped
        let output = processor.process(&path, &record(80, 60, [-10, -10, 200, 30]))?;
        assert_eq!(output.size(), vec![3, 32, 32]);
        assert!(f64::from(&output.mean(Kind::Float)) < 0.01);

        Ok(())
    }

    #[test]
    fn process_missing_image() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let processor = ImagePreprocessor::new(16, CropMode::Center)?;
        let result = processor.process(dir.path().join("missing.jpg"), &record(8, 8, [0, 0, 8, 8]));
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn reject_zero_size() {
        assert!(ImagePreprocessor::new(0, CropMode::TopLeft).is_err());
    }
}
