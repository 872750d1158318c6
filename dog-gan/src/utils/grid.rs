use crate::common::*;

/// Tile a batch of images into one image.
///
/// The input is a `[rows * cols, 3, h, w]` batch. The output is a
/// `[3, rows * h, cols * w]` image filled row by row.
pub fn make_grid(images: &Tensor, rows: usize, cols: usize) -> Result<Tensor> {
    let (batch, channels, height, width) = images.size4()?;
    let (rows, cols) = (rows as i64, cols as i64);
    ensure!(
        rows > 0 && cols > 0,
        "grid rows and cols must be positive, but get {}x{}",
        rows,
        cols
    );
    ensure!(
        batch == rows * cols,
        "expect {} images for a {}x{} grid, but get {}",
        rows * cols,
        rows,
        cols,
        batch
    );

    let grid = images
        .view([rows, cols, channels, height, width])
        .permute(&[2, 0, 3, 1, 4])
        .reshape(&[channels, rows * height, cols * width]);
    Ok(grid)
}

/// Place images of the same height next to each other.
pub fn concat_horizontal(images: &[Tensor]) -> Result<Tensor> {
    ensure!(!images.is_empty(), "no images to concatenate");
    let heights: HashSet<_> = images
        .iter()
        .map(|image| image.size3().map(|(_, h, _)| h))
        .try_collect()?;
    ensure!(heights.len() == 1, "images must have the same height");
    Ok(Tensor::cat(images, 2))
}

/// Save a `[3, h, w]` image with values in `[0, 1]`.
///
/// The format is chosen by the file extension.
pub fn save_image(image: &Tensor, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let (channels, _, _) = image.size3()?;
    ensure!(channels == 3, "expect 3 channels, but get {}", channels);

    let image = tch::no_grad(|| {
        (image.detach().clamp(0.0, 1.0) * 255.0)
            .round()
            .to_kind(Kind::Uint8)
            .to_device(Device::Cpu)
    });
    vision::image::save(&image, path)
        .with_context(|| format!("failed to save image '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_grid_test() -> Result<()> {
        // image i has constant value i
        let images = Tensor::arange(6, (Kind::Float, Device::Cpu))
            .view([6, 1, 1, 1])
            .expand(&[6, 3, 2, 4], false)
            .contiguous();
        let grid = make_grid(&images, 2, 3)?;
        assert_eq!(grid.size(), vec![3, 4, 12]);

        for row in 0..2i64 {
            for col in 0..3i64 {
                let tile = grid.i((.., row * 2..(row + 1) * 2, col * 4..(col + 1) * 4));
                let expect = (row * 3 + col) as f64;
                assert_eq!(f64::from(&tile.min()), expect);
                assert_eq!(f64::from(&tile.max()), expect);
            }
        }

        assert!(make_grid(&images, 4, 4).is_err());
        Ok(())
    }

    #[test]
    fn concat_horizontal_test() -> Result<()> {
        let lhs = Tensor::zeros(&[3, 4, 5], (Kind::Float, Device::Cpu));
        let rhs = Tensor::ones(&[3, 4, 2], (Kind::Float, Device::Cpu));
        let image = concat_horizontal(&[lhs.shallow_clone(), rhs])?;
        assert_eq!(image.size(), vec![3, 4, 7]);

        let taller = Tensor::ones(&[3, 5, 2], (Kind::Float, Device::Cpu));
        assert!(concat_horizontal(&[lhs, taller]).is_err());
        assert!(concat_horizontal(&[]).is_err());
        Ok(())
    }

    #[test]
    fn save_image_test() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("grid.png");

        let image = Tensor::full(&[3, 8, 8], 0.5, (Kind::Float, Device::Cpu));
        save_image(&image, &path)?;

        let loaded = vision::image::load(&path)?;
        assert_eq!(loaded.size(), vec![3, 8, 8]);
        assert_eq!(i64::from(&loaded.max().to_kind(Kind::Int64)), 128);
        Ok(())
    }
}
