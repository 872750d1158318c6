use anyhow::Result;
use dog_gan::{
    dataset::{AnnotationIndex, ImageDataset},
    processor::ImagePreprocessor,
};
use std::path::Path;
use tch::{vision, Device, IndexOp, Kind, Tensor};

const ANNOTATION_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/stanford_dogs/Annotation");
const MALFORMED_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/malformed/Annotation");

/// Write a half black, half white image.
fn write_image(path: &Path, height: i64, width: i64) -> Result<()> {
    std::fs::create_dir_all(path.parent().unwrap())?;
    let image = Tensor::zeros(&[3, height, width], (Kind::Uint8, Device::Cpu));
    let _ = image.i((.., .., width / 2..)).fill_(255i64);
    vision::image::save(&image, path)?;
    Ok(())
}

#[tokio::test]
async fn load_index_and_dataset() -> Result<()> {
    let image_dir = tempfile::tempdir()?;
    write_image(
        &image_dir.path().join("n02085620-Chihuahua/n02085620_7.png"),
        48,
        64,
    )?;
    write_image(
        &image_dir.path().join("n02085782-Japanese_spaniel/n02085782_17.png"),
        40,
        80,
    )?;

    let index = AnnotationIndex::load(ANNOTATION_DIR, image_dir.path(), "png").await?;
    assert_eq!(index.len(), 4);

    let filenames: Vec<_> = index
        .rows()
        .iter()
        .map(|row| row.record.filename.as_str())
        .collect();
    assert_eq!(
        filenames,
        ["n02085620_7", "n02085620_missing", "n02085782_17", "n02085782_17"]
    );
    assert_eq!(
        index.classes().into_iter().collect::<Vec<_>>(),
        ["Chihuahua", "Japanese_spaniel"]
    );
    assert_eq!(
        index.rows()[0].image_path,
        image_dir.path().join("n02085620-Chihuahua/n02085620_7.png")
    );

    // the row without an image file is skipped
    let preprocessor = ImagePreprocessor::new(16, Default::default())?;
    let dataset = ImageDataset::load(&index, preprocessor).await?;
    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.labels(), ["Chihuahua", "Japanese_spaniel", "Japanese_spaniel"]);
    assert_eq!(dataset.images().size(), vec![3, 3, 16, 16]);

    // the first spaniel crop is the black left half, the second one the white right half
    let means = Vec::<f32>::from(&dataset.images().mean_dim(&[1, 2, 3], false, Kind::Float));
    assert!(means[1] < 0.01);
    assert!(means[2] > 0.99);

    Ok(())
}

#[tokio::test]
async fn reject_malformed_annotation() -> Result<()> {
    let image_dir = tempfile::tempdir()?;
    let result = AnnotationIndex::load(MALFORMED_DIR, image_dir.path(), "jpg").await;
    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("broken"));
    Ok(())
}

#[tokio::test]
async fn reject_dataset_without_images() -> Result<()> {
    let image_dir = tempfile::tempdir()?;
    let index = AnnotationIndex::load(ANNOTATION_DIR, image_dir.path(), "jpg").await?;
    let preprocessor = ImagePreprocessor::new(16, Default::default())?;
    assert!(ImageDataset::load(&index, preprocessor).await.is_err());
    Ok(())
}

#[tokio::test]
async fn skip_invalid_boxes_when_loading_images() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let annotation_dir = dir.path().join("Annotation");
    let image_dir = dir.path().join("Images");
    std::fs::create_dir_all(annotation_dir.join("n02088364-beagle"))?;

    // a valid box, an inverted box and a zero-area box
    let xml = "<annotation><filename>%s</filename>\
               <size><width>32</width><height>24</height></size>\
               <object><name>beagle</name>\
               <bndbox><xmin>4</xmin><ymin>2</ymin><xmax>28</xmax><ymax>22</ymax></bndbox></object>\
               <object><name>beagle</name>\
               <bndbox><xmin>20</xmin><ymin>2</ymin><xmax>10</xmax><ymax>22</ymax></bndbox></object>\
               <object><name>beagle</name>\
               <bndbox><xmin>4</xmin><ymin>5</ymin><xmax>28</xmax><ymax>5</ymax></bndbox></object>\
               </annotation>";
    std::fs::write(annotation_dir.join("n02088364-beagle/n02088364_3"), xml)?;
    write_image(&image_dir.join("n02088364-beagle/n02088364_3.png"), 24, 32)?;

    // every object becomes a row
    let index = AnnotationIndex::load(&annotation_dir, &image_dir, "png").await?;
    assert_eq!(index.len(), 3);
    assert!(index.rows()[1].record.tlbr().is_err());

    // only the valid box yields an image
    let preprocessor = ImagePreprocessor::new(8, Default::default())?;
    let dataset = ImageDataset::load(&index, preprocessor).await?;
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.images().size(), vec![1, 3, 8, 8]);

    Ok(())
}
