use super::*;
use crate::{annotation::load_annotation_file, common::*};

/// The tabular index of annotated objects, kept in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationIndex {
    rows: Vec<IndexRow>,
}

/// Image size statistics over distinct images of an index.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeSummary {
    pub num_images: usize,
    pub min_width: usize,
    pub max_width: usize,
    pub mean_width: f64,
    pub min_height: usize,
    pub max_height: usize,
    pub mean_height: f64,
}

impl AnnotationIndex {
    pub fn new(rows: Vec<IndexRow>) -> Self {
        Self { rows }
    }

    /// Build the index from an annotation directory and an image directory.
    ///
    /// Every file under `annotation_dir` is parsed as an annotation. A malformed
    /// annotation file fails the whole loading. Image files are not checked here.
    pub async fn load(
        annotation_dir: impl AsRef<Path>,
        image_dir: impl AsRef<Path>,
        image_extension: &str,
    ) -> Result<Self> {
        let annotation_dir: Arc<Path> = annotation_dir.as_ref().into();
        let image_dir: Arc<Path> = image_dir.as_ref().into();
        let image_extension: Arc<str> = image_extension.into();

        let annotation_files = list_files(&*annotation_dir).await?;
        info!(
            "found {} annotation files in '{}'",
            annotation_files.len(),
            annotation_dir.display()
        );

        let rows: Vec<Vec<IndexRow>> = stream::iter(annotation_files)
            .par_then(None, move |annotation_path| {
                let annotation_dir = annotation_dir.clone();
                let image_dir = image_dir.clone();
                let image_extension = image_extension.clone();

                async move {
                    let records = load_annotation_file(&annotation_path).await?;
                    let rows: Vec<_> = records
                        .into_iter()
                        .map(|record| -> Result<_> {
                            let image_path = resolve_image_path(
                                &annotation_dir,
                                &annotation_path,
                                &image_dir,
                                &record.filename,
                                &image_extension,
                            )?;
                            Ok(IndexRow {
                                record,
                                image_path,
                                annotation_path: annotation_path.clone(),
                            })
                        })
                        .try_collect()?;
                    Fallible::Ok(rows)
                }
            })
            .try_collect()
            .await?;

        let rows: Vec<_> = rows.into_iter().flatten().collect();
        info!("indexed {} annotated objects", rows.len());

        Ok(Self { rows })
    }

    /// Load an index previously saved by [AnnotationIndex::write_csv].
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rows: Vec<CsvRow> = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("failed to open '{}'", path.display()))?
            .deserialize()
            .try_collect()?;
        let rows = rows.into_iter().map(IndexRow::from).collect();
        Ok(Self { rows })
    }

    /// Save the index as CSV with a header row.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .with_context(|| format!("failed to create '{}'", path.display()))?;
        writer.write_record(CSV_HEADER)?;
        self.rows
            .iter()
            .try_for_each(|row| writer.serialize(CsvRow::from(row)))?;
        writer.flush()?;
        Ok(())
    }

    pub fn rows(&self) -> &[IndexRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only rows with whitelisted labels.
    pub fn retain_classes(&mut self, whitelist: &HashSet<String>) {
        self.rows
            .retain(|row| whitelist.contains(&row.record.label));
    }

    /// Keep at most `max_rows` leading rows.
    pub fn truncate(&mut self, max_rows: usize) {
        self.rows.truncate(max_rows);
    }

    /// Class labels in first-seen order.
    pub fn classes(&self) -> IndexSet<String> {
        self.rows
            .iter()
            .map(|row| row.record.label.clone())
            .collect()
    }

    /// The number of rows per class label, in first-seen order.
    pub fn class_counts(&self) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        self.rows.iter().for_each(|row| {
            *counts.entry(row.record.label.clone()).or_insert(0) += 1;
        });
        counts
    }

    /// Size statistics over distinct images, or `None` for an empty index.
    pub fn size_summary(&self) -> Option<SizeSummary> {
        let sizes: Vec<(usize, usize)> = self
            .rows
            .iter()
            .unique_by(|row| &row.image_path)
            .map(|row| (row.record.width, row.record.height))
            .collect();

        let num_images = sizes.len();
        if num_images == 0 {
            return None;
        }

        let (widths, heights): (Vec<_>, Vec<_>) = sizes.into_iter().unzip();
        let mean = |values: &[usize]| values.iter().sum::<usize>() as f64 / num_images as f64;

        Some(SizeSummary {
            num_images,
            min_width: *widths.iter().min()?,
            max_width: *widths.iter().max()?,
            mean_width: mean(&widths),
            min_height: *heights.iter().min()?,
            max_height: *heights.iter().max()?,
            mean_height: mean(&heights),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationRecord;

    fn row(filename: &str, label: &str, width: usize, height: usize) -> IndexRow {
        IndexRow {
            record: AnnotationRecord {
                filename: filename.into(),
                width,
                height,
                label: label.into(),
                xmin: 0,
                ymin: 0,
                xmax: 10,
                ymax: 10,
            },
            image_path: PathBuf::from(format!("img/{}.jpg", filename)),
            annotation_path: PathBuf::from(format!("ann/{}", filename)),
        }
    }

    #[test]
    fn class_statistics() {
        let mut index = AnnotationIndex::new(vec![
            row("a", "Pug", 100, 50),
            row("a", "Pug", 100, 50),
            row("b", "Beagle", 300, 150),
            row("c", "Pug", 200, 100),
        ]);

        let counts = index.class_counts();
        assert_eq!(
            counts.into_iter().collect::<Vec<_>>(),
            vec![("Pug".to_string(), 3), ("Beagle".to_string(), 1)]
        );

        let summary = index.size_summary().unwrap();
        assert_eq!(summary.num_images, 3);
        assert_eq!(summary.min_width, 100);
        assert_eq!(summary.max_height, 150);
        approx::assert_abs_diff_eq!(summary.mean_width, 200.0);

        let whitelist: HashSet<_> = ["Beagle".to_string()].into_iter().collect();
        index.retain_classes(&whitelist);
        assert_eq!(index.len(), 1);
        assert_eq!(index.classes().len(), 1);

        index.truncate(0);
        assert!(index.is_empty());
        assert!(index.size_summary().is_none());
    }

    #[test]
    fn csv_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("index.csv");

        let index = AnnotationIndex::new(vec![row("a", "Pug", 100, 50), row("b", "Beagle", 3, 4)]);
        index.write_csv(&path)?;
        let loaded = AnnotationIndex::read_csv(&path)?;
        assert_eq!(index, loaded);

        Ok(())
    }

    #[test]
    fn csv_header_of_empty_index() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("index.csv");

        AnnotationIndex::new(vec![]).write_csv(&path)?;
        let text = std::fs::read_to_string(&path)?;
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            ["filename,width,height,label,xmin,ymin,xmax,ymax,image_path,annotation_path"]
        );
        assert!(AnnotationIndex::read_csv(&path)?.is_empty());

        Ok(())
    }
}
