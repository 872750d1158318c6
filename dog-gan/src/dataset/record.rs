use crate::{annotation::AnnotationRecord, common::*};

/// A row of the annotation index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexRow {
    pub record: AnnotationRecord,
    /// The image file the record refers to. The file may not exist.
    pub image_path: PathBuf,
    /// The annotation file the record was parsed from.
    pub annotation_path: PathBuf,
}

/// Column names of [CsvRow], in field order.
pub(crate) const CSV_HEADER: [&str; 10] = [
    "filename",
    "width",
    "height",
    "label",
    "xmin",
    "ymin",
    "xmax",
    "ymax",
    "image_path",
    "annotation_path",
];

/// The flat CSV layout of [IndexRow].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CsvRow {
    pub filename: String,
    pub width: usize,
    pub height: usize,
    pub label: String,
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
    pub image_path: PathBuf,
    pub annotation_path: PathBuf,
}

impl From<&IndexRow> for CsvRow {
    fn from(row: &IndexRow) -> Self {
        let IndexRow {
            record:
                AnnotationRecord {
                    ref filename,
                    width,
                    height,
                    ref label,
                    xmin,
                    ymin,
                    xmax,
                    ymax,
                },
            ref image_path,
            ref annotation_path,
        } = *row;

        Self {
            filename: filename.clone(),
            width,
            height,
            label: label.clone(),
            xmin,
            ymin,
            xmax,
            ymax,
            image_path: image_path.clone(),
            annotation_path: annotation_path.clone(),
        }
    }
}

impl From<CsvRow> for IndexRow {
    fn from(row: CsvRow) -> Self {
        let CsvRow {
            filename,
            width,
            height,
            label,
            xmin,
            ymin,
            xmax,
            ymax,
            image_path,
            annotation_path,
        } = row;

        Self {
            record: AnnotationRecord {
                filename,
                width,
                height,
                label,
                xmin,
                ymin,
                xmax,
                ymax,
            },
            image_path,
            annotation_path,
        }
    }
}
