//! Parsing of VOC-style XML annotation files.

use crate::common::*;

/// The placeholder some annotation tools write into the `<filename>` element.
const FILENAME_PLACEHOLDER: &str = "%s";

/// One annotated object of one image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub filename: String,
    pub width: usize,
    pub height: usize,
    pub label: String,
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
}

impl AnnotationRecord {
    /// The bounding box in pixel units.
    pub fn tlbr(&self) -> Result<TLBR<i64>> {
        TLBR::try_from_tlbr([self.ymin, self.xmin, self.ymax, self.xmax])
            .with_context(|| format!("invalid bounding box in '{}'", self.filename))
    }

    /// The image size written in the annotation.
    pub fn size(&self) -> HW<i64> {
        HW::from_hw([self.height as i64, self.width as i64])
    }
}

pub use xml::*;
mod xml {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct Annotation {
        pub filename: String,
        pub size: Size,
        #[serde(default)]
        pub object: Vec<Object>,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct Size {
        pub width: usize,
        pub height: usize,
        #[serde(default = "default_depth")]
        pub depth: usize,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct Object {
        pub name: String,
        pub bndbox: BndBox,
    }

    /// Box coordinates. Some tools write them as decimals.
    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct BndBox {
        pub xmin: R64,
        pub ymin: R64,
        pub xmax: R64,
        pub ymax: R64,
    }

    fn default_depth() -> usize {
        3
    }
}

impl Annotation {
    /// Parse an XML annotation document.
    pub fn from_xml(text: &str) -> Result<Self> {
        let annotation: Self = serde_xml_rs::from_str(text)?;
        let Size { width, height, .. } = annotation.size;
        ensure!(
            width > 0 && height > 0,
            "image width and height must be positive, but get {}x{}",
            width,
            height
        );
        Ok(annotation)
    }

    /// Flatten the document into one record per object.
    ///
    /// `fallback_name` replaces the filename when it is empty or the `%s` placeholder.
    /// Boxes are kept as written. Inverted boxes are rejected by [AnnotationRecord::tlbr].
    pub fn to_records(&self, fallback_name: &str) -> Vec<AnnotationRecord> {
        let filename = match self.filename.trim() {
            "" | FILENAME_PLACEHOLDER => fallback_name,
            name => name,
        };
        let Size { width, height, .. } = self.size;

        self.object
            .iter()
            .map(|obj| {
                let BndBox {
                    xmin,
                    ymin,
                    xmax,
                    ymax,
                } = obj.bndbox;
                let [xmin, ymin, xmax, ymax] =
                    [xmin, ymin, xmax, ymax].map(|val| val.raw().round() as i64);

                AnnotationRecord {
                    filename: filename.to_owned(),
                    width,
                    height,
                    label: obj.name.clone(),
                    xmin,
                    ymin,
                    xmax,
                    ymax,
                }
            })
            .collect()
    }
}

/// Parse an annotation document into records.
pub fn parse_annotation(text: &str, fallback_name: &str) -> Result<Vec<AnnotationRecord>> {
    Ok(Annotation::from_xml(text)?.to_records(fallback_name))
}

/// Read and parse an annotation file.
///
/// The file stem is used when the document does not carry a usable filename.
pub async fn load_annotation_file(path: impl AsRef<Path>) -> Result<Vec<AnnotationRecord>> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read annotation file {}", path.display()))?;
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| format_err!("invalid annotation file name {}", path.display()))?;
    let records = parse_annotation(&text, stem)
        .with_context(|| format!("failed to parse annotation file {}", path.display()))?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHIHUAHUA: &str = r#"<annotation>
	<folder>02085620</folder>
	<filename>%s</filename>
	<source>
		<database>ImageNet database</database>
	</source>
	<size>
		<width>250</width>
		<height>188</height>
		<depth>3</depth>
	</size>
	<segment>0</segment>
	<object>
		<name>Chihuahua</name>
		<pose>Unspecified</pose>
		<truncated>0</truncated>
		<difficult>0</difficult>
		<bndbox>
			<xmin>71</xmin>
			<ymin>1</ymin>
			<xmax>192</xmax>
			<ymax>180</ymax>
		</bndbox>
	</object>
</annotation>"#;

    const TWO_DOGS: &str = r#"<annotation>
	<filename>n02085782_17</filename>
	<size><width>500</width><height>375</height><depth>3</depth></size>
	<object>
		<name>Japanese_spaniel</name>
		<bndbox><xmin>10</xmin><ymin>20</ymin><xmax>200.6</xmax><ymax>300</ymax></bndbox>
	</object>
	<object>
		<name>Japanese_spaniel</name>
		<bndbox><xmin>250</xmin><ymin>40</ymin><xmax>480</xmax><ymax>370</ymax></bndbox>
	</object>
</annotation>"#;

    #[test]
    fn parse_all_fields() -> Result<()> {
        let records = parse_annotation(CHIHUAHUA, "n02085620_7")?;
        assert_eq!(
            records,
            vec![AnnotationRecord {
                filename: "n02085620_7".into(),
                width: 250,
                height: 188,
                label: "Chihuahua".into(),
                xmin: 71,
                ymin: 1,
                xmax: 192,
                ymax: 180,
            }]
        );
        assert_eq!(records[0].tlbr()?.tlbr(), [1, 71, 180, 192]);
        Ok(())
    }

    #[test]
    fn parse_multiple_objects() -> Result<()> {
        let records = parse_annotation(TWO_DOGS, "unused")?;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|rec| rec.filename == "n02085782_17"));
        assert_eq!(records[0].xmax, 201);
        assert_eq!(records[1].size(), HW::from_hw([375, 500]));
        Ok(())
    }

    #[test]
    fn parse_without_objects() -> Result<()> {
        let text = "<annotation><filename>a</filename>\
                    <size><width>4</width><height>4</height></size></annotation>";
        assert!(parse_annotation(text, "a")?.is_empty());
        Ok(())
    }

    #[test]
    fn keep_inverted_box() -> Result<()> {
        let text = "<annotation><filename>a</filename>\
                    <size><width>4</width><height>4</height></size>\
                    <object><name>dog</name>\
                    <bndbox><xmin>3</xmin><ymin>0</ymin><xmax>1</xmax><ymax>2</ymax></bndbox>\
                    </object></annotation>";
        let records = parse_annotation(text, "a")?;
        assert_eq!(records.len(), 1);
        assert_eq!(
            [records[0].xmin, records[0].ymin, records[0].xmax, records[0].ymax],
            [3, 0, 1, 2]
        );
        assert!(records[0].tlbr().is_err());
        Ok(())
    }

    #[test]
    fn empty_filename_fallback() -> Result<()> {
        for filename in ["<filename></filename>", "<filename/>"] {
            let text = format!(
                "<annotation>{}\
                 <size><width>4</width><height>4</height></size>\
                 <object><name>dog</name>\
                 <bndbox><xmin>0</xmin><ymin>0</ymin><xmax>2</xmax><ymax>2</ymax></bndbox>\
                 </object></annotation>",
                filename
            );
            let records = parse_annotation(&text, "n02085620_7")?;
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].filename, "n02085620_7");
        }
        Ok(())
    }

    #[test]
    fn reject_malformed_document() {
        assert!(parse_annotation("<annotation><filename>a</filename>", "a").is_err());
        assert!(parse_annotation(
            "<annotation><filename>a</filename><object></object></annotation>",
            "a"
        )
        .is_err());
        assert!(parse_annotation(
            "<annotation><filename>a</filename>\
             <size><width>0</width><height>4</height></size></annotation>",
            "a"
        )
        .is_err());
    }
}
