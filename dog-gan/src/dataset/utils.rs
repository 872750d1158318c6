use crate::common::*;

/// List regular files under a directory recursively in sorted order.
pub async fn list_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref().to_owned();
    ensure!(dir.is_dir(), "'{}' is not a directory", dir.display());

    let paths = tokio::task::spawn_blocking(move || -> Result<_> {
        let pattern = format!("{}/**/*", dir.display());
        let mut paths: Vec<_> = glob::glob(&pattern)?
            .map(|result| -> Result<_> {
                let path = result?;
                Ok(path.is_file().then(|| path))
            })
            .filter_map(|result| result.transpose())
            .try_collect()?;
        paths.sort();
        Ok(paths)
    })
    .await??;

    Ok(paths)
}

/// Locate the image file of an annotation file.
///
/// The image lives at the same relative directory under `image_dir`. The `extension`
/// is appended unless `filename` already carries one.
pub fn resolve_image_path(
    annotation_dir: &Path,
    annotation_path: &Path,
    image_dir: &Path,
    filename: &str,
    extension: &str,
) -> Result<PathBuf> {
    let rel_dir = annotation_path
        .strip_prefix(annotation_dir)
        .with_context(|| {
            format!(
                "'{}' is not under '{}'",
                annotation_path.display(),
                annotation_dir.display()
            )
        })?
        .parent()
        .unwrap_or_else(|| Path::new(""));

    let file_name = if Path::new(filename).extension().is_some() {
        filename.to_owned()
    } else {
        format!("{}.{}", filename, extension)
    };

    Ok(image_dir.join(rel_dir).join(file_name))
}
