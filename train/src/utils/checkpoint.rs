use crate::common::*;

pub const FILE_STRFTIME: &str = "%Y-%m-%d-%H-%M-%S.%3f%z";

/// Save parameters to a checkpoint file.
///
/// The file name carries the time, the network name, the training step and the loss.
pub fn save_checkpoint(
    vs: &nn::VarStore,
    checkpoint_dir: &Path,
    name: &str,
    training_step: usize,
    loss: f64,
) -> Result<PathBuf> {
    let filename = format!(
        "{}_{}_{:06}_{:08.5}.ckpt",
        Local::now().format(FILE_STRFTIME),
        name,
        training_step,
        loss
    );
    let path = checkpoint_dir.join(filename);
    vs.save(&path)
        .with_context(|| format!("failed to save checkpoint '{}'", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_checkpoint() -> Result<()> {
        let dir = tempfile::tempdir()?;

        let vs = nn::VarStore::new(Device::Cpu);
        let _ = nn::linear(&vs.root() / "fc", 3, 2, Default::default());
        let path = save_checkpoint(&vs, dir.path(), "generator", 12, 0.5)?;

        let file_name = path.file_name().unwrap().to_str().unwrap();
        assert!(file_name.ends_with("_generator_000012_00.50000.ckpt"));

        let mut other = nn::VarStore::new(Device::Cpu);
        let _ = nn::linear(&other.root() / "fc", 3, 2, Default::default());
        other.load(&path)?;
        Ok(())
    }
}
