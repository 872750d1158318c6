//! The training program for dog-gan project.

pub mod common;
pub mod config;
pub mod logging;
pub mod train;
pub mod utils;

use crate::{common::*, config::Config, train::TrainingSummary};

/// The entry of training program.
///
/// It returns the run directory where all outputs are written.
pub async fn start(config: Arc<Config>) -> Result<PathBuf> {
    let start_time = Local::now();
    let logging_dir: Arc<Path> = {
        let dir = config
            .logging
            .dir
            .join(format!("{}", start_time.format(utils::FILE_STRFTIME)));
        dir.into_boxed_path().into()
    };

    // create dirs and save config
    {
        tokio::fs::create_dir_all(&*logging_dir).await?;
        let path = logging_dir.join("config.json5");
        let text = serde_json::to_string_pretty(&*config)?;
        tokio::fs::write(&path, text).await?;
    }
    info!("write outputs to '{}'", logging_dir.display());

    // load dataset
    let dataset = {
        let config::DatasetConfig {
            ref annotation_dir,
            ref image_dir,
            ref image_extension,
            ref class_whitelist,
            max_records,
        } = config.dataset;

        info!("loading annotations");
        let mut index = AnnotationIndex::load(annotation_dir, image_dir, image_extension)
            .instrument(info_span!("load_index"))
            .await
            .with_context(|| {
                format!(
                    "failed to load annotations from '{}'",
                    annotation_dir.display()
                )
            })?;
        if let Some(whitelist) = class_whitelist {
            index.retain_classes(whitelist);
        }
        if let Some(max_records) = max_records {
            index.truncate(max_records.get());
        }
        ensure!(!index.is_empty(), "no annotation record is selected");
        info!(
            "selected {} records of {} classes",
            index.len(),
            index.classes().len()
        );
        index.write_csv(logging_dir.join("index.csv"))?;

        info!("preprocessing images");
        let preprocessor = ImagePreprocessor::new(
            config.preprocessor.image_size.get(),
            config.preprocessor.crop_mode,
        )?;
        ImageDataset::load(&index, preprocessor)
            .instrument(info_span!("load_images"))
            .await?
    };

    // the same noise renders samples of every variant
    if let Some(seed) = config.training.seed {
        tch::manual_seed(seed as i64);
    }
    let sample_noise = {
        let config::LoggingConfig {
            sample_rows,
            sample_cols,
            ..
        } = config.logging;
        Tensor::randn(
            &[
                (sample_rows.get() * sample_cols.get()) as i64,
                config.model.latent_dim.get() as i64,
            ],
            (Kind::Float, Device::Cpu),
        )
    };

    // start logger
    let (logging_tx, logging_rx) = broadcast::channel(64);
    let logging_future =
        logging::logging_worker(config.clone(), logging_dir.clone(), logging_rx).await?;

    // train variants one after another
    let training_future = {
        let config = config.clone();
        let logging_dir = logging_dir.clone();

        async move {
            let mut summaries = vec![];

            for &kind in &config.training.variants {
                let config = config.clone();
                let dataset = dataset.shallow_clone();
                let logging_dir = logging_dir.clone();
                let sample_noise = sample_noise.shallow_clone();
                let logging_tx = logging_tx.clone();

                let summary = tokio::task::spawn_blocking(move || {
                    train::training_worker(
                        config,
                        kind,
                        dataset,
                        logging_dir,
                        sample_noise,
                        logging_tx,
                    )
                })
                .await??;
                summaries.push(summary);
            }

            compare(&summaries, &logging_dir, &logging_tx)?;

            // closes the logging channel
            drop(logging_tx);
            Fallible::Ok(())
        }
    };

    futures::try_join!(training_future, logging_future)?;

    Ok(logging_dir.to_path_buf())
}

/// Save the final sample grids side by side and log a summary line per variant.
fn compare(
    summaries: &[TrainingSummary],
    logging_dir: &Path,
    logging_tx: &broadcast::Sender<logging::LoggingMessage>,
) -> Result<()> {
    let grids: Vec<_> = summaries
        .iter()
        .map(|summary| summary.final_grid.shallow_clone())
        .collect();
    let comparison = concat_horizontal(&grids)?;
    let path = logging_dir.join("comparison.png");
    save_image(&comparison, &path)?;
    logging_tx
        .send(logging::LoggingMessage::new_image("comparison", 0, &comparison))
        .map_err(|_err| format_err!("cannot send message to logger"))?;
    info!("saved comparison image to '{}'", path.display());

    summaries.iter().for_each(|summary| {
        let TrainingSummary {
            kind,
            generator_loss,
            discriminator_loss,
            real_score,
            fake_score,
            generator_parameters,
            discriminator_parameters,
            elapsed,
            ..
        } = *summary;

        info!(
            "{}\tg_loss: {:.5}\td_loss: {:.5}\treal: {:.3}\tfake: {:.3}\tparams: {}/{}\ttime: {:.2?}",
            kind.name(),
            generator_loss,
            discriminator_loss,
            real_score,
            fake_score,
            generator_parameters,
            discriminator_parameters,
            elapsed
        );
    });

    Ok(())
}
