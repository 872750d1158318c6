//! The adversarial training loop.

use crate::{
    common::*,
    config::{Config, LoggingConfig, OptimizerConfig, TrainingConfig},
    logging::{LoggingMessage, TrainingStepLog},
    utils::{self, RateCounter},
};

/// The outcome of training one model variant.
#[derive(Debug)]
pub struct TrainingSummary {
    pub kind: ModelKind,
    /// The last sample grid on CPU, rendered from the shared sample noise.
    pub final_grid: Tensor,
    pub generator_loss: f64,
    pub discriminator_loss: f64,
    pub real_score: f64,
    pub fake_score: f64,
    pub generator_parameters: i64,
    pub discriminator_parameters: i64,
    pub elapsed: Duration,
}

/// Losses and scores of one iteration.
#[derive(Debug, Clone, Copy)]
struct StepOutput {
    generator_loss: f64,
    discriminator_loss: f64,
    real_score: f64,
    fake_score: f64,
}

/// Train one model variant for a fixed number of steps.
///
/// Sample grids are rendered from `sample_noise` into `<run_dir>/<variant>/samples`.
#[instrument(skip_all, fields(variant = kind.name()))]
pub fn training_worker(
    config: Arc<Config>,
    kind: ModelKind,
    dataset: ImageDataset,
    run_dir: Arc<Path>,
    sample_noise: Tensor,
    logging_tx: broadcast::Sender<LoggingMessage>,
) -> Result<TrainingSummary> {
    let Config {
        model: ref model_config,
        training:
            TrainingConfig {
                max_steps,
                batch_size,
                ref generator_optimizer,
                ref discriminator_optimizer,
                label_smoothing,
                seed,
                save_checkpoint_steps,
                device,
                ..
            },
        logging:
            LoggingConfig {
                log_interval,
                sample_interval,
                sample_rows,
                sample_cols,
                ..
            },
        ..
    } = *config;
    let max_steps = max_steps.get();
    let batch_size = batch_size.get();
    let real_target = 1.0 - label_smoothing.raw();
    let name = kind.name();

    // prepare dirs
    let variant_dir = run_dir.join(name);
    let samples_dir = variant_dir.join("samples");
    let checkpoint_dir = variant_dir.join("checkpoints");
    std::fs::create_dir_all(&samples_dir)?;
    if save_checkpoint_steps.is_some() {
        std::fs::create_dir_all(&checkpoint_dir)?;
    }

    // init model
    let mut rng = match seed {
        Some(seed) => {
            tch::manual_seed(seed as i64);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    info!("initializing {} model", name);
    let model = ModelPair::new(kind, model_config, dataset.image_size(), device)?;
    let (generator_parameters, discriminator_parameters) = model.num_parameters();
    info!(
        "generator has {} parameters, discriminator has {} parameters",
        generator_parameters, discriminator_parameters
    );

    let mut generator_opt = build_optimizer(generator_optimizer, &model.generator_vs)?;
    let mut discriminator_opt =
        build_optimizer(discriminator_optimizer, &model.discriminator_vs)?;
    let bce = BceWithLogitsLossInit::default(Reduction::Mean).build();
    let sample_noise = sample_noise.to_device(device);

    // renders the sample grid of the current generator
    let render_samples = |step: usize| -> Result<Tensor> {
        let images = tch::no_grad(|| model.generate(&sample_noise, false));
        let grid = make_grid(&images, sample_rows.get(), sample_cols.get())?.to_device(Device::Cpu);
        let path = samples_dir.join(format!("step_{:06}.png", step));
        save_image(&grid, &path)?;
        logging_tx
            .send(LoggingMessage::new_image(name, step, &grid))
            .map_err(|_err| format_err!("cannot send message to logger"))?;
        Ok(grid)
    };

    // training
    info!("start training");
    let start_time = Instant::now();
    let mut rate_counter = RateCounter::with_second_interval();
    let mut last_output = None;
    let mut final_grid = None;

    for step in 0..max_steps {
        let real = dataset.sample_batch(&mut rng, batch_size, device);
        let DiscriminatorStep {
            loss: discriminator_loss,
            real_logits,
            ..
        } = discriminator_step(&model, &mut discriminator_opt, &bce, &real, real_target);
        let GeneratorStep {
            loss: generator_loss,
            fake_logits: generator_logits,
        } = generator_step(&model, &mut generator_opt, &bce, batch_size);

        rate_counter.add(1.0);
        let is_last_step = step + 1 == max_steps;

        // report losses and scores
        if step % log_interval.get() == 0 || is_last_step {
            let output = tch::no_grad(|| StepOutput {
                generator_loss: f64::from(&generator_loss),
                discriminator_loss: f64::from(&discriminator_loss),
                real_score: f64::from(&real_logits.sigmoid().mean(Kind::Float)),
                fake_score: f64::from(&generator_logits.sigmoid().mean(Kind::Float)),
            });
            let StepOutput {
                generator_loss,
                discriminator_loss,
                real_score,
                fake_score,
            } = output;

            match rate_counter.rate() {
                Some(rate) => info!(
                    "step: {}\tg_loss: {:.5}\td_loss: {:.5}\treal: {:.3}\tfake: {:.3}\t{:.2} steps/s",
                    step, generator_loss, discriminator_loss, real_score, fake_score, rate
                ),
                None => info!(
                    "step: {}\tg_loss: {:.5}\td_loss: {:.5}\treal: {:.3}\tfake: {:.3}",
                    step, generator_loss, discriminator_loss, real_score, fake_score
                ),
            }

            logging_tx
                .send(LoggingMessage::new_training_step(
                    name,
                    TrainingStepLog {
                        step,
                        generator_loss,
                        discriminator_loss,
                        real_score,
                        fake_score,
                    },
                ))
                .map_err(|_err| format_err!("cannot send message to logger"))?;
            last_output = Some(output);
        }

        // render samples
        if step % sample_interval.get() == 0 || is_last_step {
            final_grid = Some(render_samples(step)?);
        }

        // save checkpoint
        if let Some(steps) = save_checkpoint_steps {
            if (step > 0 && step % steps.get() == 0) || is_last_step {
                utils::save_checkpoint(
                    &model.generator_vs,
                    &checkpoint_dir,
                    "generator",
                    step,
                    f64::from(&generator_loss),
                )?;
                utils::save_checkpoint(
                    &model.discriminator_vs,
                    &checkpoint_dir,
                    "discriminator",
                    step,
                    f64::from(&discriminator_loss),
                )?;
            }
        }
    }

    // the last step always reports and renders
    let (output, final_grid) = last_output
        .zip(final_grid)
        .ok_or_else(|| format_err!("no training step was run"))?;
    let elapsed = start_time.elapsed();
    info!("finished {} steps in {:.2?}", max_steps, elapsed);

    let StepOutput {
        generator_loss,
        discriminator_loss,
        real_score,
        fake_score,
    } = output;

    Ok(TrainingSummary {
        kind,
        final_grid,
        generator_loss,
        discriminator_loss,
        real_score,
        fake_score,
        generator_parameters,
        discriminator_parameters,
        elapsed,
    })
}

fn build_optimizer(config: &OptimizerConfig, vs: &nn::VarStore) -> Result<nn::Optimizer> {
    let OptimizerConfig {
        lr,
        beta1,
        beta2,
        weight_decay,
    } = *config;
    let opt = nn::Adam {
        beta1: beta1.raw(),
        beta2: beta2.raw(),
        wd: weight_decay.raw(),
    }
    .build(vs, lr.raw())?;
    Ok(opt)
}

/// The tensors of one discriminator update.
struct DiscriminatorStep {
    loss: Tensor,
    real_logits: Tensor,
    fake_logits: Tensor,
}

/// The tensors of one generator update.
struct GeneratorStep {
    loss: Tensor,
    fake_logits: Tensor,
}

/// Update the discriminator on a real batch and an equally sized batch of detached fakes.
///
/// Real images are labeled `real_target`, fakes are labeled 0.
fn discriminator_step(
    model: &ModelPair,
    opt: &mut nn::Optimizer,
    bce: &BceWithLogitsLoss,
    real: &Tensor,
    real_target: f64,
) -> DiscriminatorStep {
    let batch_size = real.size()[0] as usize;
    let fake = tch::no_grad(|| model.generate(&model.sample_noise(batch_size), true));
    let real_logits = model.discriminator.forward_t(real, true);
    let fake_logits = model.discriminator.forward_t(&fake, true);
    let loss = (bce.forward_const(&real_logits, real_target)
        + bce.forward_const(&fake_logits, 0.0))
        / 2.0;
    opt.backward_step(&loss);

    DiscriminatorStep {
        loss,
        real_logits,
        fake_logits,
    }
}

/// Update the generator so that fresh fakes are labeled 1 by the discriminator.
fn generator_step(
    model: &ModelPair,
    opt: &mut nn::Optimizer,
    bce: &BceWithLogitsLoss,
    batch_size: usize,
) -> GeneratorStep {
    let fake = model.generate(&model.sample_noise(batch_size), true);
    let fake_logits = model.discriminator.forward_t(&fake, true);
    let loss = bce.forward_const(&fake_logits, 1.0);
    opt.backward_step(&loss);

    GeneratorStep { loss, fake_logits }
}
