//! Data logging toolkit.

use crate::{
    common::*,
    config::{Config, LoggingConfig},
};
use async_std::{fs::File, io::BufWriter};

pub use logging_message::*;
pub use logging_worker::*;

mod logging_worker {
    use super::*;

    /// The data logging worker.
    #[derive(Debug)]
    pub struct LoggingWorker {
        config: Arc<Config>,
        event_writer: EventAsyncWriter<BufWriter<File>>,
        rx: broadcast::Receiver<LoggingMessage>,
    }

    impl LoggingWorker {
        /// Create a data logging worker.
        async fn new(
            config: Arc<Config>,
            logging_dir: Arc<Path>,
            rx: broadcast::Receiver<LoggingMessage>,
        ) -> Result<Self> {
            // prepare dirs
            let event_dir = logging_dir.join("events");
            let event_path_prefix = event_dir
                .join("dog-gan")
                .into_os_string()
                .into_string()
                .map_err(|path| format_err!("non-UTF-8 path {:?}", path))?;

            tokio::fs::create_dir_all(&event_dir).await?;

            let event_writer =
                EventAsyncWriter::from_prefix(event_path_prefix, "", EventWriterConfig::default())
                    .await?;

            Ok(Self {
                config,
                event_writer,
                rx,
            })
        }

        /// Start the data logging worker.
        ///
        /// It stops when all senders are dropped.
        async fn start(mut self) -> Result<()> {
            loop {
                let LoggingMessage { tag, kind } = match self.rx.recv().await {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        warn!("logging worker dropped {} messages", count);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };

                match kind {
                    LoggingMessageKind::TrainingStep(msg) => {
                        self.log_training_step(&tag, msg).await?;
                    }
                    LoggingMessageKind::Image(msg) => {
                        self.log_image(&tag, msg).await?;
                    }
                }
            }

            Ok(())
        }

        async fn log_training_step(&mut self, tag: &str, msg: TrainingStepLog) -> Result<()> {
            let TrainingStepLog {
                step,
                generator_loss,
                discriminator_loss,
                real_score,
                fake_score,
            } = msg;
            let step = step as i64;

            // log losses
            self.event_writer
                .write_scalar(
                    format!("{}/loss/generator", tag),
                    step,
                    generator_loss as f32,
                )
                .await?;
            self.event_writer
                .write_scalar(
                    format!("{}/loss/discriminator", tag),
                    step,
                    discriminator_loss as f32,
                )
                .await?;

            // log discriminator scores
            self.event_writer
                .write_scalar(format!("{}/score/real", tag), step, real_score as f32)
                .await?;
            self.event_writer
                .write_scalar(format!("{}/score/fake", tag), step, fake_score as f32)
                .await?;

            Ok(())
        }

        async fn log_image(&mut self, tag: &str, msg: ImageLog) -> Result<()> {
            let Config {
                logging: LoggingConfig { enable_images, .. },
                ..
            } = *self.config;

            if enable_images {
                let ImageLog { step, image } = msg;
                let image = TchTensorAsImage::new(ColorSpace::Rgb, TchChannelOrder::CHW, image)?;
                self.event_writer
                    .write_image(format!("{}/image/samples", tag), step as i64, image)
                    .await?;
            }

            Ok(())
        }
    }

    pub async fn logging_worker(
        config: Arc<Config>,
        logging_dir: Arc<Path>,
        rx: broadcast::Receiver<LoggingMessage>,
    ) -> Result<impl Future<Output = Result<()>> + Send> {
        let worker = LoggingWorker::new(config, logging_dir, rx).await?;
        Ok(tokio::task::spawn(worker.start()).map(|result| Fallible::Ok(result??)))
    }
}

mod logging_message {
    use super::*;

    /// The message type that is accepted by the logging worker.
    #[derive(Debug, TensorLike, Clone)]
    pub struct LoggingMessage {
        #[tensor_like(clone)]
        pub tag: Cow<'static, str>,
        pub kind: LoggingMessageKind,
    }

    impl LoggingMessage {
        pub fn new_training_step<S>(tag: S, msg: TrainingStepLog) -> Self
        where
            S: Into<Cow<'static, str>>,
        {
            Self {
                tag: tag.into(),
                kind: LoggingMessageKind::TrainingStep(msg),
            }
        }

        /// Create a message carrying a `[3, h, w]` image with values in `[0, 1]`.
        pub fn new_image<S>(tag: S, step: usize, image: &Tensor) -> Self
        where
            S: Into<Cow<'static, str>>,
        {
            Self {
                tag: tag.into(),
                kind: LoggingMessageKind::Image(ImageLog {
                    step,
                    image: image.detach().to_device(Device::Cpu),
                }),
            }
        }
    }

    #[derive(Debug, TensorLike)]
    pub enum LoggingMessageKind {
        TrainingStep(TrainingStepLog),
        Image(ImageLog),
    }

    impl Clone for LoggingMessageKind {
        fn clone(&self) -> Self {
            self.shallow_clone()
        }
    }

    #[derive(Debug, TensorLike)]
    pub struct TrainingStepLog {
        pub step: usize,
        #[tensor_like(clone)]
        pub generator_loss: f64,
        #[tensor_like(clone)]
        pub discriminator_loss: f64,
        /// Mean discriminator probability on real images.
        #[tensor_like(clone)]
        pub real_score: f64,
        /// Mean discriminator probability on generated images.
        #[tensor_like(clone)]
        pub fake_score: f64,
    }

    impl Clone for TrainingStepLog {
        fn clone(&self) -> Self {
            self.shallow_clone()
        }
    }

    #[derive(Debug, TensorLike)]
    pub struct ImageLog {
        pub step: usize,
        pub image: Tensor,
    }

    impl Clone for ImageLog {
        fn clone(&self) -> Self {
            self.shallow_clone()
        }
    }
}
