use anyhow::{ensure, Result};
use bbox::CropMode;
use clap::{ArgEnum, Args, Parser};
use dog_gan::{
    annotation::AnnotationRecord,
    dataset::{AnnotationIndex, IndexRow},
    processor::ImagePreprocessor,
    utils::{make_grid, save_image},
};
use log::{info, warn};
use prettytable::{cell, row, Table};
use std::{
    env,
    path::{Path, PathBuf},
};
use tch::Tensor;

#[derive(Debug, Clone, Parser)]
/// Dataset utilities for dog-gan
enum Opts {
    /// Save the annotation index as a CSV file
    Index {
        #[clap(flatten)]
        dataset: DatasetArgs,
        /// output CSV file
        output_file: PathBuf,
    },
    /// Print class counts and image size statistics
    Stats {
        #[clap(flatten)]
        dataset: DatasetArgs,
    },
    /// Preprocess leading records and save them as a grid image
    Preview {
        #[clap(flatten)]
        dataset: DatasetArgs,
        /// output image file
        output_file: PathBuf,
        #[clap(long, default_value = "128")]
        image_size: usize,
        #[clap(long, arg_enum, default_value = "top-left")]
        crop_mode: CropModeArg,
        #[clap(long, default_value = "4")]
        rows: usize,
        #[clap(long, default_value = "4")]
        cols: usize,
    },
}

#[derive(Debug, Clone, Args)]
struct DatasetArgs {
    /// annotation directory
    #[clap(long)]
    annotation_dir: PathBuf,
    /// image directory
    #[clap(long)]
    image_dir: PathBuf,
    #[clap(long, default_value = "jpg")]
    image_extension: String,
}

#[derive(Debug, Clone, Copy, ArgEnum)]
enum CropModeArg {
    TopLeft,
    Center,
}

impl From<CropModeArg> for CropMode {
    fn from(from: CropModeArg) -> Self {
        match from {
            CropModeArg::TopLeft => Self::TopLeft,
            CropModeArg::Center => Self::Center,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Index {
            dataset,
            output_file,
        } => {
            let index = load_index(&dataset).await?;
            index.write_csv(&output_file)?;
            info!(
                "saved {} records to '{}'",
                index.len(),
                output_file.display()
            );
        }
        Opts::Stats { dataset } => {
            let index = load_index(&dataset).await?;
            stats(&index);
        }
        Opts::Preview {
            dataset,
            output_file,
            image_size,
            crop_mode,
            rows,
            cols,
        } => {
            let index = load_index(&dataset).await?;
            let preprocessor = ImagePreprocessor::new(image_size, crop_mode.into())?;
            preview(&index, &preprocessor, rows, cols, &output_file)?;
        }
    }

    Ok(())
}

async fn load_index(args: &DatasetArgs) -> Result<AnnotationIndex> {
    let DatasetArgs {
        annotation_dir,
        image_dir,
        image_extension,
    } = args;
    AnnotationIndex::load(annotation_dir, image_dir, image_extension).await
}

fn stats(index: &AnnotationIndex) {
    // print class counts
    {
        let mut table = Table::new();
        table.add_row(row!["class", "records"]);
        index.class_counts().iter().for_each(|(class, count)| {
            table.add_row(row![class, count]);
        });
        table.add_row(row!["total", index.len()]);
        table.printstd();
    }

    // print image sizes
    match index.size_summary() {
        Some(summary) => {
            let mut table = Table::new();
            table.add_row(row!["", "min", "max", "mean"]);
            table.add_row(row![
                "width",
                summary.min_width,
                summary.max_width,
                format!("{:.1}", summary.mean_width)
            ]);
            table.add_row(row![
                "height",
                summary.min_height,
                summary.max_height,
                format!("{:.1}", summary.mean_height)
            ]);
            println!("{} images", summary.num_images);
            table.printstd();
        }
        None => println!("no images"),
    }
}

fn preview(
    index: &AnnotationIndex,
    preprocessor: &ImagePreprocessor,
    rows: usize,
    cols: usize,
    output_file: &Path,
) -> Result<()> {
    let num_images = rows * cols;
    ensure!(num_images > 0, "rows and cols must be positive");

    let images: Vec<Tensor> = index
        .rows()
        .iter()
        .filter_map(|row| {
            let IndexRow {
                record, image_path, ..
            } = row;
            let AnnotationRecord { label, .. } = record;

            match preprocessor.process(image_path, record) {
                Ok(image) => Some(image),
                Err(err) => {
                    warn!("skip '{}' ({}): {:#}", image_path.display(), label, err);
                    None
                }
            }
        })
        .take(num_images)
        .collect();
    ensure!(
        images.len() == num_images,
        "expect {} images, but only {} can be loaded",
        num_images,
        images.len()
    );

    let grid = make_grid(&Tensor::stack(&images, 0), rows, cols)?;
    save_image(&grid, output_file)?;
    info!("saved preview to '{}'", output_file.display());
    Ok(())
}
