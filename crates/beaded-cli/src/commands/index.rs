use std::path::PathBuf;

use anyhow::{Context, Result};
use beaded_core::index::mndwi;
use beaded_core::io::{brf, image_io};
use beaded_core::render::draw::draw_raster;
use clap::Args;
use tracing::info;

use super::{load_raster, SensorArg};

#[derive(Args)]
pub struct IndexArgs {
    /// Input multi-band `.brf` raster
    pub file: PathBuf,

    /// Sensor band mapping
    #[arg(long, value_enum, default_value = "sentinel2")]
    pub sensor: SensorArg,

    /// Override the green band name
    #[arg(long)]
    pub green: Option<String>,

    /// Override the contrasting (SWIR/NIR) band name
    #[arg(long)]
    pub other: Option<String>,

    /// Also render the index as a grayscale PNG
    #[arg(long)]
    pub png: Option<PathBuf>,

    /// Output `.brf` path
    #[arg(short, long, default_value = "mndwi.brf")]
    pub output: PathBuf,
}

pub fn run(args: &IndexArgs) -> Result<()> {
    let raster = load_raster(&args.file)?;
    let mut sensor = args.sensor.profile();
    if let Some(ref green) = args.green {
        sensor.green_band = green.clone();
    }
    if let Some(ref other) = args.other {
        sensor.other_band = other.clone();
    }
    sensor.validate()?;

    let index = mndwi(&raster, &sensor)?;
    brf::write_raster(&args.output, &index, "MNDWI", None)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!(output = %args.output.display(), "Wrote MNDWI");
    println!(
        "MNDWI ({} - {}) / ({} + {}) saved to {}",
        sensor.green_band,
        sensor.other_band,
        sensor.green_band,
        sensor.other_band,
        args.output.display()
    );

    if let Some(ref png) = args.png {
        let img = draw_raster(&index, &sensor.index_display)?;
        image_io::save_png(&img, png)
            .with_context(|| format!("Failed to write {}", png.display()))?;
        println!("Preview saved to {}", png.display());
    }

    Ok(())
}
