use std::path::PathBuf;

use anyhow::{Context, Result};
use beaded_core::io::{brf, image_io};
use beaded_core::raster::Raster;
use beaded_core::render::draw::draw_mask;
use beaded_core::render::VisParams;
use beaded_core::threshold::threshold_below;
use clap::Args;

use super::{is_brf, load_raster, SensorArg};

#[derive(Args)]
pub struct ThresholdArgs {
    /// Single-band index `.brf` raster
    pub file: PathBuf,

    /// Take the threshold from this sensor's profile
    #[arg(long, value_enum, default_value = "sentinel2")]
    pub sensor: SensorArg,

    /// Explicit threshold; overrides --sensor
    #[arg(long, allow_hyphen_values = true)]
    pub threshold: Option<f32>,

    /// Output path (`.brf` keeps the 0/1 values, anything else renders PNG)
    #[arg(short, long, default_value = "mask.png")]
    pub output: PathBuf,
}

pub fn run(args: &ThresholdArgs) -> Result<()> {
    let index = load_raster(&args.file)?;
    let threshold = args
        .threshold
        .unwrap_or_else(|| args.sensor.profile().threshold);

    let mask = threshold_below(&index, threshold)?;
    let total = mask.data.len();
    let set = mask.count_set();

    let written = if is_brf(&args.output) {
        let as_float = Raster::single("mask", mask.data.mapv(f32::from), mask.transform);
        brf::write_raster(&args.output, &as_float, "mask", None)
    } else {
        let img = draw_mask(&mask, &VisParams::stretch(0.0, 1.0))?;
        image_io::save_png(&img, &args.output)
    };
    written.with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "{} of {} pixels below {} ({:.1}%)",
        set,
        total,
        threshold,
        100.0 * set as f64 / total.max(1) as f64
    );
    println!("Mask saved to {}", args.output.display());
    Ok(())
}
