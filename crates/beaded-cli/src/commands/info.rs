use std::path::PathBuf;

use anyhow::{Context, Result};
use beaded_core::io::brf::BrfReader;
use beaded_core::raster::is_valid;
use beaded_core::source::LocalCatalog;
use clap::Args;

#[derive(Args)]
pub struct InfoArgs {
    /// A `.brf` raster or a `catalog.toml` manifest
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    if args.file.extension().is_some_and(|e| e == "toml") {
        return catalog_info(args);
    }

    let reader = BrfReader::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let header = &reader.header;
    let t = header.transform;

    println!("File:        {}", args.file.display());
    if !header.description.is_empty() {
        println!("Description: {}", header.description);
    }
    println!("Dimensions:  {}x{}", header.width, header.height);
    println!("Origin:      ({}, {})", t.origin_x, t.origin_y);
    println!("Pixel size:  {} x {}", t.pixel_width, t.pixel_height);
    if let Some(scale) = header.export_scale {
        println!("Export scale: {}", scale);
    }
    println!("Bands:       {}", header.band_names.join(", "));

    for i in 0..reader.band_count() {
        let band = reader.read_band(i)?;
        let valid: Vec<f32> = band.data.iter().copied().filter(|&v| is_valid(v)).collect();
        let total = band.data.len();
        if valid.is_empty() {
            println!("  {:<8} no valid pixels", band.name);
            continue;
        }
        let min = valid.iter().copied().fold(f32::INFINITY, f32::min);
        let max = valid.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        println!(
            "  {:<8} min {:>10.4}  max {:>10.4}  valid {}/{}",
            band.name,
            min,
            max,
            valid.len(),
            total
        );
    }

    let data_mb = header.data_byte_size().unwrap_or(0) as f64 / (1024.0 * 1024.0);
    println!("Data size:   {:.1} MB", data_mb);

    Ok(())
}

fn catalog_info(args: &InfoArgs) -> Result<()> {
    let catalog = LocalCatalog::open(&args.file)
        .with_context(|| format!("Failed to open catalog {}", args.file.display()))?;
    let manifest = catalog.manifest();

    println!("Catalog:     {}", args.file.display());
    for collection in catalog.collections() {
        println!("{}", collection);
        for entry in manifest.image.iter().filter(|e| e.collection == collection) {
            let cloud = entry
                .properties
                .get("CLOUDY_PIXEL_PERCENTAGE")
                .map(|c| format!("  cloud {c:.1}%"))
                .unwrap_or_default();
            println!("  {:<24} {}{}", entry.id, entry.date, cloud);
        }
    }
    for entry in &manifest.elevation {
        println!("Elevation:   {} ({})", entry.id, entry.path.display());
    }
    Ok(())
}
