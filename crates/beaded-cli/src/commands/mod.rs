pub mod cluster;
pub mod config;
pub mod index;
pub mod info;
pub mod pipeline;
pub mod threshold;

use std::path::Path;

use anyhow::{Context, Result};
use beaded_core::io::brf;
use beaded_core::raster::Raster;
use beaded_core::region::Region;
use beaded_core::sensor::SensorProfile;
use clap::ValueEnum;

#[derive(Clone, Copy, ValueEnum)]
pub enum SensorArg {
    Planet,
    Sentinel2,
}

impl SensorArg {
    pub fn profile(self) -> SensorProfile {
        match self {
            Self::Planet => SensorProfile::planet(),
            Self::Sentinel2 => SensorProfile::sentinel2(),
        }
    }
}

pub(crate) fn load_raster(path: &Path) -> Result<Raster> {
    brf::read_raster(path).with_context(|| format!("Failed to read raster {}", path.display()))
}

/// Parse a flat `lon,lat,lon,lat,...` list; empty means no region.
pub(crate) fn parse_region(coords: &[f64]) -> Result<Option<Region>> {
    if coords.is_empty() {
        return Ok(None);
    }
    Ok(Some(Region::from_flat(coords).context("Invalid --region")?))
}

pub(crate) fn is_brf(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "brf")
}
