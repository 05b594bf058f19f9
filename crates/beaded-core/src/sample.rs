//! Bounded random pixel sampling for clusterer training.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::DEFAULT_MAX_SAMPLES;
use crate::error::{BeadedError, Result};
use crate::raster::{is_valid, Raster};
use crate::region::Region;

/// Sampling parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleParams {
    /// Ground distance between sampled pixels. Values coarser than the
    /// raster's own scale decimate the grid; finer values sample every pixel.
    pub scale: f64,
    /// Upper bound on returned records. Zero yields an empty set.
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
    /// Fixed seed for reproducible draws; entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_max_samples() -> usize {
    DEFAULT_MAX_SAMPLES
}

impl SampleParams {
    pub fn new(scale: f64, max_samples: usize) -> Self {
        Self {
            scale,
            max_samples,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// One sampled pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleRecord {
    pub row: usize,
    pub col: usize,
    /// Pixel-centre coordinates.
    pub x: f64,
    pub y: f64,
    /// Values for every band of the source raster, in band order.
    pub values: Vec<f32>,
}

/// Unordered collection of sampled pixels.
#[derive(Clone, Debug, Default)]
pub struct SampleSet {
    pub band_names: Vec<String>,
    pub records: Vec<SampleRecord>,
}

impl SampleSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.band_names.len()
    }
}

pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Draw up to `params.max_samples` pixels from `raster`.
///
/// Only pixels whose centre falls inside `region` (when given) and whose band
/// values are all valid are eligible. When fewer pixels are eligible than
/// requested, all of them are returned.
pub fn sample(raster: &Raster, region: Option<&Region>, params: &SampleParams) -> Result<SampleSet> {
    if !params.scale.is_finite() || params.scale <= 0.0 {
        return Err(BeadedError::invalid_parameter(
            "scale",
            params.scale,
            "must be a positive distance",
        ));
    }

    let band_names: Vec<String> = raster.band_names().iter().map(|s| s.to_string()).collect();
    if params.max_samples == 0 {
        return Ok(SampleSet {
            band_names,
            records: Vec::new(),
        });
    }

    let stride = sampling_stride(params.scale, raster.scale());
    let transform = raster.transform();
    let (rows, cols) = raster.shape();

    let mut eligible: Vec<(usize, usize)> = Vec::new();
    for row in (0..rows).step_by(stride) {
        for col in (0..cols).step_by(stride) {
            if let Some(region) = region {
                let (x, y) = transform.pixel_to_geo(col, row);
                if !region.contains(x, y) {
                    continue;
                }
            }
            if raster.bands().iter().all(|b| is_valid(b.data[[row, col]])) {
                eligible.push((row, col));
            }
        }
    }

    let amount = params.max_samples.min(eligible.len());
    let mut rng = make_rng(params.seed);
    let mut picked: Vec<usize> = rand::seq::index::sample(&mut rng, eligible.len(), amount).into_vec();
    picked.sort_unstable();

    let records: Vec<SampleRecord> = picked
        .into_iter()
        .map(|i| {
            let (row, col) = eligible[i];
            let (x, y) = transform.pixel_to_geo(col, row);
            SampleRecord {
                row,
                col,
                x,
                y,
                values: raster.pixel_values(row, col),
            }
        })
        .collect();

    debug!(
        stride,
        eligible = eligible.len(),
        sampled = records.len(),
        "Sampled pixels"
    );

    Ok(SampleSet {
        band_names,
        records,
    })
}

/// Grid step for sampling at `scale` from a raster of `native` resolution.
fn sampling_stride(scale: f64, native: f64) -> usize {
    if native <= 0.0 || !native.is_finite() {
        return 1;
    }
    ((scale / native).round() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride() {
        assert_eq!(sampling_stride(3.0, 3.0), 1);
        assert_eq!(sampling_stride(10.0, 3.0), 3);
        assert_eq!(sampling_stride(1.0, 3.0), 1);
        assert_eq!(sampling_stride(10.0, 0.0), 1);
    }
}
