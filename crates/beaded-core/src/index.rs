//! Band-ratio water index.

use ndarray::{Array2, Axis, Zip};
use rayon::prelude::*;
use tracing::debug;

use crate::consts::{EPSILON, MNDWI_BAND, NO_DATA, PARALLEL_PIXEL_THRESHOLD};
use crate::error::Result;
use crate::raster::{is_valid, Raster};
use crate::sensor::SensorProfile;
use crate::source::ImageCollection;

/// `(a - b) / (a + b)` for one pixel, or `NO_DATA` when undefined.
///
/// Inputs of mixed sign (negative surface reflectance) can push the ratio
/// past the unit interval; the result is clamped to `[-1, 1]`.
#[inline]
pub fn normalized_difference_value(a: f32, b: f32) -> f32 {
    if !is_valid(a) || !is_valid(b) {
        return NO_DATA;
    }
    let sum = a + b;
    if sum.abs() < EPSILON {
        return NO_DATA;
    }
    ((a - b) / sum).clamp(-1.0, 1.0)
}

/// Normalized difference of two named bands, as a single-band raster named
/// after the first band pair (`"<a>_<b>_ND"`).
///
/// Pixels where both bands sum to zero, or either is no-data, become
/// [`NO_DATA`]; they never abort the computation.
pub fn normalized_difference(raster: &Raster, band_a: &str, band_b: &str) -> Result<Raster> {
    let a = raster.band(band_a)?;
    let b = raster.band(band_b)?;
    let data = normalized_difference_array(a, b);
    Ok(Raster::single(
        format!("{band_a}_{band_b}_ND"),
        data,
        *raster.transform(),
    ))
}

fn normalized_difference_array(a: &Array2<f32>, b: &Array2<f32>) -> Array2<f32> {
    let (h, w) = a.dim();
    let mut out = Array2::<f32>::zeros((h, w));

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        let rows: Vec<Vec<f32>> = (0..h)
            .into_par_iter()
            .map(|row| {
                (0..w)
                    .map(|col| normalized_difference_value(a[[row, col]], b[[row, col]]))
                    .collect()
            })
            .collect();
        for (mut out_row, values) in out.axis_iter_mut(Axis(0)).zip(rows) {
            for (o, v) in out_row.iter_mut().zip(values) {
                *o = v;
            }
        }
    } else {
        Zip::from(&mut out)
            .and(a)
            .and(b)
            .for_each(|o, &x, &y| *o = normalized_difference_value(x, y));
    }
    out
}

/// MNDWI using the sensor's green and water-discriminating bands.
///
/// The output band is named `MNDWI`.
pub fn mndwi(raster: &Raster, sensor: &SensorProfile) -> Result<Raster> {
    let nd = normalized_difference(raster, &sensor.green_band, &sensor.other_band)?;
    let out = nd.rename(&[MNDWI_BAND])?;
    let undefined = out
        .first_band()
        .data
        .iter()
        .filter(|&&v| v == NO_DATA)
        .count();
    debug!(
        sensor = %sensor.name,
        green = %sensor.green_band,
        other = %sensor.other_band,
        no_data = undefined,
        "Computed MNDWI"
    );
    Ok(out)
}

/// Replace every image of a collection with its MNDWI band.
pub fn mndwi_collection(
    collection: &ImageCollection,
    sensor: &SensorProfile,
) -> Result<ImageCollection> {
    collection.map(|raster| mndwi(raster, sensor))
}
