use tracing::debug;

use crate::error::{BeadedError, Result};
use crate::raster::{is_valid, MaskRaster, Raster};

/// Binary mask of pixels strictly below `threshold`.
///
/// `mask = 1` iff `value < threshold`; equality yields 0, and no-data pixels
/// are always 0. The input must be a single-band index raster.
pub fn threshold_below(index: &Raster, threshold: f32) -> Result<MaskRaster> {
    if !threshold.is_finite() {
        return Err(BeadedError::invalid_parameter(
            "threshold",
            threshold,
            "must be finite",
        ));
    }
    if index.band_count() != 1 {
        return Err(BeadedError::invalid_parameter(
            "index",
            format!("{:?}", index.band_names()),
            "thresholding expects a single-band index raster",
        ));
    }

    let data = index
        .first_band()
        .data
        .mapv(|v| u8::from(is_valid(v) && v < threshold));
    let mask = MaskRaster {
        data,
        transform: *index.transform(),
    };
    debug!(threshold, set = mask.count_set(), "Thresholded index");
    Ok(mask)
}
