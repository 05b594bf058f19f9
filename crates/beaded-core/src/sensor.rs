use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{PLANET_SCALE, PLANET_THRESHOLD, SENTINEL2_SCALE, SENTINEL2_THRESHOLD};
use crate::error::{BeadedError, Result};
use crate::render::VisParams;

/// Per-sensor band mapping, water threshold and display settings.
///
/// Band semantics differ between sensors: Sentinel-2 uses `B3` as green,
/// while the 4-band commercial product has green in `B2` and no SWIR, so
/// its near-infrared `B4` stands in as the water-discriminating band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorProfile {
    /// Short name used in layer labels and logs.
    pub name: String,
    pub green_band: String,
    /// Band contrasted against green (SWIR, or NIR where SWIR is absent).
    pub other_band: String,
    /// Pixels with MNDWI strictly below this are flagged.
    pub threshold: f32,
    /// Sampling scale in ground units per pixel.
    pub scale: f64,
    /// Display parameters for the source imagery.
    #[serde(default)]
    pub display: VisParams,
    /// Display parameters for the MNDWI layer.
    #[serde(default = "default_index_display")]
    pub index_display: VisParams,
}

fn default_index_display() -> VisParams {
    VisParams::stretch(-1.0, 1.0).with_palette(&["000000", "FFFFFF"])
}

impl SensorProfile {
    /// 4-band 3 m commercial imagery (blue, green, red, NIR as B1..B4).
    pub fn planet() -> Self {
        Self {
            name: "Planet".into(),
            green_band: "B2".into(),
            other_band: "B4".into(),
            threshold: PLANET_THRESHOLD,
            scale: PLANET_SCALE,
            display: VisParams::rgb(["B4", "B3", "B2"], 0.0, 3000.0),
            index_display: default_index_display(),
        }
    }

    /// Sentinel-2 surface reflectance.
    pub fn sentinel2() -> Self {
        Self {
            name: "Sentinel".into(),
            green_band: "B3".into(),
            other_band: "B8".into(),
            threshold: SENTINEL2_THRESHOLD,
            scale: SENTINEL2_SCALE,
            display: VisParams::rgb(["B8", "B4", "B3"], 0.0, 5000.0)
                .with_gamma(vec![0.95, 1.1, 1.0]),
            index_display: default_index_display(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.green_band == self.other_band {
            return Err(BeadedError::invalid_parameter(
                "other_band",
                &self.other_band,
                "must differ from green_band",
            ));
        }
        if !self.threshold.is_finite() {
            return Err(BeadedError::invalid_parameter(
                "threshold",
                self.threshold,
                "must be finite",
            ));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(BeadedError::invalid_parameter(
                "scale",
                self.scale,
                "must be a positive distance",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for SensorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (green {}, other {}, threshold {}, scale {})",
            self.name, self.green_band, self.other_band, self.threshold, self.scale
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_valid() {
        SensorProfile::planet().validate().unwrap();
        SensorProfile::sentinel2().validate().unwrap();
    }

    #[test]
    fn test_same_bands_rejected() {
        let mut s = SensorProfile::planet();
        s.other_band = s.green_band.clone();
        assert!(s.validate().is_err());
    }
}
