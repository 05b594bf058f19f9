use geo::{coord, Rect};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::NO_DATA;
use crate::error::{BeadedError, ConfigurationError, Result};

/// Affine placement of a north-up raster.
///
/// ```text
/// x = origin_x + col * pixel_width
/// y = origin_y + row * pixel_height
/// ```
///
/// `pixel_height` is usually negative (rows run southwards).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner.
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner.
    pub origin_y: f64,
    /// Cell size along X.
    pub pixel_width: f64,
    /// Cell size along Y, negative for north-up images.
    pub pixel_height: f64,
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// Square-pixel, north-up transform.
    pub fn square(origin_x: f64, origin_y: f64, pixel_size: f64) -> Self {
        Self::new(origin_x, origin_y, pixel_size, -pixel_size)
    }

    /// Geographic coordinates of the centre of pixel (col, row).
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        let x = self.origin_x + (col as f64 + 0.5) * self.pixel_width;
        let y = self.origin_y + (row as f64 + 0.5) * self.pixel_height;
        (x, y)
    }

    /// Fractional (col, row) of a geographic coordinate.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin_x) / self.pixel_width,
            (y - self.origin_y) / self.pixel_height,
        )
    }

    /// Ground distance per pixel (assumes square pixels).
    pub fn scale(&self) -> f64 {
        self.pixel_width.abs()
    }

    /// Bounding rectangle covered by a grid of the given shape.
    pub fn footprint(&self, rows: usize, cols: usize) -> Rect<f64> {
        let x1 = self.origin_x + cols as f64 * self.pixel_width;
        let y1 = self.origin_y + rows as f64 * self.pixel_height;
        Rect::new(
            coord! { x: self.origin_x, y: self.origin_y },
            coord! { x: x1, y: y1 },
        )
    }
}

/// Whether a band value carries data.
pub fn is_valid(v: f32) -> bool {
    v.is_finite() && v != NO_DATA
}

/// A single named spectral channel.
#[derive(Clone, Debug)]
pub struct Band {
    pub name: String,
    /// Values, row-major, shape = (rows, cols).
    pub data: Array2<f32>,
}

impl Band {
    pub fn new(name: impl Into<String>, data: Array2<f32>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// A gridded multi-band image. Every band has the same shape.
///
/// Operations never mutate a raster; they return a new one.
#[derive(Clone, Debug)]
pub struct Raster {
    bands: Vec<Band>,
    transform: GeoTransform,
}

impl Raster {
    /// Build a raster, checking that bands agree in shape and have unique names.
    pub fn new(bands: Vec<Band>, transform: GeoTransform) -> Result<Self> {
        let Some(first) = bands.first() else {
            return Err(BeadedError::invalid_parameter(
                "bands",
                0,
                "a raster needs at least one band",
            ));
        };
        let (rows, cols) = first.data.dim();
        for (i, band) in bands.iter().enumerate() {
            let (r, c) = band.data.dim();
            if (r, c) != (rows, cols) {
                return Err(BeadedError::DimensionMismatch {
                    expected_rows: rows,
                    expected_cols: cols,
                    rows: r,
                    cols: c,
                });
            }
            if bands[..i].iter().any(|b| b.name == band.name) {
                return Err(BeadedError::invalid_parameter(
                    "bands",
                    &band.name,
                    "duplicate band name",
                ));
            }
        }
        Ok(Self { bands, transform })
    }

    /// Single-band raster.
    pub fn single(name: impl Into<String>, data: Array2<f32>, transform: GeoTransform) -> Self {
        Self {
            bands: vec![Band::new(name, data)],
            transform,
        }
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn band_names(&self) -> Vec<&str> {
        self.bands.iter().map(|b| b.name.as_str()).collect()
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn first_band(&self) -> &Band {
        &self.bands[0]
    }

    /// Look up a band by name.
    pub fn band(&self, name: &str) -> Result<&Array2<f32>> {
        self.bands
            .iter()
            .find(|b| b.name == name)
            .map(|b| &b.data)
            .ok_or_else(|| self.missing(name))
    }

    fn missing(&self, name: &str) -> BeadedError {
        ConfigurationError::MissingBand {
            name: name.to_string(),
            available: self.bands.iter().map(|b| b.name.clone()).collect(),
        }
        .into()
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale()
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.bands[0].data.dim()
    }

    /// New raster holding only the named bands, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Raster> {
        let bands = names
            .iter()
            .map(|n| {
                let name = n.as_ref();
                self.band(name).map(|data| Band::new(name, data.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        Raster::new(bands, self.transform)
    }

    /// New raster with bands renamed positionally.
    pub fn rename<S: AsRef<str>>(&self, names: &[S]) -> Result<Raster> {
        if names.len() != self.bands.len() {
            return Err(BeadedError::invalid_parameter(
                "names",
                names.len(),
                format!("expected {} band names", self.bands.len()),
            ));
        }
        let bands = self
            .bands
            .iter()
            .zip(names)
            .map(|(b, n)| Band::new(n.as_ref(), b.data.clone()))
            .collect();
        Raster::new(bands, self.transform)
    }

    /// All band values at one pixel, in band order.
    pub fn pixel_values(&self, row: usize, col: usize) -> Vec<f32> {
        self.bands.iter().map(|b| b.data[[row, col]]).collect()
    }
}

/// Binary water / non-water raster (1 = below threshold).
#[derive(Clone, Debug)]
pub struct MaskRaster {
    pub data: Array2<u8>,
    pub transform: GeoTransform,
}

impl MaskRaster {
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Number of pixels set to 1.
    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&v| v == 1).count()
    }
}

/// Per-pixel cluster assignment produced by a fitted model.
#[derive(Clone, Debug)]
pub struct LabelRaster {
    /// Cluster id in `0..k` for every pixel.
    pub labels: Array2<u32>,
    /// False where at least one input feature was no-data.
    pub valid: Array2<bool>,
    pub k: usize,
    pub transform: GeoTransform,
}

impl LabelRaster {
    pub fn shape(&self) -> (usize, usize) {
        self.labels.dim()
    }

    /// Pixel count per cluster, valid pixels only.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.k];
        for (&label, &ok) in self.labels.iter().zip(self.valid.iter()) {
            if ok {
                counts[label as usize] += 1;
            }
        }
        counts
    }
}
