//! Layer-to-pixels rasterisation.

use image::{Rgb as ImageRgb, RgbImage};

use crate::error::{BeadedError, Result};
use crate::raster::{is_valid, LabelRaster, MaskRaster, Raster};

use super::layers::{LayerRequest, LayerSource};
use super::palette::{label_color, Rgb};
use super::vis::{ResolvedVis, VisParams};

/// Render a layer to an 8-bit RGB image. Region layers have no pixel grid
/// and yield `None`.
pub fn draw_layer(layer: &LayerRequest) -> Result<Option<RgbImage>> {
    match layer.source {
        LayerSource::Raster(ref r) => draw_raster(r, &layer.vis).map(Some),
        LayerSource::Mask(ref m) => draw_mask(m, &layer.vis).map(Some),
        LayerSource::Labels(ref l) => Ok(Some(draw_labels(l))),
        LayerSource::Region(_) => Ok(None),
    }
}

/// Stretch, gamma and (optionally) palette, per [`VisParams`].
/// No-data pixels are black.
pub fn draw_raster(raster: &Raster, vis: &VisParams) -> Result<RgbImage> {
    let resolved = vis.resolve(&raster.band_names())?;
    let bands = resolved
        .bands
        .iter()
        .map(|name| raster.band(name))
        .collect::<Result<Vec<_>>>()?;
    let (h, w) = raster.shape();
    let mut img = new_image(h, w)?;

    for row in 0..h {
        for col in 0..w {
            let values: Vec<f32> = bands.iter().map(|b| b[[row, col]]).collect();
            let c = shade(&resolved, &values);
            img.put_pixel(col as u32, row as u32, ImageRgb([c.r, c.g, c.b]));
        }
    }
    Ok(img)
}

fn shade(vis: &ResolvedVis, values: &[f32]) -> Rgb {
    if values.iter().any(|&v| !is_valid(v)) {
        return Rgb::BLACK;
    }
    match (values.len(), vis.palette.as_ref()) {
        (1, Some(p)) => p.evaluate(vis.normalize(0, values[0])),
        (1, None) => {
            let g = to_byte(vis.normalize(0, values[0]));
            Rgb::new(g, g, g)
        }
        _ => Rgb::new(
            to_byte(vis.normalize(0, values[0])),
            to_byte(vis.normalize(1, values[1])),
            to_byte(vis.normalize(2, values[2])),
        ),
    }
}

fn to_byte(t: f32) -> u8 {
    (t.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn draw_mask(mask: &MaskRaster, vis: &VisParams) -> Result<RgbImage> {
    let as_float = Raster::single("mask", mask.data.mapv(f32::from), mask.transform);
    draw_raster(&as_float, vis)
}

/// One stable random color per cluster; invalid pixels are black.
pub fn draw_labels(labels: &LabelRaster) -> RgbImage {
    let (h, w) = labels.shape();
    let mut img = RgbImage::new(w as u32, h as u32);
    for ((row, col), &label) in labels.labels.indexed_iter() {
        let c = if labels.valid[[row, col]] {
            label_color(label)
        } else {
            Rgb::BLACK
        };
        img.put_pixel(col as u32, row as u32, ImageRgb([c.r, c.g, c.b]));
    }
    img
}

fn new_image(h: usize, w: usize) -> Result<RgbImage> {
    if h == 0 || w == 0 || h > u32::MAX as usize || w > u32::MAX as usize {
        return Err(BeadedError::invalid_parameter(
            "shape",
            format!("{h}x{w}"),
            "cannot render an empty or oversized raster",
        ));
    }
    Ok(RgbImage::new(w as u32, h as u32))
}
