use std::path::{Path, PathBuf};

use image::ImageFormat;
use tracing::{debug, info};

use crate::error::Result;

use super::draw::draw_layer;
use super::layers::{LayerSource, MapComposition};

/// Consumes a [`MapComposition`]. Swappable presentation layer.
pub trait Presenter {
    fn present(&self, composition: &MapComposition) -> Result<()>;
}

/// Logs every layer request and draws nothing.
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    fn present(&self, composition: &MapComposition) -> Result<()> {
        if let Some(center) = composition.center {
            info!(%center, "Map centre");
        }
        for layer in &composition.layers {
            info!(
                label = %layer.label,
                kind = layer.source.kind(),
                vis = %layer.vis,
                visible = layer.visible,
                "Layer"
            );
        }
        Ok(())
    }
}

/// Writes each visible layer to `<dir>/<NN>_<slug>.png`.
pub struct PngPresenter {
    dir: PathBuf,
}

impl PngPresenter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a layer at `position` is written to.
    pub fn layer_path(&self, position: usize, label: &str) -> PathBuf {
        self.dir.join(format!("{:02}_{}.png", position, slug(label)))
    }
}

impl Presenter for PngPresenter {
    fn present(&self, composition: &MapComposition) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        for (i, layer) in composition.layers.iter().enumerate() {
            if !layer.visible {
                continue;
            }
            if let LayerSource::Region(ref region) = layer.source {
                debug!(label = %layer.label, vertices = region.vertices().len(), "Skipping outline layer");
                continue;
            }
            if let Some(img) = draw_layer(layer)? {
                let path = self.layer_path(i, &layer.label);
                img.save_with_format(&path, ImageFormat::Png)?;
                info!(label = %layer.label, path = %path.display(), "Wrote layer");
            }
        }
        Ok(())
    }
}

/// Lower-case alphanumerics, everything else collapsed to `_`.
pub fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Sentinel MNDWI kmeans"), "sentinel_mndwi_kmeans");
        assert_eq!(slug("planet collection CIR"), "planet_collection_cir");
        assert_eq!(slug("  Threshold_Planet!"), "threshold_planet");
    }
}
