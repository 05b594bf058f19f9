//! Directory-backed image repository described by a `catalog.toml` manifest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BeadedError, Result};
use crate::io::{brf, image_io};
use crate::raster::{Band, GeoTransform, Raster};

use super::{CollectionFilter, ElevationSource, Image, ImageCollection, ImageRepository};

fn default_pixel_size() -> f64 {
    1.0
}

fn default_elevation_band() -> String {
    "elevation".into()
}

/// One `[[image]]` entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageEntry {
    pub id: String,
    pub collection: String,
    pub date: NaiveDate,
    /// A `.brf` file holding every band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Band name to grayscale image file.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bands: BTreeMap<String, PathBuf>,
    #[serde(default)]
    pub properties: BTreeMap<String, f64>,
    /// Placement for band-file images; `.brf` files carry their own.
    #[serde(default)]
    pub origin_x: f64,
    #[serde(default)]
    pub origin_y: f64,
    #[serde(default = "default_pixel_size")]
    pub pixel_size: f64,
}

/// One `[[elevation]]` entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElevationEntry {
    pub id: String,
    pub path: PathBuf,
    /// Band name given to a single-band image file.
    #[serde(default = "default_elevation_band")]
    pub band: String,
    #[serde(default)]
    pub origin_x: f64,
    #[serde(default)]
    pub origin_y: f64,
    #[serde(default = "default_pixel_size")]
    pub pixel_size: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub image: Vec<ImageEntry>,
    #[serde(default)]
    pub elevation: Vec<ElevationEntry>,
}

/// Local stand-in for a managed image repository.
pub struct LocalCatalog {
    root: PathBuf,
    manifest: Manifest,
}

impl LocalCatalog {
    /// Load a manifest. Relative paths inside it resolve against its directory.
    pub fn open(manifest_path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(manifest_path)?;
        let manifest: Manifest = toml::from_str(&text)?;
        let root = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        info!(
            manifest = %manifest_path.display(),
            images = manifest.image.len(),
            elevation = manifest.elevation.len(),
            "Opened catalog"
        );
        Ok(Self { root, manifest })
    }

    pub fn from_manifest(root: impl Into<PathBuf>, manifest: Manifest) -> Self {
        Self {
            root: root.into(),
            manifest,
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Distinct collection ids, in manifest order.
    pub fn collections(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for entry in &self.manifest.image {
            if !ids.contains(&entry.collection.as_str()) {
                ids.push(&entry.collection);
            }
        }
        ids
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn load_entry(&self, entry: &ImageEntry) -> Result<Raster> {
        match (&entry.path, entry.bands.is_empty()) {
            (Some(path), true) => brf::read_raster(&self.resolve_path(path)),
            (None, false) => {
                let bands = entry
                    .bands
                    .iter()
                    .map(|(name, path)| {
                        image_io::load_band(&self.resolve_path(path))
                            .map(|data| Band::new(name.clone(), data))
                    })
                    .collect::<Result<Vec<_>>>()?;
                let transform =
                    GeoTransform::square(entry.origin_x, entry.origin_y, entry.pixel_size);
                Raster::new(bands, transform)
            }
            _ => Err(BeadedError::Source(format!(
                "image '{}' must set exactly one of `path` or `[bands]`",
                entry.id
            ))),
        }
    }
}

impl ImageRepository for LocalCatalog {
    fn resolve(&self, collection_id: &str, filter: &CollectionFilter) -> Result<ImageCollection> {
        let entries: Vec<&ImageEntry> = self
            .manifest
            .image
            .iter()
            .filter(|e| e.collection == collection_id)
            .filter(|e| filter.date_range.map_or(true, |r| r.contains(e.date)))
            .collect();
        if entries.is_empty() {
            return Err(BeadedError::Source(format!(
                "no images in collection '{collection_id}' match the filter"
            )));
        }

        let images = entries
            .into_iter()
            .map(|entry| {
                debug!(id = %entry.id, "Loading image");
                Ok(Image {
                    id: entry.id.clone(),
                    date: entry.date,
                    properties: entry.properties.clone(),
                    raster: self.load_entry(entry)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let collection = filter.apply(ImageCollection::new(images));
        info!(
            collection = collection_id,
            matched = collection.len(),
            "Resolved collection"
        );
        Ok(collection)
    }
}

impl ElevationSource for LocalCatalog {
    fn resolve_elevation(&self, dataset_id: &str, band: &str) -> Result<Raster> {
        let entry = self
            .manifest
            .elevation
            .iter()
            .find(|e| e.id == dataset_id)
            .ok_or_else(|| BeadedError::Source(format!("unknown elevation dataset '{dataset_id}'")))?;
        let path = self.resolve_path(&entry.path);

        let raster = if path.extension().is_some_and(|e| e == "brf") {
            brf::read_raster(&path)?
        } else {
            let data = image_io::load_band(&path)?;
            Raster::single(
                entry.band.clone(),
                data,
                GeoTransform::square(entry.origin_x, entry.origin_y, entry.pixel_size),
            )
        };
        raster.select(&[band])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_parse() {
        let text = r#"
            [[image]]
            id = "S2_20190715"
            collection = "COPERNICUS/S2_SR"
            date = "2019-07-15"
            path = "s2.brf"
            [image.properties]
            CLOUDY_PIXEL_PERCENTAGE = 3.2

            [[image]]
            id = "PS_1"
            collection = "planet"
            date = "2019-07-20"
            origin_x = -148.83
            origin_y = 69.50
            pixel_size = 0.00003
            [image.bands]
            B2 = "b2.tif"
            B4 = "b4.tif"

            [[elevation]]
            id = "UMN/PGC/ArcticDEM/V2/5m"
            path = "dem.brf"
        "#;
        let m: Manifest = toml::from_str(text).unwrap();
        assert_eq!(m.image.len(), 2);
        assert_eq!(m.image[0].properties["CLOUDY_PIXEL_PERCENTAGE"], 3.2);
        assert_eq!(m.image[1].bands.len(), 2);
        assert_eq!(m.elevation[0].band, "elevation");

        let cat = LocalCatalog::from_manifest("/data", m);
        assert_eq!(cat.collections(), vec!["COPERNICUS/S2_SR", "planet"]);
    }

    #[test]
    fn test_unknown_collection() {
        let cat = LocalCatalog::from_manifest("/data", Manifest::default());
        let err = cat.resolve("nope", &CollectionFilter::new()).unwrap_err();
        assert!(matches!(err, BeadedError::Source(_)));
    }
}
