//! Image repository seam: collections of dated, georeferenced rasters.

pub mod catalog;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BeadedError, Result};
use crate::raster::{is_valid, Band, Raster};
use crate::region::Region;

pub use catalog::LocalCatalog;

/// One acquisition.
#[derive(Clone, Debug)]
pub struct Image {
    pub id: String,
    pub date: NaiveDate,
    /// Numeric metadata such as `CLOUDY_PIXEL_PERCENTAGE`.
    pub properties: BTreeMap<String, f64>,
    pub raster: Raster,
}

impl Image {
    pub fn property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).copied()
    }
}

/// Half-open date interval `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end <= start {
            return Err(BeadedError::invalid_parameter(
                "date_range",
                format!("{start}..{end}"),
                "end must be after start",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

/// Filters applied when resolving a collection.
#[derive(Clone, Debug, Default)]
pub struct CollectionFilter {
    pub bounds: Option<Region>,
    pub date_range: Option<DateRange>,
    /// Ascending sort on a numeric property.
    pub sort_key: Option<String>,
}

impl CollectionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounds(mut self, region: Region) -> Self {
        self.bounds = Some(region);
        self
    }

    pub fn date(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn sort(mut self, key: impl Into<String>) -> Self {
        self.sort_key = Some(key.into());
        self
    }

    /// Apply every configured filter, then the sort.
    pub fn apply(&self, collection: ImageCollection) -> ImageCollection {
        let mut out = collection;
        if let Some(ref region) = self.bounds {
            out = out.filter_bounds(region);
        }
        if let Some(ref range) = self.date_range {
            out = out.filter_date(range);
        }
        if let Some(ref key) = self.sort_key {
            out = out.sort_by(key);
        }
        out
    }
}

/// Ordered set of images.
#[derive(Clone, Debug, Default)]
pub struct ImageCollection {
    images: Vec<Image>,
}

impl ImageCollection {
    pub fn new(images: Vec<Image>) -> Self {
        Self { images }
    }

    /// Keep images whose footprint overlaps the region's bounding box.
    pub fn filter_bounds(self, region: &Region) -> Self {
        let before = self.images.len();
        let images: Vec<Image> = self
            .images
            .into_iter()
            .filter(|img| {
                let (rows, cols) = img.raster.shape();
                region.overlaps(&img.raster.transform().footprint(rows, cols))
            })
            .collect();
        debug!(before, after = images.len(), "Filtered collection by bounds");
        Self { images }
    }

    pub fn filter_date(self, range: &DateRange) -> Self {
        let images = self
            .images
            .into_iter()
            .filter(|img| range.contains(img.date))
            .collect();
        Self { images }
    }

    /// Stable ascending sort on a numeric property. Images lacking the
    /// property go last.
    pub fn sort_by(mut self, key: &str) -> Self {
        self.images.sort_by(|a, b| match (a.property(key), b.property(key)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        self
    }

    pub fn first(&self) -> Result<&Image> {
        self.images
            .first()
            .ok_or_else(|| BeadedError::Source("collection is empty".into()))
    }

    /// Derive a new raster for every image, keeping id, date and properties.
    pub fn map<F>(&self, mut f: F) -> Result<ImageCollection>
    where
        F: FnMut(&Raster) -> Result<Raster>,
    {
        let images = self
            .images
            .iter()
            .map(|img| {
                Ok(Image {
                    id: img.id.clone(),
                    date: img.date,
                    properties: img.properties.clone(),
                    raster: f(&img.raster)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { images })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Image> {
        self.images.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.images.iter().map(|i| i.id.as_str()).collect()
    }

    /// Flatten the collection into one raster. Later images are drawn on top
    /// of earlier ones; invalid pixels let the image below show through.
    ///
    /// Every image must share the first image's grid and band names.
    pub fn mosaic(&self) -> Result<Raster> {
        let base = &self.first()?.raster;
        let (rows, cols) = base.shape();
        let names = base.band_names();
        let mut bands: Vec<Band> = base.bands().to_vec();

        for image in self.iter().skip(1) {
            let raster = &image.raster;
            let (r, c) = raster.shape();
            if (r, c) != (rows, cols) {
                return Err(BeadedError::DimensionMismatch {
                    expected_rows: rows,
                    expected_cols: cols,
                    rows: r,
                    cols: c,
                });
            }
            if raster.transform() != base.transform() || raster.band_names() != names {
                return Err(BeadedError::Source(format!(
                    "{} does not share the mosaic grid or bands",
                    image.id
                )));
            }
            for (dst, src) in bands.iter_mut().zip(raster.bands()) {
                dst.data.zip_mut_with(&src.data, |d, &v| {
                    if is_valid(v) {
                        *d = v;
                    }
                });
            }
        }
        debug!(images = self.len(), "Mosaicked collection");
        Raster::new(bands, *base.transform())
    }
}

/// Source of image collections.
pub trait ImageRepository {
    fn resolve(&self, collection_id: &str, filter: &CollectionFilter) -> Result<ImageCollection>;
}

/// Source of elevation models.
pub trait ElevationSource {
    fn resolve_elevation(&self, dataset_id: &str, band: &str) -> Result<Raster>;
}
