use std::fmt;

use crate::raster::{LabelRaster, MaskRaster, Raster};
use crate::region::Region;

use super::vis::VisParams;

/// What a layer draws.
#[derive(Clone, Debug)]
pub enum LayerSource {
    Raster(Raster),
    Mask(MaskRaster),
    /// Cluster labels, drawn with one random color per class.
    Labels(LabelRaster),
    /// Region outline.
    Region(Region),
}

impl LayerSource {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Raster(_) => "raster",
            Self::Mask(_) => "mask",
            Self::Labels(_) => "labels",
            Self::Region(_) => "region",
        }
    }
}

/// A request to display one layer.
#[derive(Clone, Debug)]
pub struct LayerRequest {
    pub label: String,
    pub source: LayerSource,
    pub vis: VisParams,
    pub visible: bool,
}

/// Where the map view is centred.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapCenter {
    pub lon: f64,
    pub lat: f64,
    pub zoom: u8,
}

impl fmt::Display for MapCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5}) z{}", self.lon, self.lat, self.zoom)
    }
}

/// An ordered list of layer requests.
///
/// Building a composition has no side effects; a [`super::Presenter`]
/// decides what to do with it.
#[derive(Clone, Debug, Default)]
pub struct MapComposition {
    pub center: Option<MapCenter>,
    pub layers: Vec<LayerRequest>,
}

impl MapComposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Centre the view on a region's centroid.
    pub fn center_on(&mut self, region: &Region, zoom: u8) -> &mut Self {
        let (lon, lat) = region.centroid();
        self.center = Some(MapCenter { lon, lat, zoom });
        self
    }

    pub fn add_layer(
        &mut self,
        label: impl Into<String>,
        source: LayerSource,
        vis: VisParams,
    ) -> &mut Self {
        self.layers.push(LayerRequest {
            label: label.into(),
            source,
            vis,
            visible: true,
        });
        self
    }

    /// Add a layer that is listed but not drawn by default.
    pub fn add_hidden_layer(
        &mut self,
        label: impl Into<String>,
        source: LayerSource,
        vis: VisParams,
    ) -> &mut Self {
        self.add_layer(label, source, vis);
        if let Some(last) = self.layers.last_mut() {
            last.visible = false;
        }
        self
    }

    pub fn labels(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
