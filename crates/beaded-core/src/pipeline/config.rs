use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cluster::KMeansParams;
use crate::consts::{DEFAULT_MAP_ZOOM, DEFAULT_MAX_SAMPLES};
use crate::error::{BeadedError, Result};
use crate::region::{Region, RegionConfig};
use crate::render::{BandSpec, PerBand, VisParams};
use crate::sensor::SensorProfile;
use crate::source::DateRange;

/// Lake outline on the Alaskan North Slope used by the exploratory maps.
const DEFAULT_ROI: [[f64; 2]; 4] = [
    [-148.82211, 69.49305],
    [-148.80658, 69.49731],
    [-148.79748, 69.4943],
    [-148.81585, 69.48874],
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// `catalog.toml` manifest.
    pub catalog: PathBuf,
    /// Directory for rendered layers and exports.
    pub output: PathBuf,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_region")]
    pub region: RegionConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub clustering: KMeansParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<ElevationConfig>,
    #[serde(default = "default_sensors")]
    pub sensors: Vec<SensorRun>,
}

fn default_zoom() -> u8 {
    DEFAULT_MAP_ZOOM
}

fn default_region() -> RegionConfig {
    RegionConfig {
        vertices: DEFAULT_ROI.to_vec(),
    }
}

fn default_sensors() -> Vec<SensorRun> {
    vec![SensorRun::sentinel2(), SensorRun::planet()]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("catalog.toml"),
            output: PathBuf::from("output"),
            zoom: DEFAULT_MAP_ZOOM,
            region: default_region(),
            sampling: SamplingConfig::default(),
            clustering: KMeansParams::default(),
            elevation: Some(ElevationConfig::default()),
            sensors: default_sensors(),
        }
    }
}

impl PipelineConfig {
    /// Check everything that can be checked before touching the catalog.
    pub fn validate(&self) -> Result<Region> {
        let region = Region::from_config(&self.region)?;
        if self.sensors.is_empty() {
            return Err(BeadedError::invalid_parameter(
                "sensors",
                0,
                "at least one sensor run is required",
            ));
        }
        if self.clustering.k == 0 {
            return Err(BeadedError::invalid_parameter(
                "clustering.k",
                0,
                "must be at least 1",
            ));
        }
        for run in &self.sensors {
            run.sensor.validate()?;
            if let Some(s) = run.sample_scale {
                if !s.is_finite() || s <= 0.0 {
                    return Err(BeadedError::invalid_parameter(
                        "sample_scale",
                        s,
                        "must be a positive distance",
                    ));
                }
            }
        }
        Ok(region)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a config file. Relative `catalog` and `output` paths resolve
    /// against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Anchor relative `catalog` and `output` paths at `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.catalog.is_relative() {
            self.catalog = base.join(&self.catalog);
        }
        if self.output.is_relative() {
            self.output = base.join(&self.output);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_max_samples() -> usize {
    DEFAULT_MAX_SAMPLES
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            seed: None,
        }
    }
}

/// Feature space a clusterer is trained on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterTarget {
    /// The single MNDWI band.
    Index,
    /// Every band of the source image.
    Bands,
}

impl std::fmt::Display for ClusterTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index => write!(f, "MNDWI"),
            Self::Bands => write!(f, "bands"),
        }
    }
}

fn default_cluster_targets() -> Vec<ClusterTarget> {
    vec![ClusterTarget::Index]
}

/// Per-sensor processing run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorRun {
    pub sensor: SensorProfile,
    /// Collection id in the catalog.
    pub collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    /// Ascending sort key applied before taking the first image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
    /// Sampling distance in raster units; native resolution when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_scale: Option<f64>,
    #[serde(default = "default_cluster_targets")]
    pub cluster: Vec<ClusterTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportConfig>,
    /// Additional display layers drawn from the run's products.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<ExtraLayer>,
}

impl SensorRun {
    /// Least-cloudy Sentinel-2 scene from July-August 2019.
    pub fn sentinel2() -> Self {
        let date_range = NaiveDate::from_ymd_opt(2019, 7, 1)
            .zip(NaiveDate::from_ymd_opt(2019, 9, 1))
            .map(|(start, end)| DateRange { start, end });
        Self {
            sensor: SensorProfile::sentinel2(),
            collection: "COPERNICUS/S2_SR".into(),
            date_range,
            sort_key: Some("CLOUDY_PIXEL_PERCENTAGE".into()),
            sample_scale: None,
            cluster: vec![ClusterTarget::Index],
            export: None,
            layers: Vec::new(),
        }
    }

    /// Beaded-stream Planet scenes, clustered on MNDWI and on raw bands.
    pub fn planet() -> Self {
        Self {
            sensor: SensorProfile::planet(),
            collection: "planet_beaded".into(),
            date_range: None,
            sort_key: None,
            sample_scale: None,
            cluster: vec![ClusterTarget::Index, ClusterTarget::Bands],
            export: Some(ExportConfig {
                description: "Planet_MNDWI_1".into(),
                scale: None,
            }),
            layers: planet_layers(),
        }
    }
}

/// Whole-collection composites and the white-to-blue MNDWI views.
fn planet_layers() -> Vec<ExtraLayer> {
    let composite = |bands: &str, max: Vec<f32>| VisParams {
        bands: Some(BandSpec::Joined(bands.into())),
        min: Some(PerBand::Scalar(0.0)),
        ..Default::default()
    }
    .with_max(max);
    let water = VisParams {
        bands: Some(BandSpec::Joined("MNDWI".into())),
        ..VisParams::stretch(-1.0, 0.0)
    }
    .with_palette(&["white", "blue"]);

    vec![
        ExtraLayer {
            label: "planet collection CIR".into(),
            input: LayerInput::Collection,
            vis: composite("B4,B3,B2", vec![5000.0, 2000.0, 2000.0]),
        },
        ExtraLayer {
            label: "planet collection RGB".into(),
            input: LayerInput::Collection,
            vis: composite("B3,B2,B1", vec![2000.0, 2000.0, 2000.0]),
        },
        ExtraLayer {
            label: "test MNDWI".into(),
            input: LayerInput::Index,
            vis: water.clone(),
        },
        ExtraLayer {
            label: "Planet with MNDWI".into(),
            input: LayerInput::CollectionIndex,
            vis: water,
        },
    ]
}

/// Product an extra layer is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerInput {
    /// MNDWI of the selected image.
    Index,
    /// Mosaic of every image that passed the filters.
    Collection,
    /// Mosaic of every filtered image's MNDWI.
    CollectionIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtraLayer {
    pub label: String,
    pub input: LayerInput,
    #[serde(default)]
    pub vis: VisParams,
}

/// Export of the first image's MNDWI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub description: String,
    /// Recorded export scale; the sensor's scale when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

/// Elevation backdrop layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElevationConfig {
    pub dataset: String,
    #[serde(default = "default_elevation_band")]
    pub band: String,
    #[serde(default = "default_elevation_label")]
    pub label: String,
    #[serde(default = "default_elevation_vis")]
    pub vis: VisParams,
}

fn default_elevation_band() -> String {
    "elevation".into()
}

fn default_elevation_label() -> String {
    "ArcticDEM".into()
}

fn default_elevation_vis() -> VisParams {
    VisParams::stretch(160.0, 180.0)
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self {
            dataset: "UMN/PGC/ArcticDEM/V2/5m".into(),
            band: default_elevation_band(),
            label: default_elevation_label(),
            vis: default_elevation_vis(),
        }
    }
}
