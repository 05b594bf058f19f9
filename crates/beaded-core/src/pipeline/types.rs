use crate::cluster::KMeansModel;
use crate::export::ExportReceipt;
use crate::raster::{LabelRaster, MaskRaster, Raster};
use crate::render::{MapComposition, VisParams};
use crate::sensor::SensorProfile;

use super::config::ClusterTarget;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Resolving,
    Index,
    Threshold,
    Clustering,
    Exporting,
    Composing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolving => write!(f, "Resolving imagery"),
            Self::Index => write!(f, "Computing MNDWI"),
            Self::Threshold => write!(f, "Thresholding"),
            Self::Clustering => write!(f, "Sampling and clustering"),
            Self::Exporting => write!(f, "Exporting"),
            Self::Composing => write!(f, "Composing map"),
        }
    }
}

/// One trained clusterer and the labels it produced.
#[derive(Clone, Debug)]
pub struct ClusterOutput {
    pub target: ClusterTarget,
    pub samples: usize,
    pub model: KMeansModel,
    pub labels: LabelRaster,
}

/// Everything derived for one sensor.
#[derive(Clone, Debug)]
pub struct SensorOutput {
    pub sensor: SensorProfile,
    /// Id of the image the products were derived from.
    pub image_id: String,
    pub image: Raster,
    pub index: Raster,
    pub mask: MaskRaster,
    pub clusters: Vec<ClusterOutput>,
    pub export: Option<ExportReceipt>,
    pub layers: Vec<LayerOutput>,
}

/// A configured extra layer, resolved to a raster.
#[derive(Clone, Debug)]
pub struct LayerOutput {
    pub label: String,
    pub raster: Raster,
    pub vis: VisParams,
}

/// Result of the pipeline.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub sensors: Vec<SensorOutput>,
    pub composition: MapComposition,
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., sensor count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `run_pipeline` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
