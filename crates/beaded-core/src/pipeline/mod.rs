pub mod config;
mod orchestrator;
mod types;

pub use config::{ClusterTarget, ExtraLayer, LayerInput, PipelineConfig, SensorRun};
pub use orchestrator::{run_pipeline, run_pipeline_reported};
pub use types::{
    ClusterOutput, LayerOutput, PipelineOutput, PipelineStage, ProgressReporter, SensorOutput,
};
