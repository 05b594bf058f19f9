use std::sync::Arc;

use tracing::{info, warn};

use crate::cluster::{fit, predict};
use crate::error::Result;
use crate::export::{ExportRequest, ExportSink};
use crate::index::mndwi_collection;
use crate::raster::Raster;
use crate::region::Region;
use crate::render::{LayerSource, MapComposition, VisParams};
use crate::sample::{sample, SampleParams};
use crate::source::{CollectionFilter, ElevationSource, ImageRepository};
use crate::threshold::threshold_below;

use super::config::{ClusterTarget, LayerInput, PipelineConfig, SensorRun};
use super::types::{
    ClusterOutput, LayerOutput, NoOpReporter, PipelineOutput, PipelineStage, ProgressReporter,
    SensorOutput,
};

/// Run every configured sensor through index, threshold, sampling and
/// clustering, then compose the resulting layers.
pub fn run_pipeline_reported<S>(
    config: &PipelineConfig,
    source: &S,
    sink: &dyn ExportSink,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<PipelineOutput>
where
    S: ImageRepository + ElevationSource + ?Sized,
{
    let region = config.validate()?;
    let total = config.sensors.len();
    info!(sensors = total, k = config.clustering.k, "Starting pipeline");

    let mut sensors = Vec::with_capacity(total);
    for run in &config.sensors {
        sensors.push(run_sensor(config, run, &region, source, sink, &reporter)?);
    }

    let elevation = match config.elevation {
        Some(ref elev) => match source.resolve_elevation(&elev.dataset, &elev.band) {
            Ok(raster) => Some(raster),
            Err(e) => {
                warn!(dataset = %elev.dataset, error = %e, "Elevation unavailable, skipping layer");
                None
            }
        },
        None => None,
    };

    reporter.begin_stage(PipelineStage::Composing, None);
    let composition = compose(config, &region, &sensors, elevation);
    reporter.finish_stage();
    info!(layers = composition.len(), "Pipeline complete");

    Ok(PipelineOutput {
        sensors,
        composition,
    })
}

/// Run the full processing pipeline without progress reporting.
pub fn run_pipeline<S>(
    config: &PipelineConfig,
    source: &S,
    sink: &dyn ExportSink,
) -> Result<PipelineOutput>
where
    S: ImageRepository + ElevationSource + ?Sized,
{
    let reporter = Arc::new(NoOpReporter);
    run_pipeline_reported(config, source, sink, reporter)
}

fn run_sensor<S>(
    config: &PipelineConfig,
    run: &SensorRun,
    region: &Region,
    source: &S,
    sink: &dyn ExportSink,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<SensorOutput>
where
    S: ImageRepository + ?Sized,
{
    let sensor = &run.sensor;

    reporter.begin_stage(PipelineStage::Resolving, None);
    let mut filter = CollectionFilter::new().bounds(region.clone());
    filter.date_range = run.date_range;
    filter.sort_key = run.sort_key.clone();
    let collection = source.resolve(&run.collection, &filter)?;
    let image = collection.first()?;
    info!(
        sensor = %sensor.name,
        image = %image.id,
        candidates = collection.len(),
        "Selected image"
    );
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Index, None);
    let indexed = mndwi_collection(&collection, sensor)?;
    let index = indexed.first()?.raster.clone();
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Threshold, None);
    let mask = threshold_below(&index, sensor.threshold)?;
    info!(
        sensor = %sensor.name,
        threshold = sensor.threshold,
        flagged = mask.count_set(),
        "Thresholded MNDWI"
    );
    reporter.finish_stage();

    let scale = run.sample_scale.unwrap_or_else(|| image.raster.scale());
    let mut params = SampleParams::new(scale, config.sampling.max_samples);
    params.seed = config.sampling.seed;

    let mut clusters = Vec::with_capacity(run.cluster.len());
    reporter.begin_stage(PipelineStage::Clustering, Some(run.cluster.len()));
    for (i, &target) in run.cluster.iter().enumerate() {
        let features: &Raster = match target {
            ClusterTarget::Index => &index,
            ClusterTarget::Bands => &image.raster,
        };

        let samples = sample(features, Some(region), &params)?;
        let model = fit(&samples, &config.clustering)?;
        let labels = predict(&model, features)?;
        info!(
            sensor = %sensor.name,
            target = %target,
            samples = samples.len(),
            iterations = model.iterations,
            "Clustered"
        );

        clusters.push(ClusterOutput {
            target,
            samples: samples.len(),
            model,
            labels,
        });
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    let export = match run.export {
        Some(ref cfg) => {
            reporter.begin_stage(PipelineStage::Exporting, None);
            let request = ExportRequest {
                description: cfg.description.clone(),
                scale: cfg.scale.unwrap_or(sensor.scale),
                destination: config.output.clone(),
            };
            let receipt = sink.export(&indexed.first()?.raster, &request)?;
            reporter.finish_stage();
            Some(receipt)
        }
        None => None,
    };

    let mut layers = Vec::with_capacity(run.layers.len());
    for extra in &run.layers {
        let raster = match extra.input {
            LayerInput::Index => index.clone(),
            LayerInput::Collection => collection.mosaic()?,
            LayerInput::CollectionIndex => indexed.mosaic()?,
        };
        layers.push(LayerOutput {
            label: extra.label.clone(),
            raster,
            vis: extra.vis.clone(),
        });
    }

    Ok(SensorOutput {
        sensor: sensor.clone(),
        image_id: image.id.clone(),
        image: image.raster.clone(),
        index,
        mask,
        clusters,
        export,
        layers,
    })
}

/// Layer order: outline, source imagery, elevation, indices, thresholds,
/// configured extra layers, then cluster maps.
fn compose(
    config: &PipelineConfig,
    region: &Region,
    sensors: &[SensorOutput],
    elevation: Option<Raster>,
) -> MapComposition {
    let mut map = MapComposition::new();
    map.center_on(region, config.zoom);
    map.add_layer("ROI", LayerSource::Region(region.clone()), VisParams::default());

    for out in sensors {
        map.add_layer(
            out.sensor.name.clone(),
            LayerSource::Raster(out.image.clone()),
            out.sensor.display.clone(),
        );
    }
    if let (Some(raster), Some(elev)) = (elevation, config.elevation.as_ref()) {
        map.add_layer(elev.label.clone(), LayerSource::Raster(raster), elev.vis.clone());
    }
    for out in sensors {
        map.add_layer(
            format!("MNDWI_{}", out.sensor.name),
            LayerSource::Raster(out.index.clone()),
            out.sensor.index_display.clone(),
        );
    }
    for out in sensors {
        map.add_layer(
            format!("Threshold_{}", out.sensor.name),
            LayerSource::Mask(out.mask.clone()),
            VisParams::stretch(0.0, 1.0),
        );
    }
    for out in sensors {
        for layer in &out.layers {
            map.add_layer(
                layer.label.clone(),
                LayerSource::Raster(layer.raster.clone()),
                layer.vis.clone(),
            );
        }
    }
    for out in sensors {
        for c in &out.clusters {
            let label = match c.target {
                ClusterTarget::Index => format!("{} MNDWI kmeans", out.sensor.name),
                ClusterTarget::Bands => format!("{} kmeans", out.sensor.name),
            };
            map.add_layer(label, LayerSource::Labels(c.labels.clone()), VisParams::default());
        }
    }
    map
}
