mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use beaded_core::consts::MNDWI_BAND;
use beaded_core::export::LocalDirSink;
use beaded_core::io::brf::BrfReader;
use beaded_core::pipeline::{
    run_pipeline, run_pipeline_reported, ClusterTarget, PipelineConfig, PipelineStage,
    ProgressReporter,
};
use beaded_core::render::{PngPresenter, Presenter};
use beaded_core::source::LocalCatalog;
use tempfile::tempdir;

fn seeded_config(dir: &std::path::Path) -> PipelineConfig {
    let mut config = PipelineConfig {
        catalog: common::write_test_catalog(dir),
        output: dir.join("out"),
        ..Default::default()
    };
    config.sampling.seed = Some(21);
    config.clustering.seed = Some(21);
    config.clustering.k = 3;
    config
}

#[derive(Default)]
struct RecordingReporter {
    stages: Mutex<Vec<PipelineStage>>,
    advanced: AtomicUsize,
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: PipelineStage, _total_items: Option<usize>) {
        self.stages.lock().unwrap().push(stage);
    }

    fn advance(&self, _items_done: usize) {
        self.advanced.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_full_run_over_catalog() {
    let dir = tempdir().unwrap();
    let config = seeded_config(dir.path());
    let catalog = LocalCatalog::open(&config.catalog).unwrap();

    let output = run_pipeline(&config, &catalog, &LocalDirSink).unwrap();

    assert_eq!(output.sensors.len(), 2);
    let sentinel = &output.sensors[0];
    let planet = &output.sensors[1];
    assert_eq!(sentinel.image_id, "S2_20190802");
    assert_eq!(planet.image_id, "PS_20190720");

    assert_eq!(sentinel.index.band_names(), vec![MNDWI_BAND]);
    assert_eq!(sentinel.mask.shape(), sentinel.index.shape());

    assert_eq!(sentinel.clusters.len(), 1);
    assert_eq!(planet.clusters.len(), 2);
    assert_eq!(planet.clusters[1].target, ClusterTarget::Bands);
    assert_eq!(planet.clusters[1].model.band_names.len(), 4);
    for out in &output.sensors {
        for c in &out.clusters {
            assert!(c.samples >= 3 && c.samples <= 5000);
            assert!(c.labels.labels.iter().all(|&l| (l as usize) < 3));
        }
    }

    assert_eq!(
        output.composition.labels(),
        vec![
            "ROI",
            "Sentinel",
            "Planet",
            "ArcticDEM",
            "MNDWI_Sentinel",
            "MNDWI_Planet",
            "Threshold_Sentinel",
            "Threshold_Planet",
            "planet collection CIR",
            "planet collection RGB",
            "test MNDWI",
            "Planet with MNDWI",
            "Sentinel MNDWI kmeans",
            "Planet MNDWI kmeans",
            "Planet kmeans",
        ]
    );
    assert_eq!(output.composition.center.unwrap().zoom, 14);
}

#[test]
fn test_planet_index_is_exported() {
    let dir = tempdir().unwrap();
    let config = seeded_config(dir.path());
    let catalog = LocalCatalog::open(&config.catalog).unwrap();
    let output = run_pipeline(&config, &catalog, &LocalDirSink).unwrap();

    assert!(output.sensors[0].export.is_none());
    let receipt = output.sensors[1].export.as_ref().unwrap();
    assert_eq!(receipt.path, config.output.join("Planet_MNDWI_1.brf"));

    let reader = BrfReader::open(&receipt.path).unwrap();
    assert_eq!(reader.header.export_scale, Some(3.0));
    let exported = reader.read_raster().unwrap();
    assert_eq!(
        exported.band(MNDWI_BAND).unwrap(),
        output.sensors[1].index.band(MNDWI_BAND).unwrap()
    );
}

#[test]
fn test_collection_layers_come_from_mapped_collection() {
    let dir = tempdir().unwrap();
    let config = seeded_config(dir.path());
    let catalog = LocalCatalog::open(&config.catalog).unwrap();
    let output = run_pipeline(&config, &catalog, &LocalDirSink).unwrap();

    assert!(output.sensors[0].layers.is_empty());
    let planet = &output.sensors[1];
    let layers: Vec<&str> = planet.layers.iter().map(|l| l.label.as_str()).collect();
    assert_eq!(
        layers,
        vec![
            "planet collection CIR",
            "planet collection RGB",
            "test MNDWI",
            "Planet with MNDWI"
        ]
    );

    // The Planet collection holds one scene, so its mosaics are that scene.
    let cir = &planet.layers[0].raster;
    assert_eq!(cir.band_names(), planet.image.band_names());
    assert_eq!(cir.band("B4").unwrap(), planet.image.band("B4").unwrap());
    let with_mndwi = &planet.layers[3].raster;
    assert_eq!(with_mndwi.band_names(), vec![MNDWI_BAND]);
    assert_eq!(
        with_mndwi.band(MNDWI_BAND).unwrap(),
        planet.index.band(MNDWI_BAND).unwrap()
    );
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let dir = tempdir().unwrap();
    let config = seeded_config(dir.path());
    let catalog = LocalCatalog::open(&config.catalog).unwrap();

    let a = run_pipeline(&config, &catalog, &LocalDirSink).unwrap();
    let b = run_pipeline(&config, &catalog, &LocalDirSink).unwrap();
    for (x, y) in a.sensors.iter().zip(&b.sensors) {
        for (cx, cy) in x.clusters.iter().zip(&y.clusters) {
            assert_eq!(cx.model.centroids, cy.model.centroids);
            assert_eq!(cx.labels.labels, cy.labels.labels);
        }
    }
}

#[test]
fn test_reporter_sees_every_stage() {
    let dir = tempdir().unwrap();
    let config = seeded_config(dir.path());
    let catalog = LocalCatalog::open(&config.catalog).unwrap();
    let reporter = Arc::new(RecordingReporter::default());

    run_pipeline_reported(&config, &catalog, &LocalDirSink, reporter.clone()).unwrap();

    let stages = reporter.stages.lock().unwrap();
    assert_eq!(stages.first(), Some(&PipelineStage::Resolving));
    assert_eq!(stages.last(), Some(&PipelineStage::Composing));
    assert!(stages.contains(&PipelineStage::Exporting));
    // One advance per trained clusterer: 1 for Sentinel, 2 for Planet.
    assert_eq!(reporter.advanced.load(Ordering::SeqCst), 3);
}

#[test]
fn test_missing_elevation_is_not_fatal() {
    let dir = tempdir().unwrap();
    let mut config = seeded_config(dir.path());
    if let Some(ref mut elev) = config.elevation {
        elev.dataset = "not/in/catalog".into();
    }
    let catalog = LocalCatalog::open(&config.catalog).unwrap();
    let output = run_pipeline(&config, &catalog, &LocalDirSink).unwrap();
    assert!(!output.composition.labels().contains(&"ArcticDEM"));
}

#[test]
fn test_too_few_samples_fails() {
    let dir = tempdir().unwrap();
    let mut config = seeded_config(dir.path());
    config.sampling.max_samples = 2;
    let catalog = LocalCatalog::open(&config.catalog).unwrap();
    assert!(run_pipeline(&config, &catalog, &LocalDirSink).is_err());
}

#[test]
fn test_composition_renders_to_png() {
    let dir = tempdir().unwrap();
    let config = seeded_config(dir.path());
    let catalog = LocalCatalog::open(&config.catalog).unwrap();
    let output = run_pipeline(&config, &catalog, &LocalDirSink).unwrap();

    let presenter = PngPresenter::new(config.output.join("layers"));
    presenter.present(&output.composition).unwrap();

    let written = std::fs::read_dir(presenter.dir()).unwrap().count();
    // Every layer except the region outline.
    assert_eq!(written, output.composition.len() - 1);
    assert!(presenter.layer_path(14, "Planet kmeans").exists());
}
