use beaded_core::cluster::KMeansParams;
use beaded_core::consts::{DEFAULT_CLUSTER_COUNT, DEFAULT_MAP_ZOOM, DEFAULT_MAX_SAMPLES};
use beaded_core::pipeline::{ClusterTarget, PipelineConfig, PipelineStage, SensorRun};
use beaded_core::region::Region;
use beaded_core::sensor::SensorProfile;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn test_default_sensors_match_presets() {
    let config = PipelineConfig::default();
    assert_eq!(config.sensors.len(), 2);
    assert_eq!(config.sensors[0].sensor, SensorProfile::sentinel2());
    assert_eq!(config.sensors[1].sensor, SensorProfile::planet());
    assert_eq!(
        config.sensors[1].cluster,
        vec![ClusterTarget::Index, ClusterTarget::Bands]
    );
}

#[test]
fn test_default_sentinel_run_filters_summer() {
    let run = SensorRun::sentinel2();
    let range = run.date_range.unwrap();
    assert_eq!(range.start.to_string(), "2019-07-01");
    assert_eq!(range.end.to_string(), "2019-09-01");
    assert_eq!(run.sort_key.as_deref(), Some("CLOUDY_PIXEL_PERCENTAGE"));
}

#[test]
fn test_default_region_is_valid() {
    let config = PipelineConfig::default();
    let region = Region::from_config(&config.region).unwrap();
    assert!(region.contains(-148.81, 69.493));
}

#[test]
fn test_kmeans_defaults() {
    let p = KMeansParams::default();
    assert_eq!(p.k, DEFAULT_CLUSTER_COUNT);
    assert!(p.normalize);
    assert!(p.seed.is_none());
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn test_toml_roundtrip() {
    let config = PipelineConfig::default();
    let text = toml::to_string_pretty(&config).unwrap();
    let parsed: PipelineConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_json_roundtrip() {
    let config = PipelineConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let text = r#"
catalog = "catalog.toml"
output = "out"

[clustering]
k = 3
seed = 17

[[sensors]]
collection = "planet_beaded"
cluster = ["bands"]

[sensors.sensor]
name = "Planet"
green_band = "B2"
other_band = "B4"
threshold = -0.5
scale = 3.0
"#;
    let config = PipelineConfig::from_toml(text).unwrap();
    assert_eq!(config.zoom, DEFAULT_MAP_ZOOM);
    assert_eq!(config.sampling.max_samples, DEFAULT_MAX_SAMPLES);
    assert_eq!(config.clustering.k, 3);
    assert_eq!(config.clustering.seed, Some(17));
    assert_eq!(config.sensors.len(), 1);
    assert_eq!(config.sensors[0].cluster, vec![ClusterTarget::Bands]);
    assert_eq!(
        config.sensors[0].sensor.index_display,
        SensorProfile::planet().index_display
    );
    config.validate().unwrap();
}

#[test]
fn test_invalid_threshold_caught_by_validate() {
    let mut config = PipelineConfig::default();
    config.sensors[0].sensor.threshold = f32::INFINITY;
    assert!(config.validate().is_err());
}

#[test]
fn test_degenerate_region_caught_by_validate() {
    let mut config = PipelineConfig::default();
    config.region.vertices.truncate(2);
    assert!(config.validate().is_err());
}

// ---------------------------------------------------------------------------
// PipelineStage Display
// ---------------------------------------------------------------------------

#[test]
fn test_stage_display() {
    assert_eq!(PipelineStage::Index.to_string(), "Computing MNDWI");
    assert_eq!(PipelineStage::Clustering.to_string(), "Sampling and clustering");
}
