mod common;

use beaded_core::cluster::{fit, predict, KMeansParams};
use beaded_core::consts::{MNDWI_BAND, NO_DATA};
use beaded_core::error::{BeadedError, ConfigurationError};
use beaded_core::index::mndwi;
use beaded_core::raster::{GeoTransform, Raster};
use beaded_core::sample::{sample, SampleParams, SampleSet};
use beaded_core::sensor::SensorProfile;
use ndarray::{array, Array2};

fn seeded(k: usize) -> KMeansParams {
    KMeansParams {
        k,
        seed: Some(5),
        ..Default::default()
    }
}

#[test]
fn test_fewer_samples_than_k() {
    let r = Raster::single("MNDWI", array![[0.1, 0.2], [0.3, 0.4]], GeoTransform::default());
    let set = sample(&r, None, &SampleParams::new(1.0, 10)).unwrap();
    let err = fit(&set, &seeded(5)).unwrap_err();
    assert!(matches!(
        err,
        BeadedError::InsufficientData { samples: 4, k: 5 }
    ));
}

#[test]
fn test_empty_sample_set() {
    let set = SampleSet {
        band_names: vec!["MNDWI".into()],
        records: vec![],
    };
    assert!(matches!(
        fit(&set, &seeded(1)),
        Err(BeadedError::InsufficientData { samples: 0, .. })
    ));
}

#[test]
fn test_every_pixel_gets_a_label_below_k() {
    let scene = common::sentinel_scene(30, 30, 1.0);
    let index = mndwi(&scene, &SensorProfile::sentinel2()).unwrap();
    let set = sample(&index, None, &SampleParams::new(1.0, 200).with_seed(2)).unwrap();
    let model = fit(&set, &seeded(5)).unwrap();
    let labels = predict(&model, &index).unwrap();

    assert_eq!(labels.shape(), (30, 30));
    assert!(labels.labels.iter().all(|&l| (l as usize) < 5));
    assert!(labels.valid.iter().all(|&v| v));
    assert_eq!(labels.class_counts().iter().sum::<usize>(), 900);
}

#[test]
fn test_water_and_land_separate() {
    let scene = common::sentinel_scene(20, 20, 1.0);
    let index = mndwi(&scene, &SensorProfile::sentinel2()).unwrap();
    let set = sample(&index, None, &SampleParams::new(1.0, 400).with_seed(8)).unwrap();
    let model = fit(&set, &seeded(2)).unwrap();
    let labels = predict(&model, &index).unwrap();

    // Left half is water, right half land.
    let water = labels.labels[[0, 0]];
    let land = labels.labels[[0, 19]];
    assert_ne!(water, land);
    for row in 0..20 {
        assert_eq!(labels.labels[[row, 3]], water);
        assert_eq!(labels.labels[[row, 16]], land);
    }
}

#[test]
fn test_no_data_pixels_marked_invalid() {
    let data = Array2::from_shape_fn((6, 6), |(r, c)| if r == 0 && c == 0 { NO_DATA } else { (r * 6 + c) as f32 });
    let r = Raster::single(MNDWI_BAND, data, GeoTransform::default());
    let set = sample(&r, None, &SampleParams::new(1.0, 100).with_seed(1)).unwrap();
    let model = fit(&set, &seeded(3)).unwrap();
    let labels = predict(&model, &r).unwrap();
    assert!(!labels.valid[[0, 0]]);
    assert_eq!(labels.labels[[0, 0]], 0);
    assert!(labels.valid[[5, 5]]);
}

#[test]
fn test_predict_requires_model_bands() {
    let scene = common::sentinel_scene(10, 10, 1.0);
    let set = sample(&scene, None, &SampleParams::new(1.0, 50).with_seed(4)).unwrap();
    let model = fit(&set, &seeded(3)).unwrap();

    let index = mndwi(&scene, &SensorProfile::sentinel2()).unwrap();
    let err = predict(&model, &index).unwrap_err();
    assert!(matches!(
        err,
        BeadedError::Configuration(ConfigurationError::MissingBand { .. })
    ));
}

#[test]
fn test_parallel_prediction_covers_large_rasters() {
    let scene = common::sentinel_scene(300, 300, 1.0);
    let set = sample(&scene, None, &SampleParams::new(1.0, 500).with_seed(6)).unwrap();
    let model = fit(&set, &seeded(4)).unwrap();
    let labels = predict(&model, &scene).unwrap();
    assert_eq!(labels.class_counts().iter().sum::<usize>(), 90_000);
}
