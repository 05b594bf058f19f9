mod common;

use approx::assert_relative_eq;
use beaded_core::consts::{MNDWI_BAND, NO_DATA};
use beaded_core::error::{BeadedError, ConfigurationError};
use beaded_core::index::{mndwi, normalized_difference};
use beaded_core::sensor::SensorProfile;
use beaded_core::threshold::threshold_below;
use ndarray::array;

use common::sentinel_pair;

#[test]
fn test_mndwi_worked_example() {
    let raster = sentinel_pair(
        array![[0.6, 0.3], [0.1, 0.8]],
        array![[0.2, 0.1], [0.1, 0.4]],
    );
    let index = mndwi(&raster, &SensorProfile::sentinel2()).unwrap();
    assert_eq!(index.band_names(), vec![MNDWI_BAND]);

    let v = index.band(MNDWI_BAND).unwrap();
    assert_relative_eq!(v[[0, 0]], 0.5, epsilon = 1e-6);
    assert_relative_eq!(v[[0, 1]], 0.5, epsilon = 1e-6);
    assert_relative_eq!(v[[1, 0]], 0.0, epsilon = 1e-6);
    assert_relative_eq!(v[[1, 1]], 1.0 / 3.0, epsilon = 1e-6);

    let mask = threshold_below(&index, -0.5).unwrap();
    assert_eq!(mask.count_set(), 0);
}

#[test]
fn test_zero_bands_give_no_data() {
    let raster = sentinel_pair(array![[0.0, 0.4]], array![[0.0, 0.4]]);
    let index = mndwi(&raster, &SensorProfile::sentinel2()).unwrap();
    let v = index.band(MNDWI_BAND).unwrap();
    assert_eq!(v[[0, 0]], NO_DATA);
    assert!(!v[[0, 0]].is_nan());
    assert_relative_eq!(v[[0, 1]], 0.0);
}

#[test]
fn test_values_stay_in_unit_range() {
    let raster = sentinel_pair(
        array![[0.0, 1.0, 5000.0], [12.0, 0.001, 3.0]],
        array![[1.0, 0.0, 1.0], [4000.0, 0.5, 3.0]],
    );
    let index = mndwi(&raster, &SensorProfile::sentinel2()).unwrap();
    for &v in index.band(MNDWI_BAND).unwrap().iter() {
        assert!((-1.0..=1.0).contains(&v), "{v} out of range");
    }
}

#[test]
fn test_negative_reflectance_stays_in_unit_range() {
    let raster = sentinel_pair(
        array![[1.0, -0.5, -0.02], [0.3, -0.1, 0.05]],
        array![[-0.5, 1.0, 0.4], [-0.2, -0.3, -0.01]],
    );
    let index = mndwi(&raster, &SensorProfile::sentinel2()).unwrap();
    let v = index.band(MNDWI_BAND).unwrap();
    for &x in v.iter() {
        assert!((-1.0..=1.0).contains(&x), "{x} out of range");
    }
    assert_relative_eq!(v[[0, 0]], 1.0);
    assert_relative_eq!(v[[0, 1]], -1.0);
    assert_relative_eq!(v[[1, 1]], -0.5, epsilon = 1e-6);
}

#[test]
fn test_missing_band_reports_available() {
    let raster = sentinel_pair(array![[0.1]], array![[0.2]]);
    let err = mndwi(&raster, &SensorProfile::planet()).unwrap_err();
    match err {
        BeadedError::Configuration(ConfigurationError::MissingBand { name, available }) => {
            assert_eq!(name, "B2");
            assert_eq!(available, vec!["B3".to_string(), "B8".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_normalized_difference_keeps_transform() {
    let scene = common::sentinel_scene(4, 6, 0.001);
    let nd = normalized_difference(&scene, "B3", "B8").unwrap();
    assert_eq!(nd.shape(), (4, 6));
    assert_eq!(nd.transform(), scene.transform());
    assert_eq!(nd.band_names(), vec!["B3_B8_ND"]);
}
