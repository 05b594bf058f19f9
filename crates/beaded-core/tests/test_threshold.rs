use beaded_core::consts::{MNDWI_BAND, NO_DATA};
use beaded_core::error::BeadedError;
use beaded_core::raster::{Band, GeoTransform, Raster};
use beaded_core::sensor::SensorProfile;
use beaded_core::threshold::threshold_below;
use ndarray::array;

fn index(values: ndarray::Array2<f32>) -> Raster {
    Raster::single(MNDWI_BAND, values, GeoTransform::default())
}

#[test]
fn test_strictly_below() {
    let mask = threshold_below(&index(array![[-0.9, -0.75, -0.74, 0.2]]), -0.75).unwrap();
    assert_eq!(mask.data, array![[1u8, 0, 0, 0]]);
}

#[test]
fn test_no_data_is_never_flagged() {
    let mask = threshold_below(&index(array![[NO_DATA, -0.99]]), 0.0).unwrap();
    assert_eq!(mask.data, array![[0u8, 1]]);
}

#[test]
fn test_sensor_thresholds() {
    let values = index(array![[-0.6, -0.8]]);
    let planet = threshold_below(&values, SensorProfile::planet().threshold).unwrap();
    let sentinel = threshold_below(&values, SensorProfile::sentinel2().threshold).unwrap();
    assert_eq!(planet.data, array![[1u8, 1]]);
    assert_eq!(sentinel.data, array![[0u8, 1]]);
}

#[test]
fn test_non_finite_threshold_rejected() {
    let err = threshold_below(&index(array![[0.0]]), f32::NAN).unwrap_err();
    assert!(matches!(err, BeadedError::Configuration(_)));
}

#[test]
fn test_multi_band_input_rejected() {
    let two = Raster::new(
        vec![Band::new("a", array![[0.0]]), Band::new("b", array![[0.0]])],
        GeoTransform::default(),
    )
    .unwrap();
    assert!(threshold_below(&two, 0.0).is_err());
}
