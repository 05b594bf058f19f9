#![allow(dead_code)]

use std::path::{Path, PathBuf};

use beaded_core::io::brf;
use beaded_core::raster::{Band, GeoTransform, Raster};
use image::{ImageBuffer, Luma};
use ndarray::Array2;

/// Upper-left corner of the synthetic scenes, just north-west of the lake.
pub const SCENE_ORIGIN: (f64, f64) = (-148.83, 69.50);

/// North-up transform at the given pixel size anchored at [`SCENE_ORIGIN`].
pub fn scene_transform(pixel_size: f64) -> GeoTransform {
    GeoTransform::square(SCENE_ORIGIN.0, SCENE_ORIGIN.1, pixel_size)
}

/// Two-band raster with the Sentinel-2 green/NIR names.
pub fn sentinel_pair(green: Array2<f32>, nir: Array2<f32>) -> Raster {
    Raster::new(
        vec![Band::new("B3", green), Band::new("B8", nir)],
        GeoTransform::default(),
    )
    .unwrap()
}

/// Synthetic scene: the left half of every row is "water" (high green, low
/// NIR), the right half is "land", with a small ramp so no two pixels match.
pub fn water_land_band(rows: usize, cols: usize, water: f32, land: f32) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let base = if c < cols / 2 { water } else { land };
        base + ((r * cols + c) % 17) as f32
    })
}

/// Sentinel-2-like scene with bands B3, B4, B8.
pub fn sentinel_scene(rows: usize, cols: usize, pixel_size: f64) -> Raster {
    Raster::new(
        vec![
            Band::new("B3", water_land_band(rows, cols, 1800.0, 600.0)),
            Band::new("B4", water_land_band(rows, cols, 900.0, 700.0)),
            Band::new("B8", water_land_band(rows, cols, 300.0, 4200.0)),
        ],
        scene_transform(pixel_size),
    )
    .unwrap()
}

/// Write a raster to `<dir>/<name>` and return the path.
pub fn write_brf(dir: &Path, name: &str, raster: &Raster) -> PathBuf {
    let path = dir.join(name);
    brf::write_raster(&path, raster, name, None).unwrap();
    path
}

/// Write a band as a 16-bit grayscale PNG (values are truncated to u16).
pub fn write_band_png(dir: &Path, name: &str, data: &Array2<f32>) -> PathBuf {
    let (h, w) = data.dim();
    let pixels: Vec<u16> = data.iter().map(|&v| v as u16).collect();
    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels).unwrap();
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

/// Catalog with three Sentinel-2 scenes (one outside the summer window),
/// one 4-band Planet scene stored as PNG band files, and an elevation model.
pub fn write_test_catalog(dir: &Path) -> PathBuf {
    let s2 = sentinel_scene(20, 40, 0.001);
    write_brf(dir, "s2_0715.brf", &s2);
    write_brf(dir, "s2_0802.brf", &s2);
    write_brf(dir, "s2_0910.brf", &s2);

    let (rows, cols) = (40, 80);
    write_band_png(dir, "ps_b1.png", &water_land_band(rows, cols, 700.0, 500.0));
    write_band_png(dir, "ps_b2.png", &water_land_band(rows, cols, 1500.0, 600.0));
    write_band_png(dir, "ps_b3.png", &water_land_band(rows, cols, 800.0, 900.0));
    write_band_png(dir, "ps_b4.png", &water_land_band(rows, cols, 200.0, 3500.0));

    let dem = Raster::single(
        "elevation",
        Array2::from_shape_fn((10, 20), |(r, c)| 160.0 + (r + c) as f32),
        scene_transform(0.002),
    );
    write_brf(dir, "dem.brf", &dem);

    let manifest = format!(
        r#"
[[image]]
id = "S2_20190715"
collection = "COPERNICUS/S2_SR"
date = "2019-07-15"
path = "s2_0715.brf"
[image.properties]
CLOUDY_PIXEL_PERCENTAGE = 12.0

[[image]]
id = "S2_20190802"
collection = "COPERNICUS/S2_SR"
date = "2019-08-02"
path = "s2_0802.brf"
[image.properties]
CLOUDY_PIXEL_PERCENTAGE = 3.2

[[image]]
id = "S2_20190910"
collection = "COPERNICUS/S2_SR"
date = "2019-09-10"
path = "s2_0910.brf"
[image.properties]
CLOUDY_PIXEL_PERCENTAGE = 0.5

[[image]]
id = "PS_20190720"
collection = "planet_beaded"
date = "2019-07-20"
origin_x = {x}
origin_y = {y}
pixel_size = 0.0005
[image.bands]
B1 = "ps_b1.png"
B2 = "ps_b2.png"
B3 = "ps_b3.png"
B4 = "ps_b4.png"

[[elevation]]
id = "UMN/PGC/ArcticDEM/V2/5m"
path = "dem.brf"
"#,
        x = SCENE_ORIGIN.0,
        y = SCENE_ORIGIN.1,
    );
    let path = dir.join("catalog.toml");
    std::fs::write(&path, manifest).unwrap();
    path
}
