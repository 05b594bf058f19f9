pub mod brf;
pub mod image_io;

pub use brf::{read_raster, write_raster, BrfHeader, BrfReader};
pub use image_io::{load_band, save_png};
