use std::path::Path;

use image::{ImageFormat, RgbImage};
use ndarray::Array2;

use crate::error::Result;

/// Load a single-channel image (TIFF, PNG, ...) as raw digital numbers.
///
/// Values are widened to 16 bits and kept unscaled, so a reflectance product
/// stored as `u16` round-trips as its integer DN.
pub fn load_band(path: &Path) -> Result<Array2<f32>> {
    let img = image::open(path)?;
    let gray = img.to_luma16();
    let (w, h) = gray.dimensions();
    let mut data = Array2::<f32>::zeros((h as usize, w as usize));

    for (col, row, pixel) in gray.enumerate_pixels() {
        data[[row as usize, col as usize]] = pixel.0[0] as f32;
    }

    Ok(data)
}

/// Save an 8-bit RGB image as PNG.
pub fn save_png(img: &RgbImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    #[test]
    fn test_load_band_keeps_digital_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b3.png");
        let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(2, 1, vec![1200, 4500]).unwrap();
        img.save(&path).unwrap();

        let band = load_band(&path).unwrap();
        assert_eq!(band.dim(), (1, 2));
        assert_eq!(band[[0, 0]], 1200.0);
        assert_eq!(band[[0, 1]], 4500.0);
    }
}
