//! `.brf`: a minimal little-endian band-sequential float raster container.
//!
//! Layout: magic (8) | version u16 | width u32 | height u32 | band count u16 |
//! origin_x, origin_y, pixel_width, pixel_height, export scale (f64 each) |
//! description (u16 length + UTF-8) | band names (u16 length + UTF-8 each) |
//! f32 samples, one band after another.

use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use memmap2::Mmap;
use ndarray::Array2;

use crate::consts::{BRF_MAGIC, BRF_VERSION};
use crate::error::{BeadedError, Result};
use crate::raster::{Band, GeoTransform, Raster};

/// Parsed `.brf` header.
#[derive(Clone, Debug, PartialEq)]
pub struct BrfHeader {
    pub width: u32,
    pub height: u32,
    pub transform: GeoTransform,
    /// Scale requested at export time, if the file came from an export.
    pub export_scale: Option<f64>,
    pub description: String,
    pub band_names: Vec<String>,
}

impl BrfHeader {
    /// Bytes per band, `None` when the dimensions overflow `usize`.
    pub fn band_byte_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(std::mem::size_of::<f32>())
    }

    /// Bytes of sample data after the header.
    pub fn data_byte_size(&self) -> Option<usize> {
        self.band_byte_size()?.checked_mul(self.band_names.len())
    }
}

/// Memory-mapped `.brf` reader.
pub struct BrfReader {
    mmap: Mmap,
    data_offset: usize,
    pub header: BrfHeader,
}

impl BrfReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < BRF_MAGIC.len() || &mmap[..BRF_MAGIC.len()] != BRF_MAGIC {
            return Err(BeadedError::InvalidRaster(format!(
                "{}: missing BEADEDRF magic",
                path.display()
            )));
        }

        let mut cursor = Cursor::new(&mmap[BRF_MAGIC.len()..]);
        let header = parse_header(&mut cursor).map_err(|e| match e {
            BeadedError::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                BeadedError::InvalidRaster("truncated header".into())
            }
            other => other,
        })?;
        let data_offset = BRF_MAGIC.len() + cursor.position() as usize;

        let expected = header
            .data_byte_size()
            .and_then(|n| n.checked_add(data_offset))
            .ok_or_else(|| {
                BeadedError::InvalidRaster(format!(
                    "{}: dimensions {}x{} too large",
                    path.display(),
                    header.width,
                    header.height
                ))
            })?;
        if mmap.len() < expected {
            return Err(BeadedError::InvalidRaster(format!(
                "file truncated: expected at least {} bytes, got {}",
                expected,
                mmap.len()
            )));
        }

        Ok(Self {
            mmap,
            data_offset,
            header,
        })
    }

    pub fn band_count(&self) -> usize {
        self.header.band_names.len()
    }

    /// Decode one band.
    pub fn read_band(&self, index: usize) -> Result<Band> {
        let name = self.header.band_names.get(index).ok_or_else(|| {
            BeadedError::invalid_parameter(
                "band index",
                index,
                format!("file has {} band(s)", self.band_count()),
            )
        })?;
        let size = self
            .header
            .band_byte_size()
            .ok_or_else(|| BeadedError::InvalidRaster("band size overflows".into()))?;
        let start = self.data_offset + index * size;
        let raw = &self.mmap[start..start + size];

        let h = self.header.height as usize;
        let w = self.header.width as usize;
        let mut values = vec![0.0f32; h * w];
        Cursor::new(raw).read_f32_into::<LittleEndian>(&mut values)?;
        let data = Array2::from_shape_vec((h, w), values)
            .map_err(|e| BeadedError::InvalidRaster(e.to_string()))?;
        Ok(Band::new(name.clone(), data))
    }

    pub fn read_raster(&self) -> Result<Raster> {
        let bands = (0..self.band_count())
            .map(|i| self.read_band(i))
            .collect::<Result<Vec<_>>>()?;
        Raster::new(bands, self.header.transform)
    }
}

/// Convenience: open and decode a whole file.
pub fn read_raster(path: &Path) -> Result<Raster> {
    BrfReader::open(path)?.read_raster()
}

/// Write a raster. `description` and `export_scale` are stored in the header.
pub fn write_raster(
    path: &Path,
    raster: &Raster,
    description: &str,
    export_scale: Option<f64>,
) -> Result<()> {
    let (h, w) = raster.shape();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(BRF_MAGIC)?;
    writer.write_u16::<LittleEndian>(BRF_VERSION)?;
    writer.write_u32::<LittleEndian>(to_u32("width", w)?)?;
    writer.write_u32::<LittleEndian>(to_u32("height", h)?)?;
    let band_count = u16::try_from(raster.band_count())
        .map_err(|_| BeadedError::invalid_parameter("bands", raster.band_count(), "too many bands"))?;
    writer.write_u16::<LittleEndian>(band_count)?;

    let t = raster.transform();
    writer.write_f64::<LittleEndian>(t.origin_x)?;
    writer.write_f64::<LittleEndian>(t.origin_y)?;
    writer.write_f64::<LittleEndian>(t.pixel_width)?;
    writer.write_f64::<LittleEndian>(t.pixel_height)?;
    writer.write_f64::<LittleEndian>(export_scale.unwrap_or(0.0))?;

    write_string(&mut writer, description)?;
    for band in raster.bands() {
        write_string(&mut writer, &band.name)?;
    }

    for band in raster.bands() {
        for &v in band.data.iter() {
            writer.write_f32::<LittleEndian>(v)?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn parse_header(cursor: &mut Cursor<&[u8]>) -> Result<BrfHeader> {
    let version = cursor.read_u16::<LittleEndian>()?;
    if version != BRF_VERSION {
        return Err(BeadedError::InvalidRaster(format!(
            "unsupported version {version}"
        )));
    }
    let width = cursor.read_u32::<LittleEndian>()?;
    let height = cursor.read_u32::<LittleEndian>()?;
    let band_count = cursor.read_u16::<LittleEndian>()?;
    if width == 0 || height == 0 || band_count == 0 {
        return Err(BeadedError::InvalidRaster(format!(
            "empty raster: {width}x{height}, {band_count} band(s)"
        )));
    }

    let origin_x = cursor.read_f64::<LittleEndian>()?;
    let origin_y = cursor.read_f64::<LittleEndian>()?;
    let pixel_width = cursor.read_f64::<LittleEndian>()?;
    let pixel_height = cursor.read_f64::<LittleEndian>()?;
    let scale = cursor.read_f64::<LittleEndian>()?;

    let description = read_string(cursor)?;
    let band_names = (0..band_count)
        .map(|_| read_string(cursor))
        .collect::<Result<Vec<_>>>()?;

    Ok(BrfHeader {
        width,
        height,
        transform: GeoTransform::new(origin_x, origin_y, pixel_width, pixel_height),
        export_scale: (scale > 0.0).then_some(scale),
        description,
        band_names,
    })
}

fn read_string(cursor: &mut Cursor<&[u8]>) -> Result<String> {
    let len = cursor.read_u16::<LittleEndian>()? as usize;
    let mut buf = vec![0u8; len];
    cursor.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| BeadedError::InvalidRaster(e.to_string()))
}

fn write_string(w: &mut impl Write, s: &str) -> Result<()> {
    let len = u16::try_from(s.len())
        .map_err(|_| BeadedError::invalid_parameter("string", s.len(), "longer than 65535 bytes"))?;
    w.write_u16::<LittleEndian>(len)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn to_u32(name: &'static str, v: usize) -> Result<u32> {
    u32::try_from(v).map_err(|_| BeadedError::invalid_parameter(name, v, "exceeds u32"))
}
