//! Export seam: hand a derived raster to a destination.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{BeadedError, Result};
use crate::io::brf;
use crate::raster::Raster;

/// What to export and where.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Output name, without extension.
    pub description: String,
    /// Requested ground distance per pixel.
    pub scale: f64,
    pub destination: PathBuf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub bytes: u64,
}

pub trait ExportSink {
    fn export(&self, raster: &Raster, request: &ExportRequest) -> Result<ExportReceipt>;
}

/// Writes `<destination>/<description>.brf`.
///
/// The requested scale is recorded in the header. Pixels are written at the
/// raster's native resolution.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalDirSink;

impl ExportSink for LocalDirSink {
    fn export(&self, raster: &Raster, request: &ExportRequest) -> Result<ExportReceipt> {
        if request.description.is_empty()
            || request.description.contains(['/', '\\'])
            || request.description.starts_with('.')
        {
            return Err(BeadedError::Export(format!(
                "invalid description '{}'",
                request.description
            )));
        }
        if !request.scale.is_finite() || request.scale <= 0.0 {
            return Err(BeadedError::Export(format!(
                "scale must be positive, got {}",
                request.scale
            )));
        }

        let export_err =
            |e: BeadedError| BeadedError::Export(format!("{}: {e}", request.description));

        std::fs::create_dir_all(&request.destination)
            .map_err(|e| export_err(e.into()))?;
        let path = request
            .destination
            .join(format!("{}.brf", request.description));
        brf::write_raster(&path, raster, &request.description, Some(request.scale))
            .map_err(export_err)?;
        let bytes = std::fs::metadata(&path)
            .map_err(|e| export_err(e.into()))?
            .len();

        info!(
            description = %request.description,
            path = %path.display(),
            scale = request.scale,
            bytes,
            "Exported raster"
        );
        Ok(ExportReceipt { path, bytes })
    }
}
