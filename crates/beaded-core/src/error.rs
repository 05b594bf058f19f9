use thiserror::Error;

/// Invalid input supplied by the caller: a band that is not there, or a
/// parameter outside its valid range.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Band '{name}' not found (available: {available:?})")]
    MissingBand {
        name: String,
        available: Vec<String>,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Invalid visualization parameters: {0}")]
    InvalidVisParams(String),
}

#[derive(Error, Debug)]
pub enum BeadedError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Insufficient data: {samples} sample(s) for {k} clusters")]
    InsufficientData { samples: usize, k: usize },

    #[error("Raster size mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    DimensionMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid raster file: {0}")]
    InvalidRaster(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Image source error: {0}")]
    Source(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl BeadedError {
    pub(crate) fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ConfigurationError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
        .into()
    }
}

pub type Result<T> = std::result::Result<T, BeadedError>;
