/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Value written to index pixels that have no defined result (both input
/// bands zero, or an input already carries no-data).
pub const NO_DATA: f32 = -9999.0;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f32 = 1e-10;

/// Band name given to computed water-index rasters.
pub const MNDWI_BAND: &str = "MNDWI";

/// MNDWI threshold for the 4-band commercial (Planet) imagery.
pub const PLANET_THRESHOLD: f32 = -0.5;

/// MNDWI threshold for Sentinel-2 surface reflectance.
pub const SENTINEL2_THRESHOLD: f32 = -0.75;

/// Native sampling scale of the Planet collection, in metres per pixel.
pub const PLANET_SCALE: f64 = 3.0;

/// Sampling scale used for Sentinel-2, in metres per pixel.
pub const SENTINEL2_SCALE: f64 = 10.0;

/// Default number of k-means clusters.
pub const DEFAULT_CLUSTER_COUNT: usize = 5;

/// Default upper bound on pixels drawn for clusterer training.
pub const DEFAULT_MAX_SAMPLES: usize = 5000;

/// Default cap on Lloyd iterations.
pub const DEFAULT_KMEANS_MAX_ITERATIONS: usize = 100;

/// Stop k-means once no centroid moves further than this (feature units).
pub const DEFAULT_KMEANS_CONVERGENCE: f64 = 1e-4;

/// Zoom level used when centring the map on the region of interest.
pub const DEFAULT_MAP_ZOOM: u8 = 14;

/// Magic bytes at the start of a `.brf` raster file.
pub const BRF_MAGIC: &[u8; 8] = b"BEADEDRF";

/// Current `.brf` format version.
pub const BRF_VERSION: u16 = 1;
