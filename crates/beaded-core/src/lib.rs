pub mod cluster;
pub mod consts;
pub mod error;
pub mod export;
pub mod index;
pub mod io;
pub mod pipeline;
pub mod raster;
pub mod region;
pub mod render;
pub mod sample;
pub mod sensor;
pub mod source;
pub mod threshold;
