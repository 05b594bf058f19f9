pub mod draw;
pub mod layers;
pub mod palette;
pub mod presenter;
pub mod vis;

pub use layers::{LayerRequest, LayerSource, MapCenter, MapComposition};
pub use palette::{Palette, Rgb};
pub use presenter::{PngPresenter, Presenter, TracingPresenter};
pub use vis::{BandSpec, PerBand, ResolvedVis, VisParams};
