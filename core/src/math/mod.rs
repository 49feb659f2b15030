pub mod color;
pub mod interpolate;
pub mod projection;
pub mod range;
pub mod scaling;

pub use interpolate::{wrap_degrees, AzimuthSeries};
pub use projection::{nearest_angle_idx, SceneRange, ViewProjection};
pub use range::PlotRange;
pub use scaling::{ScaleMethod, Scaler};
