pub mod angle;
pub mod antenna;
pub mod frequency;
pub mod gain;
pub mod geometry;
pub mod swr;

pub use angle::{AnglePair, Frequency};
pub use antenna::AntennaModel;
pub use frequency::FrequencySet;
pub use gain::{GainData, GainSample, GainUnit, PatternBuilder, Polarization};
pub use geometry::{Geometry, Point3};
pub use swr::{Band, ImpedancePoint, SwrPoint, SwrSeries};
