//! Core data model, parsers and plot transforms for antenna simulation output.
//!
//! The crate reads the text reports of NEC-2 and MININEC style solvers, EZNEC
//! far-field exports and antenna-range measurement CSV files into one model,
//! and turns that model into plot-ready arrays (scaled polar cuts, 3D surfaces,
//! VSWR series). Rendering itself lives in the front-end crates.

pub mod formats;
pub mod math;
pub mod model;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use formats::{detect, parse_file, parse_str, Dialect};
pub use model::{AntennaModel, FrequencySet, GainData, Geometry, Polarization, SwrSeries};
pub use prelude::{AntennaError, AntennaResult};
