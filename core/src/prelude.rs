use std::path::PathBuf;

pub use crate::math::scaling::{ScaleMethod, Scaler};
pub use crate::model::{AnglePair, Frequency, GainUnit, Polarization};

/// Gain value used by several solvers for a nulled pattern direction.
pub const FLOOR_DB: f64 = -999.99;

/// Common error type for parsing and transforming antenna data.
#[derive(thiserror::Error, Debug)]
pub enum AntennaError {
    #[error("{name}: unrecognized file format")]
    UnrecognizedFormat { name: String },
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
    #[error("non-finite gain {value} at theta={theta} phi={phi}")]
    InvalidGain { theta: f64, phi: f64, value: f64 },
    #[error("incomplete pattern grid: {0}")]
    IncompleteGrid(String),
    #[error("no azimuth opposite to {0:.2}° for the elevation cut")]
    NoOppositeAzimuth(f64),
    #[error("geometry: {0}")]
    Geometry(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("no data: {0}")]
    Empty(String),
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AntennaError {
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }
}

pub type AntennaResult<T> = Result<T, AntennaError>;
