use crate::prelude::{AntennaError, AntennaResult, FLOOR_DB};
use ndarray::{Array, Dimension};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default lower end of the linear dB scale.
pub const DEFAULT_MIN_DB: f64 = -50.0;

/// ARRL log-periodic scale factor: every 2 dB shrinks the radius by 0.89.
const ARRL_BASE: f64 = 1.0 / 0.89;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMethod {
    #[default]
    Arrl,
    Linear,
    LinearDb,
    LinearVoltage,
}

impl ScaleMethod {
    pub const ALL: [ScaleMethod; 4] = [
        ScaleMethod::Arrl,
        ScaleMethod::Linear,
        ScaleMethod::LinearDb,
        ScaleMethod::LinearVoltage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScaleMethod::Arrl => "arrl",
            ScaleMethod::Linear => "linear",
            ScaleMethod::LinearDb => "linear_db",
            ScaleMethod::LinearVoltage => "linear_voltage",
        }
    }
}

impl fmt::Display for ScaleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScaleMethod {
    type Err = AntennaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        ScaleMethod::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| {
                AntennaError::Config(format!(
                    "unknown scaling method \"{s}\", expected arrl, linear, linear_db or linear_voltage"
                ))
            })
    }
}

/// Maps gains relative to the pattern maximum onto a polar radius in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    method: ScaleMethod,
    min_db: f64,
}

impl Scaler {
    /// `min_db` only affects the linear dB scale but must be negative for
    /// every method.
    pub fn new(method: ScaleMethod, min_db: f64) -> AntennaResult<Self> {
        if !(min_db < 0.0) {
            return Err(AntennaError::Config(format!(
                "minimum dB of the scale must be < 0, got {min_db}"
            )));
        }
        Ok(Self { method, min_db })
    }

    pub fn method(&self) -> ScaleMethod {
        self.method
    }

    pub fn min_db(&self) -> f64 {
        self.min_db
    }

    pub fn with_method(self, method: ScaleMethod) -> Self {
        Self { method, ..self }
    }

    pub fn title(&self) -> &'static str {
        match self.method {
            ScaleMethod::Arrl => "ARRL",
            ScaleMethod::Linear => "Linear scale",
            ScaleMethod::LinearDb => "Linear dB",
            ScaleMethod::LinearVoltage => "Linear voltage",
        }
    }

    pub fn scale(&self, max_gain: f64, gain: f64) -> f64 {
        if gain <= FLOOR_DB {
            return 0.0;
        }
        let rel = gain - max_gain;
        match self.method {
            ScaleMethod::Arrl => ARRL_BASE.powf(rel / 2.0),
            ScaleMethod::Linear => 10f64.powf(rel / 10.0),
            ScaleMethod::LinearVoltage => 10f64.powf(rel / 20.0),
            ScaleMethod::LinearDb => (rel.max(self.min_db) - self.min_db) / -self.min_db,
        }
    }

    pub fn scale_all(&self, max_gain: f64, gains: &[f64]) -> Vec<f64> {
        gains.iter().map(|&g| self.scale(max_gain, g)).collect()
    }

    pub fn scale_array<D: Dimension>(&self, max_gain: f64, gains: &Array<f64, D>) -> Array<f64, D> {
        gains.mapv(|g| self.scale(max_gain, g))
    }

    /// Gain relative to the maximum for a radius; the inverse of
    /// `scale(0.0, _)` above the scale floor.
    pub fn invscale(&self, radius: f64) -> f64 {
        match self.method {
            ScaleMethod::Arrl => radius.ln() / ARRL_BASE.ln() * 2.0,
            ScaleMethod::Linear => 10.0 * radius.log10(),
            ScaleMethod::LinearVoltage => 20.0 * radius.log10(),
            ScaleMethod::LinearDb => radius * -self.min_db + self.min_db,
        }
    }

    /// Tick positions in dB relative to the maximum.
    pub fn ticks(&self) -> Vec<f64> {
        match self.method {
            ScaleMethod::Arrl => vec![0.0, -3.0, -6.0, -10.0, -20.0, -30.0],
            ScaleMethod::Linear => vec![0.0, -3.0, -6.0, -10.0],
            ScaleMethod::LinearVoltage => vec![0.0, -3.0, -6.0, -10.0, -20.0],
            ScaleMethod::LinearDb => {
                let mut ticks = Vec::new();
                let mut tick = 0.0;
                while tick > self.min_db - 10.0 {
                    ticks.push(tick);
                    tick -= 10.0;
                }
                ticks
            }
        }
    }

    /// Tick positions as radii.
    pub fn tick_values(&self) -> Vec<f64> {
        self.scale_all(0.0, &self.ticks())
    }

    /// Tick labels; the outer ring stays unlabeled.
    pub fn tick_text(&self) -> Vec<String> {
        self.ticks()
            .iter()
            .enumerate()
            .map(|(i, t)| if i == 0 { String::new() } else { format!("{t:.0}") })
            .collect()
    }
}

impl Default for Scaler {
    fn default() -> Self {
        Self {
            method: ScaleMethod::default(),
            min_db: DEFAULT_MIN_DB,
        }
    }
}
