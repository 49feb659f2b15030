use crate::prelude::{AntennaError, AntennaResult};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Upper bound reported for a fully reflected feed point.
pub const MAX_VSWR: f64 = 999.0;

/// Feed-point impedance at one frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpedancePoint {
    pub frequency: f64,
    pub impedance: Complex64,
}

/// Named frequency band (MHz) highlighted in the VSWR chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub name: String,
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub fn new(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            low,
            high,
        }
    }

    /// True when the band touches the `[low, high]` frequency span.
    pub fn overlaps(&self, low: f64, high: f64) -> bool {
        (low <= self.low && self.low <= high)
            || (low <= self.high && self.high <= high)
            || (self.low <= low && high <= self.high)
    }

    /// Parses `name:low,high`.
    pub fn parse_spec(spec: &str) -> AntennaResult<Band> {
        let (name, range) = spec
            .split_once(':')
            .ok_or_else(|| AntennaError::Config(format!("band \"{spec}\": expected name:low,high")))?;
        let (low, high) = range
            .split_once(',')
            .ok_or_else(|| AntennaError::Config(format!("band \"{spec}\": expected low,high")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| AntennaError::Config(format!("band \"{spec}\": {e}")))
        };
        Ok(Band::new(name.trim(), parse(low)?, parse(high)?))
    }
}

/// Amateur radio bands used when no `--band` option replaces them.
pub fn ham_bands() -> Vec<Band> {
    [
        ("70cm", 430.0, 440.0),
        ("2m", 144.0, 146.0),
        ("6m", 50.0, 52.0),
        ("10m", 28.0, 29.7),
        ("12m", 24.89, 24.99),
        ("15m", 21.0, 21.45),
        ("17m", 18.068, 18.168),
        ("20m", 14.0, 14.35),
        ("30m", 10.1, 10.15),
        ("40m", 7.0, 7.2),
        ("60m", 5.3513, 5.3665),
        ("80m", 3.5, 3.8),
        ("160m", 1.81, 1.95),
        ("630m", 0.472, 0.479),
    ]
    .into_iter()
    .map(|(name, low, high)| Band::new(name, low, high))
    .collect()
}

/// Applies `name:low,high` specs to a band list. A spec with `high <= low`
/// removes the named band, anything else adds or replaces it.
pub fn apply_band_specs(bands: &mut Vec<Band>, specs: &[String]) -> AntennaResult<()> {
    for spec in specs {
        let band = Band::parse_spec(spec)?;
        bands.retain(|b| b.name != band.name);
        if band.high > band.low {
            bands.push(band);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwrPoint {
    pub frequency: f64,
    pub impedance: Complex64,
    pub reflection: f64,
    pub vswr: f64,
}

/// Impedance sweep with derived standing-wave ratio. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SwrRecord")]
pub struct SwrSeries {
    z0: f64,
    points: Vec<SwrPoint>,
}

/// Wire form of [`SwrSeries`]; the derived columns are recomputed.
#[derive(Deserialize)]
struct SwrRecord {
    z0: f64,
    points: Vec<ImpedancePoint>,
}

impl TryFrom<SwrRecord> for SwrSeries {
    type Error = AntennaError;

    fn try_from(record: SwrRecord) -> AntennaResult<Self> {
        SwrSeries::new(&record.points, record.z0)
    }
}

impl SwrSeries {
    pub fn new(impedances: &[ImpedancePoint], z0: f64) -> AntennaResult<Self> {
        if !(z0 > 0.0 && z0.is_finite()) {
            return Err(AntennaError::Config(format!(
                "system impedance must be positive, got {z0}"
            )));
        }
        if impedances.is_empty() {
            return Err(AntennaError::Empty("no impedance data for VSWR".into()));
        }
        let mut points: Vec<SwrPoint> = impedances
            .iter()
            .map(|p| {
                let reflection = reflection_coefficient(p.impedance, z0).norm();
                SwrPoint {
                    frequency: p.frequency,
                    impedance: p.impedance,
                    reflection,
                    vswr: vswr_from_reflection(reflection),
                }
            })
            .collect();
        points.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
        Ok(Self { z0, points })
    }

    pub fn z0(&self) -> f64 {
        self.z0
    }

    pub fn points(&self) -> &[SwrPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.frequency).collect()
    }

    pub fn vswr(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.vswr).collect()
    }

    pub fn real(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.impedance.re).collect()
    }

    pub fn imag(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.impedance.im).collect()
    }

    pub fn magnitude(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.impedance.norm()).collect()
    }

    pub fn phase_deg(&self) -> Vec<f64> {
        self.points
            .iter()
            .map(|p| p.impedance.arg().to_degrees())
            .collect()
    }

    /// Impedances divided by the system impedance.
    pub fn normalized(&self) -> Vec<Complex64> {
        self.points.iter().map(|p| p.impedance / self.z0).collect()
    }

    /// Complex reflection coefficients, the Smith chart coordinates.
    pub fn reflections(&self) -> Vec<Complex64> {
        self.points
            .iter()
            .map(|p| reflection_coefficient(p.impedance, self.z0))
            .collect()
    }

    /// Point with the lowest VSWR; the first one wins on ties.
    pub fn minimum(&self) -> &SwrPoint {
        self.points
            .iter()
            .fold(&self.points[0], |best, p| if p.vswr < best.vswr { p } else { best })
    }

    pub fn frequency_range(&self) -> (f64, f64) {
        (
            self.points[0].frequency,
            self.points[self.points.len() - 1].frequency,
        )
    }

    pub fn contains_frequency(&self, frequency: f64) -> bool {
        let (lo, hi) = self.frequency_range();
        lo <= frequency && frequency <= hi
    }

    pub fn bands_in_range<'a>(&self, bands: &'a [Band]) -> Vec<&'a Band> {
        let (lo, hi) = self.frequency_range();
        bands.iter().filter(|b| b.overlaps(lo, hi)).collect()
    }
}

pub fn reflection_coefficient(z: Complex64, z0: f64) -> Complex64 {
    (z - z0) / (z + z0)
}

fn vswr_from_reflection(rho: f64) -> f64 {
    if rho >= 1.0 || !rho.is_finite() {
        MAX_VSWR
    } else {
        ((1.0 + rho) / (1.0 - rho)).min(MAX_VSWR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep() -> Vec<ImpedancePoint> {
        vec![
            ImpedancePoint {
                frequency: 14.3,
                impedance: Complex64::new(75.0, 20.0),
            },
            ImpedancePoint {
                frequency: 14.0,
                impedance: Complex64::new(50.0, 0.0),
            },
            ImpedancePoint {
                frequency: 14.1,
                impedance: Complex64::new(100.0, 0.0),
            },
        ]
    }

    #[test]
    fn matched_load_has_unity_vswr() {
        let series = SwrSeries::new(&sweep(), 50.0).unwrap();
        assert_eq!(series.frequencies(), vec![14.0, 14.1, 14.3]);
        assert!((series.points()[0].vswr - 1.0).abs() < 1e-12);
        assert!((series.points()[1].vswr - 2.0).abs() < 1e-12);
        assert_eq!(series.minimum().frequency, 14.0);
    }

    #[test]
    fn reactive_load_is_capped() {
        let points = [ImpedancePoint {
            frequency: 7.0,
            impedance: Complex64::new(0.0, 30.0),
        }];
        let series = SwrSeries::new(&points, 50.0).unwrap();
        assert_eq!(series.vswr(), vec![MAX_VSWR]);
    }

    #[test]
    fn bands_filtered_by_sweep_range() {
        let series = SwrSeries::new(&sweep(), 50.0).unwrap();
        let bands = ham_bands();
        let names: Vec<_> = series
            .bands_in_range(&bands)
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(names, vec!["20m"]);
    }

    #[test]
    fn band_specs_add_replace_and_remove() {
        let mut bands = ham_bands();
        apply_band_specs(
            &mut bands,
            &["20m:14.0,14.5".to_string(), "40m:1,0".to_string(), "x:1,2".to_string()],
        )
        .unwrap();
        assert!(bands.iter().all(|b| b.name != "40m"));
        let twenty = bands.iter().find(|b| b.name == "20m").unwrap();
        assert_eq!(twenty.high, 14.5);
        assert!(bands.iter().any(|b| b.name == "x"));
        assert!(apply_band_specs(&mut bands, &["broken".to_string()]).is_err());
    }

    #[test]
    fn rejects_non_positive_system_impedance() {
        assert!(SwrSeries::new(&sweep(), 0.0).is_err());
        assert!(SwrSeries::new(&[], 50.0).is_err());
    }
}
