use crate::math::interpolate::AzimuthSeries;
use crate::model::angle::{AnglePair, Frequency};
use crate::prelude::{AntennaError, AntennaResult};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Polarization component a pattern was reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Polarization {
    Horizontal,
    Vertical,
    Sum,
}

impl Polarization {
    pub fn label(&self) -> &'static str {
        match self {
            Polarization::Horizontal => "H",
            Polarization::Vertical => "V",
            Polarization::Sum => "sum",
        }
    }
}

impl fmt::Display for Polarization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Polarization {
    type Err = AntennaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "horizontal" => Ok(Polarization::Horizontal),
            "v" | "vertical" => Ok(Polarization::Vertical),
            "sum" | "total" | "tot" => Ok(Polarization::Sum),
            other => Err(AntennaError::Config(format!(
                "unknown polarization \"{other}\", expected sum, h or v"
            ))),
        }
    }
}

/// Unit of the stored gain values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GainUnit {
    #[default]
    Dbi,
    Dbm,
}

impl GainUnit {
    pub fn label(&self) -> &'static str {
        match self {
            GainUnit::Dbi => "dBi",
            GainUnit::Dbm => "dBm",
        }
    }

    /// Maps a unit column from measurement data; anything that is not dBm is
    /// treated as dBi.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("dbm") {
            GainUnit::Dbm
        } else {
            GainUnit::Dbi
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainSample {
    pub angles: AnglePair,
    pub gain: f64,
}

/// Radiation pattern for one frequency and polarization.
///
/// Samples are kept sorted by angle pair and never change after the
/// [`PatternBuilder`] that produced them is finished. Deserialized data goes
/// through the builder as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GainRecord")]
pub struct GainData {
    frequency: Frequency,
    polarization: Polarization,
    unit: GainUnit,
    samples: Vec<GainSample>,
}

/// Wire form of [`GainData`], accepted in any sample order.
#[derive(Deserialize)]
struct GainRecord {
    frequency: Frequency,
    polarization: Polarization,
    #[serde(default)]
    unit: GainUnit,
    samples: Vec<GainSample>,
}

impl TryFrom<GainRecord> for GainData {
    type Error = AntennaError;

    fn try_from(record: GainRecord) -> AntennaResult<Self> {
        let mut builder =
            PatternBuilder::new(record.frequency.mhz(), record.polarization).with_unit(record.unit);
        for sample in &record.samples {
            let AnglePair { theta, phi } = sample.angles;
            if builder.contains(theta, phi) {
                return Err(AntennaError::IncompleteGrid(format!(
                    "duplicate sample at theta={theta} phi={phi}"
                )));
            }
            builder.insert(theta, phi, sample.gain)?;
        }
        Ok(builder.finish())
    }
}

impl GainData {
    /// Builds pattern data from a gains array indexed `[theta, phi]`.
    pub fn from_grid(
        frequency: f64,
        polarization: Polarization,
        thetas: &[f64],
        phis: &[f64],
        gains: ArrayView2<f64>,
    ) -> AntennaResult<Self> {
        if gains.dim() != (thetas.len(), phis.len()) {
            return Err(AntennaError::IncompleteGrid(format!(
                "gains shape {:?} does not match {} thetas x {} phis",
                gains.dim(),
                thetas.len(),
                phis.len()
            )));
        }
        let mut builder = PatternBuilder::new(frequency, polarization);
        for (i, &theta) in thetas.iter().enumerate() {
            for (j, &phi) in phis.iter().enumerate() {
                builder.insert(theta, phi, gains[[i, j]])?;
            }
        }
        Ok(builder.finish())
    }

    pub fn frequency(&self) -> f64 {
        self.frequency.mhz()
    }

    pub fn key(&self) -> (Frequency, Polarization) {
        (self.frequency, self.polarization)
    }

    pub fn polarization(&self) -> Polarization {
        self.polarization
    }

    pub fn unit(&self) -> GainUnit {
        self.unit
    }

    pub fn samples(&self) -> &[GainSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn gain(&self, theta: f64, phi: f64) -> Option<f64> {
        let key = AnglePair::new(theta, phi);
        self.samples
            .binary_search_by(|sample| sample.angles.cmp(&key))
            .ok()
            .map(|idx| self.samples[idx].gain)
    }

    pub fn max_gain(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.gain).reduce(f64::max)
    }

    /// Sorted, distinct zenith angles.
    pub fn thetas(&self) -> Vec<f64> {
        let mut thetas: Vec<f64> = self.samples.iter().map(|s| s.angles.theta).collect();
        thetas.dedup_by(|a, b| a.total_cmp(b).is_eq());
        thetas
    }

    /// Sorted, distinct azimuth angles over all zenith rows.
    pub fn phis(&self) -> Vec<f64> {
        let mut phis: Vec<f64> = self.samples.iter().map(|s| s.angles.phi).collect();
        phis.sort_by(f64::total_cmp);
        phis.dedup_by(|a, b| a.total_cmp(b).is_eq());
        phis
    }

    /// `(phi, gain)` pairs of one zenith row, sorted by azimuth.
    pub fn azimuth_row(&self, theta: f64) -> Vec<(f64, f64)> {
        let start = self
            .samples
            .partition_point(|s| s.angles.theta.total_cmp(&theta).is_lt());
        self.samples[start..]
            .iter()
            .take_while(|s| s.angles.theta.total_cmp(&theta).is_eq())
            .map(|s| (s.angles.phi, s.gain))
            .collect()
    }

    /// Resamples every zenith row onto a regular azimuth grid of `step`
    /// degrees starting at 0°.
    pub fn interpolate_azimuth(&self, step: f64) -> AntennaResult<GainData> {
        let mut builder =
            PatternBuilder::new(self.frequency(), self.polarization).with_unit(self.unit);
        for theta in self.thetas() {
            let series = AzimuthSeries::new(self.azimuth_row(theta))?;
            for (phi, gain) in series.resample(step)? {
                builder.insert(theta, phi, gain)?;
            }
        }
        Ok(builder.finish())
    }
}

/// Mutable collector used by the parsers; `finish` freezes it into a
/// [`GainData`].
#[derive(Debug, Clone)]
pub struct PatternBuilder {
    frequency: Frequency,
    polarization: Polarization,
    unit: GainUnit,
    pattern: BTreeMap<AnglePair, f64>,
}

impl PatternBuilder {
    pub fn new(frequency: f64, polarization: Polarization) -> Self {
        Self {
            frequency: Frequency(frequency),
            polarization,
            unit: GainUnit::Dbi,
            pattern: BTreeMap::new(),
        }
    }

    pub fn with_unit(mut self, unit: GainUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Stores a sample, replacing an earlier one at the same angles.
    pub fn insert(&mut self, theta: f64, phi: f64, gain: f64) -> AntennaResult<()> {
        if !gain.is_finite() || !theta.is_finite() || !phi.is_finite() {
            return Err(AntennaError::InvalidGain {
                theta,
                phi,
                value: gain,
            });
        }
        self.pattern.insert(AnglePair::new(theta, phi), gain);
        Ok(())
    }

    pub fn contains(&self, theta: f64, phi: f64) -> bool {
        self.pattern.contains_key(&AnglePair::new(theta, phi))
    }

    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    pub fn finish(self) -> GainData {
        GainData {
            frequency: self.frequency,
            polarization: self.polarization,
            unit: self.unit,
            samples: self
                .pattern
                .into_iter()
                .map(|(angles, gain)| GainSample { angles, gain })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_data() -> GainData {
        let mut builder = PatternBuilder::new(14.2, Polarization::Sum);
        builder.insert(90.0, 90.0, -1.0).unwrap();
        builder.insert(90.0, 0.0, 2.5).unwrap();
        builder.insert(80.0, 0.0, 4.0).unwrap();
        builder.insert(90.0, 180.0, -3.0).unwrap();
        builder.insert(90.0, 270.0, 0.5).unwrap();
        builder.finish()
    }

    #[test]
    fn builder_sorts_samples_and_looks_them_up() {
        let data = sample_data();
        assert_eq!(data.len(), 5);
        assert_eq!(data.gain(90.0, 0.0), Some(2.5));
        assert_eq!(data.gain(90.0, 45.0), None);
        assert_eq!(data.thetas(), vec![80.0, 90.0]);
        assert_eq!(data.max_gain(), Some(4.0));
    }

    #[test]
    fn deserialized_samples_are_resorted() {
        let data = sample_data();
        let mut value = serde_json::to_value(&data).unwrap();
        let samples = value["samples"].as_array_mut().unwrap();
        samples.reverse();
        let back: GainData = serde_json::from_value(value).unwrap();
        assert_eq!(back, data);
        assert_eq!(back.gain(90.0, 0.0), Some(2.5));
    }

    #[test]
    fn deserialization_rejects_duplicate_and_non_finite_samples() {
        let mut value = serde_json::to_value(sample_data()).unwrap();
        let samples = value["samples"].as_array_mut().unwrap();
        let first = samples[0].clone();
        samples.push(first);
        assert!(serde_json::from_value::<GainData>(value).is_err());

        let text = r#"{"frequency":7.0,"polarization":"Sum","unit":"Dbi",
            "samples":[{"angles":{"theta":90.0,"phi":0.0},"gain":null}]}"#;
        assert!(serde_json::from_str::<GainData>(text).is_err());
    }

    #[test]
    fn builder_rejects_non_finite_gain() {
        let mut builder = PatternBuilder::new(7.0, Polarization::Sum);
        assert!(matches!(
            builder.insert(0.0, 0.0, f64::NAN),
            Err(AntennaError::InvalidGain { .. })
        ));
        assert!(builder.is_empty());
    }

    #[test]
    fn azimuth_row_returns_one_theta() {
        let data = sample_data();
        let row = data.azimuth_row(90.0);
        assert_eq!(
            row,
            vec![(0.0, 2.5), (90.0, -1.0), (180.0, -3.0), (270.0, 0.5)]
        );
    }

    #[test]
    fn interpolation_keeps_sampled_points() {
        let data = sample_data();
        let fine = data.interpolate_azimuth(45.0).unwrap();
        assert_eq!(fine.gain(90.0, 90.0), Some(-1.0));
        assert_eq!(fine.gain(90.0, 0.0), Some(2.5));
        let mid = fine.gain(90.0, 45.0).unwrap();
        assert!((mid - 0.75).abs() < 1e-12);
        let wrap = fine.gain(90.0, 315.0).unwrap();
        assert!((wrap - 1.5).abs() < 1e-12);
    }

    #[test]
    fn from_grid_checks_shape() {
        let gains = array![[0.0, 1.0], [2.0, 3.0]];
        let data =
            GainData::from_grid(430.0, Polarization::Sum, &[0.0, 90.0], &[0.0, 90.0], gains.view())
                .unwrap();
        assert_eq!(data.gain(90.0, 90.0), Some(3.0));
        assert!(GainData::from_grid(
            430.0,
            Polarization::Sum,
            &[0.0],
            &[0.0, 90.0],
            gains.view()
        )
        .is_err());
    }

    #[test]
    fn polarization_parses_short_names() {
        assert_eq!("H".parse::<Polarization>().unwrap(), Polarization::Horizontal);
        assert_eq!("sum".parse::<Polarization>().unwrap(), Polarization::Sum);
        assert!("x".parse::<Polarization>().is_err());
    }
}
