use crate::formats::Dialect;
use crate::model::frequency::FrequencySet;
use crate::model::gain::{GainData, GainUnit, Polarization};
use crate::model::geometry::Geometry;
use crate::model::swr::{ImpedancePoint, SwrSeries};
use crate::prelude::{AntennaError, AntennaResult};
use serde::{Deserialize, Serialize};

/// Everything parsed from one report file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ModelRecord")]
pub struct AntennaModel {
    pub title: String,
    pub dialect: Dialect,
    gains: Vec<GainData>,
    impedances: Vec<ImpedancePoint>,
    geometry: Geometry,
}

#[derive(Deserialize)]
struct ModelRecord {
    #[serde(default)]
    title: String,
    dialect: Dialect,
    gains: Vec<GainData>,
    #[serde(default)]
    impedances: Vec<ImpedancePoint>,
    #[serde(default)]
    geometry: Geometry,
}

impl From<ModelRecord> for AntennaModel {
    fn from(record: ModelRecord) -> Self {
        AntennaModel::new(record.dialect, record.gains, record.impedances, record.geometry)
            .with_title(record.title)
    }
}

impl AntennaModel {
    pub fn new(
        dialect: Dialect,
        mut gains: Vec<GainData>,
        mut impedances: Vec<ImpedancePoint>,
        geometry: Geometry,
    ) -> Self {
        gains.sort_by(|a, b| a.key().cmp(&b.key()));
        impedances.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
        Self {
            title: String::new(),
            dialect,
            gains,
            impedances,
            geometry,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn gains(&self) -> &[GainData] {
        &self.gains
    }

    pub fn impedances(&self) -> &[ImpedancePoint] {
        &self.impedances
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn has_impedance(&self) -> bool {
        !self.impedances.is_empty()
    }

    pub fn has_geometry(&self) -> bool {
        !self.geometry.is_empty()
    }

    /// Frequencies with pattern data, falling back to the impedance sweep
    /// for files that carry no pattern.
    pub fn frequencies(&self) -> FrequencySet {
        if self.gains.is_empty() {
            FrequencySet::from_values(self.impedances.iter().map(|p| p.frequency))
        } else {
            FrequencySet::from_values(self.gains.iter().map(GainData::frequency))
        }
    }

    pub fn polarizations(&self) -> Vec<Polarization> {
        let mut pols: Vec<Polarization> = self.gains.iter().map(GainData::polarization).collect();
        pols.sort();
        pols.dedup();
        pols
    }

    /// `Sum` when present, else the first polarization found.
    pub fn default_polarization(&self) -> Option<Polarization> {
        let pols = self.polarizations();
        if pols.contains(&Polarization::Sum) {
            Some(Polarization::Sum)
        } else {
            pols.first().copied()
        }
    }

    pub fn gain_data(&self, frequency: f64, polarization: Polarization) -> Option<&GainData> {
        self.gains.iter().find(|g| {
            g.polarization() == polarization && g.frequency().total_cmp(&frequency).is_eq()
        })
    }

    /// Pattern data of one polarization in frequency order.
    pub fn by_polarization(&self, polarization: Polarization) -> AntennaResult<Vec<&GainData>> {
        let data: Vec<&GainData> = self
            .gains
            .iter()
            .filter(|g| g.polarization() == polarization)
            .collect();
        if data.is_empty() {
            return Err(AntennaError::Empty(format!(
                "no {} polarized pattern in \"{}\"",
                polarization, self.title
            )));
        }
        Ok(data)
    }

    pub fn unit(&self) -> GainUnit {
        self.gains.first().map(GainData::unit).unwrap_or_default()
    }

    pub fn swr(&self, z0: f64) -> AntennaResult<SwrSeries> {
        SwrSeries::new(&self.impedances, z0)
    }

    /// Replaces every pattern by its azimuth-interpolated version.
    pub fn interpolate_azimuth(&self, step: f64) -> AntennaResult<AntennaModel> {
        let gains = self
            .gains
            .iter()
            .map(|g| g.interpolate_azimuth(step))
            .collect::<AntennaResult<Vec<_>>>()?;
        Ok(Self {
            gains,
            ..self.clone()
        })
    }

    pub fn to_json(&self) -> AntennaResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> AntennaResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::gain::PatternBuilder;
    use num_complex::Complex64;

    fn pattern(freq: f64, pol: Polarization, gain: f64) -> GainData {
        let mut builder = PatternBuilder::new(freq, pol);
        builder.insert(90.0, 0.0, gain).unwrap();
        builder.insert(90.0, 180.0, gain - 6.0).unwrap();
        builder.finish()
    }

    fn model() -> AntennaModel {
        AntennaModel::new(
            Dialect::Eznec,
            vec![
                pattern(14.2, Polarization::Vertical, 1.0),
                pattern(14.0, Polarization::Sum, 2.0),
                pattern(14.2, Polarization::Sum, 3.0),
            ],
            vec![ImpedancePoint {
                frequency: 14.0,
                impedance: Complex64::new(50.0, 0.0),
            }],
            Geometry::default(),
        )
        .with_title("dipole")
    }

    #[test]
    fn patterns_are_grouped_by_polarization() {
        let model = model();
        assert_eq!(model.frequencies().as_slice(), &[14.0, 14.2]);
        assert_eq!(
            model.polarizations(),
            vec![Polarization::Vertical, Polarization::Sum]
        );
        assert_eq!(model.default_polarization(), Some(Polarization::Sum));
        let sums = model.by_polarization(Polarization::Sum).unwrap();
        assert_eq!(sums.len(), 2);
        assert_eq!(sums[0].frequency(), 14.0);
        assert!(model.by_polarization(Polarization::Horizontal).is_err());
    }

    #[test]
    fn json_round_trip_keeps_title_and_data() {
        let model = model();
        let json = model.to_json().unwrap();
        let back = AntennaModel::from_json(&json).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn json_with_reordered_data_is_normalized() {
        let model = model();
        let mut value = serde_json::to_value(&model).unwrap();
        value["gains"].as_array_mut().unwrap().reverse();
        value["gains"][0]["samples"].as_array_mut().unwrap().reverse();
        let back = AntennaModel::from_json(&value.to_string()).unwrap();
        assert_eq!(back, model);
        let data = back.gain_data(14.2, Polarization::Sum).unwrap();
        assert_eq!(data.gain(90.0, 0.0), Some(3.0));
        assert_eq!(data.gain(90.0, 180.0), Some(-3.0));
    }

    #[test]
    fn empty_swr_series_is_rejected_when_deserialized() {
        let series = model().swr(50.0).unwrap();
        let mut value = serde_json::to_value(&series).unwrap();
        assert_eq!(serde_json::from_value::<SwrSeries>(value.clone()).unwrap(), series);
        value["points"] = serde_json::json!([]);
        assert!(serde_json::from_value::<SwrSeries>(value).is_err());
    }

    #[test]
    fn frequencies_fall_back_to_impedance_sweep() {
        let model = AntennaModel::new(
            Dialect::Nec2,
            Vec::new(),
            vec![ImpedancePoint {
                frequency: 7.1,
                impedance: Complex64::new(40.0, 3.0),
            }],
            Geometry::default(),
        );
        assert_eq!(model.frequencies().as_slice(), &[7.1]);
        assert!(model.swr(50.0).is_ok());
    }
}
