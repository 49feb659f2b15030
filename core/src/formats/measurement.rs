use super::{Dialect, ParsedReport, ReportParser};
use crate::math::interpolate::wrap_degrees;
use crate::model::{Frequency, GainUnit, PatternBuilder, Polarization};
use crate::prelude::{AntennaError, AntennaResult};
use crate::telemetry::{LogManager, ParseMetrics};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One row of antenna-range measurement data.
#[derive(Debug, Clone, Deserialize)]
pub struct MeasurementRecord {
    /// Measured level
    #[serde(rename = "Messwert")]
    pub value: f64,

    /// Unit of the level, usually dBm
    #[serde(rename = "Einheit Messwert")]
    pub unit: String,

    /// Turntable azimuth; continuous scans exceed 360°
    #[serde(rename = "Position Drehscheibe")]
    pub azimuth: f64,

    /// Positioner angle, taken as zenith angle
    #[serde(rename = "Position Positionierer")]
    pub elevation: f64,

    /// `PH` or `PV`
    #[serde(rename = "Polarisation")]
    pub polarization: String,

    #[serde(rename = "Messfrequenz")]
    pub frequency: f64,

    #[serde(rename = "Einheit Messfrequenz", default)]
    pub frequency_unit: String,
}

impl MeasurementRecord {
    pub fn frequency_mhz(&self) -> AntennaResult<f64> {
        let factor = match self.frequency_unit.trim().to_ascii_lowercase().as_str() {
            "" | "ghz" => 1e3,
            "mhz" => 1.0,
            "khz" => 1e-3,
            "hz" => 1e-6,
            other => {
                return Err(AntennaError::Config(format!(
                    "unknown frequency unit \"{other}\""
                )))
            }
        };
        Ok(self.frequency * factor)
    }

    pub fn polarization(&self) -> AntennaResult<Polarization> {
        let pol = self.polarization.trim();
        pol.strip_prefix('P').unwrap_or(pol).parse()
    }
}

/// Semicolon separated measurement export with German column names.
///
/// Positioner angles jitter slightly during one azimuth scan and are rounded
/// to whole degrees. Azimuth samples of different scans do not line up, so
/// elevation and 3D plots of such data need azimuth interpolation.
pub struct MeasurementTable {
    log: LogManager,
    metrics: ParseMetrics,
}

impl MeasurementTable {
    pub fn new(log: LogManager) -> Self {
        Self {
            log,
            metrics: ParseMetrics::new(),
        }
    }
}

impl ReportParser for MeasurementTable {
    fn dialect(&self) -> Dialect {
        Dialect::Measurement
    }

    fn parse(&mut self, text: &str) -> AntennaResult<ParsedReport> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());
        let mut patterns: BTreeMap<(Frequency, Polarization), PatternBuilder> = BTreeMap::new();
        for result in reader.deserialize() {
            self.metrics.record_line();
            let record: MeasurementRecord = result.map_err(|e| {
                let line = e.position().map_or(0, |p| p.line() as usize);
                AntennaError::malformed(line, format!("failed to parse CSV row: {e}"))
            })?;
            let frequency = record.frequency_mhz()?;
            let pol = record.polarization()?;
            let theta = record.elevation.round();
            let phi = wrap_degrees(record.azimuth);
            if !(0.0..=180.0).contains(&theta) {
                self.metrics.record_skipped();
                continue;
            }
            patterns
                .entry((Frequency(frequency), pol))
                .or_insert_with(|| {
                    PatternBuilder::new(frequency, pol).with_unit(GainUnit::from_label(&record.unit))
                })
                .insert(theta, phi, record.value)?;
            self.metrics.record_sample();
        }
        if self.metrics.skipped() > 0 {
            self.log
                .warn(&format!("{} rows outside the angle range", self.metrics.skipped()));
        }
        Ok(ParsedReport {
            gains: patterns.into_values().map(PatternBuilder::finish).collect(),
            metrics: self.metrics,
            ..ParsedReport::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::parse_str;

    const DATA: &str = "\
Messwert;Einheit Messwert;Position Drehscheibe;Position Positionierer;Polarisation;Messfrequenz;Einheit Messfrequenz
-31.5;dBm;0.0;10.1;PH;2.4;GHz
-30.0;dBm;91.3;9.9;PH;2.4;GHz
-45.2;dBm;365.0;10.0;PV;2.4;GHz
-50.0;dBm;10.0;200.0;PH;2.4;GHz
";

    #[test]
    fn measurement_rows_are_grouped_by_polarization() {
        let model = parse_str(DATA, "range").unwrap();
        assert_eq!(model.dialect, Dialect::Measurement);
        assert_eq!(model.frequencies().as_slice(), &[2400.0]);
        assert_eq!(model.unit(), GainUnit::Dbm);
        let h = model.gain_data(2400.0, Polarization::Horizontal).unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h.gain(10.0, 91.3), Some(-30.0));
        let v = model.gain_data(2400.0, Polarization::Vertical).unwrap();
        assert_eq!(v.gain(10.0, 5.0), Some(-45.2));
    }

    #[test]
    fn out_of_range_rows_are_skipped() {
        let mut table = MeasurementTable::new(LogManager::new("range"));
        let report = table.parse(DATA).unwrap();
        assert_eq!(report.metrics.skipped(), 1);
        assert_eq!(report.metrics.samples(), 3);
    }

    #[test]
    fn frequency_units_convert_to_mhz() {
        let mut record = MeasurementRecord {
            value: 0.0,
            unit: "dBm".into(),
            azimuth: 0.0,
            elevation: 0.0,
            polarization: "PV".into(),
            frequency: 433.0,
            frequency_unit: "MHz".into(),
        };
        assert_eq!(record.frequency_mhz().unwrap(), 433.0);
        record.frequency_unit = "kHz".into();
        assert!((record.frequency_mhz().unwrap() - 0.433).abs() < 1e-12);
        record.frequency_unit = "furlong".into();
        assert!(record.frequency_mhz().is_err());
        assert_eq!(record.polarization().unwrap(), Polarization::Vertical);
    }

    #[test]
    fn bad_number_is_malformed() {
        let text = "Messwert;Einheit Messwert;Position Drehscheibe;Position Positionierer;Polarisation;Messfrequenz\n\
                    abc;dBm;0;0;PH;1\n";
        assert!(matches!(
            parse_str(text, "bad"),
            Err(AntennaError::Malformed { .. })
        ));
    }
}
