use super::{squash_whitespace, Dialect, ParsedReport, ReportParser, EZNEC_HEADER};
use crate::math::interpolate::wrap_degrees;
use crate::model::{PatternBuilder, Polarization};
use crate::prelude::{AntennaError, AntennaResult};
use crate::telemetry::{LogManager, ParseMetrics};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SliceKind {
    Azimuth,
    Elevation,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Start,
    Slice {
        kind: SliceKind,
        /// Elevation of an azimuth slice or azimuth of an elevation slice.
        angle: f64,
        header_seen: bool,
    },
}

/// Far-field table exported by EZNEC ("FF Tab").
///
/// A file holds one frequency and a series of slices, either all azimuth
/// slices at fixed elevation or all elevation slices at fixed azimuth.
/// Every row carries vertical, horizontal and total gain.
pub struct EznecTable {
    log: LogManager,
    metrics: ParseMetrics,
    state: State,
    slice_kind: Option<SliceKind>,
    frequency: Option<f64>,
    patterns: BTreeMap<Polarization, PatternBuilder>,
}

impl EznecTable {
    pub fn new(log: LogManager) -> Self {
        Self {
            log,
            metrics: ParseMetrics::new(),
            state: State::Start,
            slice_kind: None,
            frequency: None,
            patterns: BTreeMap::new(),
        }
    }

    fn line(&mut self, no: usize, line: &str) -> AntennaResult<()> {
        match self.state {
            State::Start => self.preamble(no, &line.replace(',', ".")),
            State::Slice {
                kind,
                angle,
                header_seen: false,
            } => {
                if line.is_empty() {
                    return Ok(());
                }
                if squash_whitespace(line) != EZNEC_HEADER {
                    return Err(AntennaError::malformed(
                        no,
                        format!("expected \"{EZNEC_HEADER}\" column header, got \"{line}\""),
                    ));
                }
                self.state = State::Slice {
                    kind,
                    angle,
                    header_seen: true,
                };
                Ok(())
            }
            State::Slice { kind, angle, .. } => {
                if line.is_empty() {
                    self.state = State::Start;
                    return Ok(());
                }
                self.row(no, kind, angle, &line.replace(',', "."))
            }
        }
    }

    fn preamble(&mut self, no: usize, line: &str) -> AntennaResult<()> {
        if line.starts_with("Frequency") {
            if !line.ends_with("MHz") {
                return Err(AntennaError::malformed(
                    no,
                    format!("unsupported frequency format \"{line}\""),
                ));
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let value = tokens
                .len()
                .checked_sub(2)
                .map(|i| tokens[i])
                .ok_or_else(|| AntennaError::malformed(no, "frequency without value"))?;
            let mhz = value
                .parse::<f64>()
                .map_err(|_| AntennaError::malformed(no, format!("bad frequency \"{value}\"")))?;
            self.frequency = Some(mhz);
            return Ok(());
        }
        if !line.contains("Pattern") {
            return Ok(());
        }
        let kind = if line.starts_with("Azimuth") {
            SliceKind::Azimuth
        } else if line.starts_with("Elevation") {
            SliceKind::Elevation
        } else {
            return Err(AntennaError::malformed(
                no,
                format!("unsupported slice format \"{line}\""),
            ));
        };
        if self.slice_kind.is_some_and(|seen| seen != kind) {
            return Err(AntennaError::malformed(no, "mid-file change of slice format"));
        }
        self.slice_kind = Some(kind);
        let angle = line
            .split_once('=')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .and_then(|v| v.trim_end_matches('.').parse::<f64>().ok())
            .ok_or_else(|| AntennaError::malformed(no, "slice without angle"))?;
        self.log.detail(&format!("{kind:?} slice at {angle}°"));
        self.state = State::Slice {
            kind,
            angle,
            header_seen: false,
        };
        Ok(())
    }

    fn row(&mut self, no: usize, kind: SliceKind, angle: f64, line: &str) -> AntennaResult<()> {
        let values: Vec<&str> = line.split_whitespace().collect();
        if values.len() < 4 {
            return Err(AntennaError::malformed(no, "row needs angle, V, H and total gain"));
        }
        let number = |v: &str| {
            v.parse::<f64>()
                .map_err(|_| AntennaError::malformed(no, format!("cannot parse \"{v}\"")))
        };
        let deg = number(values[0])?;
        let (vert, hori, total) = (number(values[1])?, number(values[2])?, number(values[3])?);
        let (theta, phi) = match kind {
            SliceKind::Azimuth => (90.0 - angle, wrap_degrees(deg)),
            SliceKind::Elevation => {
                let deg = wrap_degrees(deg);
                if deg <= 90.0 {
                    (90.0 - deg, angle)
                } else if deg >= 270.0 {
                    (90.0 - (deg - 360.0), angle)
                } else {
                    // behind the zenith: the same plane seen from the other side
                    (90.0 - (180.0 - deg), wrap_degrees(angle + 180.0))
                }
            }
        };
        let frequency = self
            .frequency
            .ok_or_else(|| AntennaError::malformed(no, "pattern data before the frequency line"))?;
        for (pol, gain) in [
            (Polarization::Horizontal, hori),
            (Polarization::Vertical, vert),
            (Polarization::Sum, total),
        ] {
            self.patterns
                .entry(pol)
                .or_insert_with(|| PatternBuilder::new(frequency, pol))
                .insert(theta, wrap_degrees(phi), gain)?;
            self.metrics.record_sample();
        }
        Ok(())
    }
}

impl ReportParser for EznecTable {
    fn dialect(&self) -> Dialect {
        Dialect::Eznec
    }

    fn parse(&mut self, text: &str) -> AntennaResult<ParsedReport> {
        for (idx, raw) in text.lines().enumerate() {
            self.metrics.record_line();
            self.line(idx + 1, raw.trim())?;
        }
        let gains = std::mem::take(&mut self.patterns)
            .into_values()
            .filter(|b| !b.is_empty())
            .map(PatternBuilder::finish)
            .collect();
        Ok(ParsedReport {
            gains,
            metrics: self.metrics,
            ..ParsedReport::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::parse_str;

    const AZIMUTH: &str = "\
EZNEC+ ver. 7.0

dipole     3/1/2023     10:46:18 AM

Frequency = 14,2 MHz

Azimuth Pattern     Elevation angle = 10 deg.
        Deg      V dB      H dB      Tot dB     V Pha    H Pha
          0     -99,99     2,09       2,09       0       -90
         90     -99,99    -20,5     -20,5        0       -90
        180     -99,99     2,01       2,01       0        90
        270     -99,99    -20,4     -20,4        0        90

Azimuth Pattern     Elevation angle = 30 deg.
        Deg      V dB      H dB      Tot dB     V Pha    H Pha
          0     -99,99     1,5        1,5        0       -90
        180     -99,99     1,4        1,4        0        90
";

    #[test]
    fn azimuth_slices_split_polarizations() {
        let model = parse_str(AZIMUTH, "dipole").unwrap();
        assert_eq!(model.dialect, Dialect::Eznec);
        assert_eq!(model.frequencies().as_slice(), &[14.2]);
        assert_eq!(
            model.polarizations(),
            vec![Polarization::Horizontal, Polarization::Vertical, Polarization::Sum]
        );
        let sum = model.gain_data(14.2, Polarization::Sum).unwrap();
        assert_eq!(sum.gain(80.0, 0.0), Some(2.09));
        assert_eq!(sum.gain(60.0, 180.0), Some(1.4));
        let vert = model.gain_data(14.2, Polarization::Vertical).unwrap();
        assert_eq!(vert.gain(80.0, 90.0), Some(-99.99));
    }

    #[test]
    fn elevation_slice_folds_back_half() {
        let text = "Frequency = 7 MHz\n\
                    Elevation Pattern   Azimuth angle = 0 deg.\n\
                    Deg V dB H dB Tot dB V Pha H Pha\n\
                    0 1 1 3 0 0\n\
                    30 1 1 5 0 0\n\
                    150 1 1 4 0 0\n\
                    350 1 1 -2 0 0\n";
        let model = parse_str(text, "ele").unwrap();
        let sum = model.gain_data(7.0, Polarization::Sum).unwrap();
        assert_eq!(sum.gain(90.0, 0.0), Some(3.0));
        assert_eq!(sum.gain(60.0, 0.0), Some(5.0));
        assert_eq!(sum.gain(60.0, 180.0), Some(4.0));
        assert_eq!(sum.gain(100.0, 0.0), Some(-2.0));
    }

    #[test]
    fn mixing_slice_kinds_is_an_error() {
        let text = "Frequency = 7 MHz\n\
                    Azimuth Pattern  Elevation angle = 0 deg.\n\
                    Deg V dB H dB Tot dB V Pha H Pha\n\
                    0 1 1 3 0 0\n\n\
                    Elevation Pattern  Azimuth angle = 0 deg.\n";
        assert!(matches!(
            parse_str(text, "mixed"),
            Err(AntennaError::Malformed { line: 6, .. })
        ));
    }

    #[test]
    fn wrong_column_header_is_rejected() {
        let text = "Frequency = 7 MHz\nAzimuth Pattern  Elevation angle = 0 deg.\nDeg Gain\n";
        assert!(matches!(
            parse_str(text, "hdr"),
            Err(AntennaError::Malformed { line: 3, .. })
        ));
        let text = "Frequency = 7 kHz\nAzimuth Pattern  Elevation angle = 0 deg.\n";
        assert!(parse_str(text, "khz").is_err());
    }
}
