//! Line-oriented parser for NEC-2 and MININEC text reports.
//!
//! Both solvers print a sequence of loosely formatted sections: geometry
//! tables, card echoes, per-frequency impedance lines and pattern tables.
//! The parser walks the report once, switching between sections on their
//! header lines, and collects patterns, impedances and wire geometry.

use super::{is_mininec_pattern_header, is_nec_pattern_header, Dialect, ParsedReport, ReportParser};
use crate::model::geometry::{EXCITATION, NEC_LOAD_TYPES};
use crate::model::{Frequency, Geometry, ImpedancePoint, PatternBuilder, Point3, Polarization};
use crate::prelude::{AntennaError, AntennaResult};
use crate::telemetry::{LogManager, ParseMetrics};
use num_complex::Complex64;
use std::collections::{BTreeMap, HashMap};

/// DOS end-of-file marker found at the end of old MININEC output.
const CTRL_Z: char = '\u{1a}';

/// Maximum gap (m) between consecutive segments of one NEC wire.
const CHAIN_EPS: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Start,
    Pulses,
    Wires,
    Segments,
    Sources,
    Loads,
    AntennaInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Comma,
    Whitespace,
}

enum Flow {
    Next,
    Stop,
}

pub struct SolverReport {
    dialect: Dialect,
    log: LogManager,
    metrics: ParseMetrics,
    section: Section,
    table: Option<Delimiter>,
    frequency: Option<Frequency>,
    patterns: BTreeMap<Frequency, PatternBuilder>,
    impedances: BTreeMap<Frequency, Complex64>,
    geometry: Geometry,
    /// MININEC wire end points, one list per wire table.
    wire_ends: Vec<Vec<Point3>>,
    /// NEC segment number -> (polyline, index of its start point).
    chain: HashMap<i64, (usize, usize)>,
}

impl SolverReport {
    pub fn new(dialect: Dialect, log: LogManager) -> Self {
        Self {
            dialect,
            log,
            metrics: ParseMetrics::new(),
            section: Section::Start,
            table: None,
            frequency: None,
            patterns: BTreeMap::new(),
            impedances: BTreeMap::new(),
            geometry: Geometry::default(),
            wire_ends: Vec::new(),
            chain: HashMap::new(),
        }
    }

    fn line(&mut self, no: usize, line: &str) -> AntennaResult<Flow> {
        if line.starts_with("X             Y             Z") {
            if line.ends_with("END1 END2  NO.") {
                self.section = Section::Pulses;
                self.geometry.wires.push(Vec::new());
                return Ok(Flow::Next);
            }
            if line.ends_with("SEGMENTS") {
                self.section = Section::Wires;
                self.wire_ends.push(Vec::new());
                return Ok(Flow::Next);
            }
        }
        if line.starts_with("No:       X         Y         Z")
            && line.ends_with("I-     I    I+   No:")
        {
            self.section = Section::Segments;
            self.chain.clear();
            return Ok(Flow::Next);
        }
        if line.starts_with("NO. OF SOURCES") {
            self.section = Section::Sources;
            return Ok(Flow::Next);
        }
        if line.starts_with("NUMBER OF LOADS") {
            self.section = Section::Loads;
            return Ok(Flow::Next);
        }
        if line.starts_with("ENVIRONMENT") {
            if let Some((_, value)) = line.split_once(':') {
                let env: i64 = parse_field(no, value.trim())?;
                self.geometry.has_ground = env < 0;
            }
        }
        if line.starts_with("DATA CARD No:") {
            self.data_card(no, line)?;
        }
        if self.section != Section::Start && line.is_empty() {
            self.section = Section::Start;
            return Ok(Flow::Next);
        }
        match self.section {
            Section::Pulses => {
                self.pulse_row(no, line)?;
                return Ok(Flow::Next);
            }
            Section::Wires => {
                self.wire_row(no, line)?;
                return Ok(Flow::Next);
            }
            Section::Segments => {
                self.segment_row(no, line)?;
                return Ok(Flow::Next);
            }
            Section::Sources if line.starts_with("PULSE") => {
                let pulse = pulse_number(no, line)?;
                let at = self.geometry.pulse(pulse)?;
                self.geometry.add_load(EXCITATION, at);
            }
            Section::Loads if line.starts_with("PULSE") => {
                let (label, _) = line
                    .split_once(':')
                    .ok_or_else(|| AntennaError::malformed(no, "load line without ':'"))?;
                let name = match label.split_once(',').map_or(label, |(_, n)| n).trim() {
                    "RESISTANCE,REACTANCE" => "Impedance",
                    other => other,
                };
                let at = self.geometry.pulse(pulse_number(no, line)?)?;
                self.geometry.add_load(name, at);
            }
            _ => {}
        }
        if line.starts_with("FREQUENCY") {
            if let Some(value) = value_after_separator(line) {
                let mhz: f64 = parse_field(no, value)?;
                self.start_frequency(mhz);
            }
            self.table = None;
            return Ok(Flow::Next);
        }
        if line.starts_with("IMPEDANCE =") {
            let z = parse_impedance(no, line)?;
            self.set_impedance(no, z)?;
            self.table = None;
            return Ok(Flow::Next);
        }
        if line.contains("ANTENNA INPUT PARAMETERS") {
            self.section = Section::AntennaInput;
            return Ok(Flow::Next);
        }
        if self.section == Section::AntennaInput && starts_with_digit(line) {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 11 {
                return Err(AntennaError::malformed(
                    no,
                    format!("antenna input row has {} fields, expected 11", fields.len()),
                ));
            }
            let z = Complex64::new(parse_field(no, fields[6])?, parse_field(no, fields[7])?);
            self.set_impedance(no, z)?;
            self.section = Section::Start;
            return Ok(Flow::Next);
        }
        if line.starts_with(CTRL_Z) {
            return Ok(Flow::Stop);
        }
        if self.section == Section::AntennaInput {
            return Ok(Flow::Next);
        }
        match self.table {
            None => {
                if line.ends_with(",D") {
                    self.start_frequency(0.0);
                    self.table = Some(Delimiter::Comma);
                } else if is_mininec_pattern_header(line) || is_nec_pattern_header(line) {
                    if self.frequency.is_none() {
                        self.start_frequency(0.0);
                    }
                    self.table = Some(Delimiter::Whitespace);
                }
            }
            Some(delimiter) => self.pattern_row(no, line, delimiter)?,
        }
        Ok(Flow::Next)
    }

    fn start_frequency(&mut self, mhz: f64) {
        let key = Frequency(mhz);
        if self.patterns.contains_key(&key) || self.impedances.contains_key(&key) {
            self.log.warn(&format!(
                "frequency {mhz:.2} MHz already present, using last occurrence"
            ));
            self.metrics.record_warning();
            self.impedances.remove(&key);
        }
        self.patterns
            .insert(key, PatternBuilder::new(mhz, Polarization::Sum));
        self.frequency = Some(key);
    }

    fn set_impedance(&mut self, no: usize, z: Complex64) -> AntennaResult<()> {
        let key = self
            .frequency
            .ok_or_else(|| AntennaError::malformed(no, "impedance before any frequency"))?;
        self.impedances.insert(key, z);
        Ok(())
    }

    fn pattern_row(&mut self, no: usize, line: &str, delimiter: Delimiter) -> AntennaResult<()> {
        let fields: Vec<&str> = match delimiter {
            Delimiter::Comma => line.split(',').map(str::trim).collect(),
            Delimiter::Whitespace => line.split_whitespace().collect(),
        };
        if fields.len() < 5 || !starts_with_digit(fields[0]) {
            self.table = None;
            return Ok(());
        }
        let theta: f64 = parse_field(no, fields[0])?;
        let phi: f64 = parse_field(no, fields[1])?;
        let total: f64 = parse_field(no, fields[4])?;
        let key = self
            .frequency
            .ok_or_else(|| AntennaError::malformed(no, "pattern row outside a table"))?;
        if let Some(builder) = self.patterns.get_mut(&key) {
            builder.insert(theta, phi, total)?;
            self.metrics.record_sample();
        }
        Ok(())
    }

    fn pulse_row(&mut self, no: usize, line: &str) -> AntennaResult<()> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 7 {
            return Err(AntennaError::malformed(
                no,
                format!("pulse row has {} fields, expected 7", fields.len()),
            ));
        }
        let at = point(no, &fields[..3])?;
        let pulse: i64 = parse_field(no, fields[6])?;
        self.geometry.pulses.insert(pulse, at);
        if let Some(wire) = self.geometry.wires.last_mut() {
            wire.push(at);
        }
        Ok(())
    }

    fn wire_row(&mut self, no: usize, line: &str) -> AntennaResult<()> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(AntennaError::malformed(no, "wire row needs X, Y and Z"));
        }
        let at = point(no, &fields[..3])?;
        if let Some(ends) = self.wire_ends.last_mut() {
            ends.push(at);
        }
        Ok(())
    }

    /// One NEC segment: center, length and orientation plus the numbers of
    /// the connected segments. Consecutive segments are chained into one
    /// polyline; a junction to an earlier segment starts a new polyline at
    /// the shared point.
    fn segment_row(&mut self, no: usize, line: &str) -> AntennaResult<()> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 12 {
            return Err(AntennaError::malformed(
                no,
                format!("segment row has {} fields, expected 12", fields.len()),
            ));
        }
        let idx: i64 = parse_field(no, fields[0])?;
        let mid = point(no, &fields[1..4])?;
        let length: f64 = parse_field(no, fields[4])?;
        let alpha = parse_field::<f64>(no, fields[5])?.to_radians();
        let beta = parse_field::<f64>(no, fields[6])?.to_radians();
        let prev: i64 = parse_field(no, fields[8])?;
        let tag: i64 = parse_field(no, fields[fields.len() - 1])?;

        self.geometry.segments.push(mid);
        self.geometry.segments_by_tag.entry(tag).or_default().push(mid);

        let dir = [alpha.cos() * beta.cos(), alpha.cos() * beta.sin(), alpha.sin()];
        let half = length / 2.0;
        let start: Point3 = [0, 1, 2].map(|i| mid[i] - dir[i] * half);
        let end: Point3 = [0, 1, 2].map(|i| mid[i] + dir[i] * half);

        let follows = prev > 0 && prev == idx - 1;
        let wires = &mut self.geometry.wires;
        let joined = follows
            && wires
                .last()
                .and_then(|w| w.last())
                .map_or(false, |p| distance(p, &start) < CHAIN_EPS);
        if joined {
            if let Some(wire) = wires.last_mut() {
                wire.push(end);
            }
        } else {
            let junction = if follows {
                self.log.warn(&format!(
                    "line {no}: segment {idx} does not start at the end of segment {prev}"
                ));
                self.metrics.record_warning();
                None
            } else if prev != 0 && prev.abs() < idx {
                self.chain
                    .get(&prev.abs())
                    .map(|&(w, s)| wires[w][if prev > 0 { s + 1 } else { s }])
            } else {
                None
            };
            wires.push(vec![junction.unwrap_or(start), end]);
        }
        let w = wires.len() - 1;
        self.chain.insert(idx, (w, wires[w].len() - 2));
        Ok(())
    }

    fn data_card(&mut self, no: usize, line: &str) -> AntennaResult<()> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some(&card) = fields.get(4) else {
            return Ok(());
        };
        let ints = |count: usize| -> AntennaResult<Vec<i64>> {
            let values = fields.get(5..5 + count).ok_or_else(|| {
                AntennaError::malformed(no, format!("{card} card needs {count} integers"))
            })?;
            values.iter().map(|v| parse_field(no, v)).collect()
        };
        match card {
            "EX" => {
                let v = ints(3)?;
                let (kind, tag, seg) = (v[0], v[1], v[2]);
                if kind == 0 || kind == 5 {
                    let at = self.geometry.segment(tag, seg)?;
                    self.geometry.add_load(EXCITATION, at);
                }
            }
            "LD" => {
                let v = ints(4)?;
                let (kind, tag, first, last) = (v[0], v[1], v[2], v[3]);
                if kind < 0 {
                    return Ok(());
                }
                let name = NEC_LOAD_TYPES.get(kind as usize).ok_or_else(|| {
                    AntennaError::malformed(no, format!("unknown load type {kind}"))
                })?;
                let loaded: Vec<Point3> = if first == 0 {
                    self.geometry.segments_of(tag)?.to_vec()
                } else {
                    let last = if last == 0 { first } else { last };
                    (first..=last)
                        .map(|n| self.geometry.segment(tag, n))
                        .collect::<AntennaResult<_>>()?
                };
                for at in loaded {
                    self.geometry.add_load(name, at);
                }
            }
            "GN" => {
                let kind = ints(1)?[0];
                // GN -1 switches the ground off again, leaving free space.
                self.geometry.has_ground = kind != -1;
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(&mut self) -> ParsedReport {
        let mut geometry = std::mem::take(&mut self.geometry);
        for (ends, wire) in self.wire_ends.iter().zip(geometry.wires.iter_mut()) {
            if let Some(&first) = ends.first() {
                if wire.first() != Some(&first) {
                    wire.insert(0, first);
                }
            }
            if let Some(&last) = ends.last() {
                if wire.last() != Some(&last) {
                    wire.push(last);
                }
            }
        }
        let mut gains = Vec::new();
        for (frequency, builder) in std::mem::take(&mut self.patterns) {
            if builder.is_empty() {
                self.log.detail(&format!("no pattern at {frequency}"));
            } else {
                gains.push(builder.finish());
            }
        }
        let impedances = std::mem::take(&mut self.impedances)
            .into_iter()
            .map(|(f, impedance)| ImpedancePoint {
                frequency: f.mhz(),
                impedance,
            })
            .collect();
        ParsedReport {
            gains,
            impedances,
            geometry,
            metrics: self.metrics,
        }
    }
}

impl ReportParser for SolverReport {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn parse(&mut self, text: &str) -> AntennaResult<ParsedReport> {
        for (idx, raw) in text.lines().enumerate() {
            self.metrics.record_line();
            if let Flow::Stop = self.line(idx + 1, raw.trim())? {
                self.log.detail(&format!("end of file marker at line {}", idx + 1));
                break;
            }
        }
        Ok(self.finish())
    }
}

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().map_or(false, |c| c.is_ascii_digit())
}

fn parse_field<T: std::str::FromStr>(no: usize, value: &str) -> AntennaResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AntennaError::malformed(no, format!("cannot parse \"{}\"", value.trim())))
}

fn point(no: usize, fields: &[&str]) -> AntennaResult<Point3> {
    Ok([
        parse_field(no, fields[0])?,
        parse_field(no, fields[1])?,
        parse_field(no, fields[2])?,
    ])
}

fn distance(a: &Point3, b: &Point3) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// First token after the `:` or `=` of a `FREQUENCY` line.
fn value_after_separator(line: &str) -> Option<&str> {
    let pos = line.find([':', '='])?;
    line[pos + 1..].split_whitespace().next()
}

/// `IMPEDANCE = ( re , im J)`
fn parse_impedance(no: usize, line: &str) -> AntennaResult<Complex64> {
    let inner = line
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(inner, _)| inner.trim().trim_end_matches('J'))
        .ok_or_else(|| AntennaError::malformed(no, "impedance without parentheses"))?;
    let (re, im) = inner
        .split_once(',')
        .ok_or_else(|| AntennaError::malformed(no, "impedance needs real and imaginary part"))?;
    Ok(Complex64::new(parse_field(no, re)?, parse_field(no, im)?))
}

/// Pulse number from `PULSE ...: n , a , b` source and load lines.
fn pulse_number(no: usize, line: &str) -> AntennaResult<i64> {
    let (_, values) = line
        .split_once(':')
        .ok_or_else(|| AntennaError::malformed(no, "pulse line without ':'"))?;
    parse_field(no, values.split(',').next().unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::parse_str;

    const MININEC: &str = "\
 MINI-NUMERICAL ELECTROMAGNETICS CODE

FREQUENCY (MHZ): 7.15
    WAVE LENGTH =  41.93007  METERS

ENVIRONMENT (+1 FOR FREE SPACE, -1 FOR GROUND PLANE): -1

WIRE NO.  1
                COORDINATES                                 END         NO. OF
   X             Y             Z          RADIUS     CONNECTION     SEGMENTS
 0             0             0             .001        -1  0         5
 0             0             10

                 **** ANTENNA GEOMETRY ****

WIRE NO.  1  COORDINATES                                CONNECTION PULSE
X             Y             Z             RADIUS        END1 END2  NO.
 0             0             2             .001         -1   1    1
 0             0             4             .001          1   1    2
 0             0             6             .001          1   1    3
 0             0             8             .001          1   0    4

NO. OF SOURCES :  1
PULSE NO., VOLTAGE MAGNITUDE, PHASE (DEGREES):  1 , 1 , 0

NUMBER OF LOADS  1
PULSE NO.,RESISTANCE,REACTANCE:  3 , 10 , 0

********************    SOURCE DATA     ********************
PULSE  1      VOLTAGE = ( 1 , 0 J)
              CURRENT = ( .0231 , -.0012 J)
              IMPEDANCE = ( 43.1 , 2.2 J)

               ********************    PATTERN DATA    ********************
ZENITH    AZIMUTH       VERTICAL      HORIZONTAL    TOTAL
 ANGLE     ANGLE        PATTERN (DB)  PATTERN (DB)  PATTERN (DB)
 0         0            -999          -999          -999
 0         90           -999          -999          -999
 90        0             5.1          -999           5.1
 90        90            4.9          -999           4.9

FREQUENCY (MHZ): 7.2
              IMPEDANCE = ( 45 , 8.5 J)
ZENITH    AZIMUTH       VERTICAL      HORIZONTAL    TOTAL
 ANGLE     ANGLE        PATTERN (DB)  PATTERN (DB)  PATTERN (DB)
 90        0             5.3          -999           5.3
 90        90            5.2          -999           5.2
\u{1a}
FREQUENCY (MHZ): 99
";

    const NEC2: &str = "\
                              | NUMERICAL ELECTROMAGNETICS CODE (nec2c)  |

                               ---------- SEGMENTATION DATA ----------
  SEG.  COORDINATES OF SEG. CENTER     SEG.    ORIENTATION ANGLES    WIRE    CONNECTION DATA   TAG
  No:       X         Y         Z      LENGTH     ALPHA     BETA    RADIUS    I-     I    I+   No:
    1    0.00000   0.00000  -1.00000   1.00000  90.00000   0.00000  0.00100     0     1     2     1
    2    0.00000   0.00000   0.00000   1.00000  90.00000   0.00000  0.00100     1     2     3     1
    3    0.00000   0.00000   1.00000   1.00000  90.00000   0.00000  0.00100     2     3     0     1
    4    0.50000   0.00000   0.50000   1.00000   0.00000   0.00000  0.00100     2     4     0     2

 DATA CARD No:   1 EX   0    1    2    0  1.00000E+00  0.00000E+00
 DATA CARD No:   2 LD   5    1    0    0  5.80000E+07
 DATA CARD No:   3 LD   4    1    2    3  5.00000E+01
 DATA CARD No:   4 GN   1    0    0    0

                               --------- FREQUENCY --------
                                FREQUENCY : 1.4000E+01 MHZ

                        --------- ANTENNA INPUT PARAMETERS ---------
  TAG   SEG.       VOLTAGE (VOLTS)         CURRENT (AMPS)         IMPEDANCE (OHMS)        ADMITTANCE (MHOS)     POWER
  NO.   NO.     REAL         IMAG.      REAL         IMAG.      REAL         IMAG.      REAL         IMAG.     (WATTS)
    1     2  1.0000E+00  0.0000E+00  1.3567E-02 -6.4521E-03  6.0123E+01  2.8593E+01  1.3567E-02 -6.4521E-03  6.7835E-03

                        ---------- RADIATION PATTERNS -----------
  ---- ANGLES -----     ----- POWER GAINS -----       ---- POLARIZATION ----   ---- E(THETA) ----    ----- E(PHI) ------
  THETA      PHI       VERT.   HOR.    TOTAL       AXIAL      TILT  SENSE   MAGNITUDE   PHASE    MAGNITUDE   PHASE
 DEGREES   DEGREES        DB       DB       DB       RATIO   DEGREES            VOLTS/M   DEGREES     VOLTS/M   DEGREES
    0.00      0.00    -999.99  -999.99  -999.99    0.00000    0.00            0.00000E+00     0.00   0.00000E+00     0.00
   90.00      0.00       2.15  -999.99     2.15    0.00000    0.00  LINEAR   1.00000E+00     0.00   0.00000E+00     0.00
   90.00    180.00       2.10  -999.99     2.10    0.00000    0.00  LINEAR   1.00000E+00     0.00   0.00000E+00     0.00
";

    #[test]
    fn mininec_report_parses_patterns_and_geometry() {
        let model = parse_str(MININEC, "vertical").unwrap();
        assert_eq!(model.dialect, Dialect::Mininec);
        assert_eq!(model.frequencies().as_slice(), &[7.15, 7.2]);
        let data = model.gain_data(7.15, Polarization::Sum).unwrap();
        assert_eq!(data.gain(90.0, 90.0), Some(4.9));
        assert_eq!(data.gain(0.0, 0.0), Some(-999.0));
        assert_eq!(model.impedances()[1].impedance, Complex64::new(45.0, 8.5));

        let geo = model.geometry();
        assert!(geo.has_ground);
        assert_eq!(geo.wires.len(), 1);
        assert_eq!(geo.wires[0].first(), Some(&[0.0, 0.0, 0.0]));
        assert_eq!(geo.wires[0].last(), Some(&[0.0, 0.0, 10.0]));
        assert_eq!(geo.wires[0].len(), 6);
        assert_eq!(geo.loads[EXCITATION], vec![[0.0, 0.0, 2.0]]);
        assert_eq!(geo.loads["Impedance"], vec![[0.0, 0.0, 6.0]]);
    }

    #[test]
    fn ctrl_z_ends_the_report() {
        let model = parse_str(MININEC, "vertical").unwrap();
        assert!(model.frequencies().index_of(99.0).is_none());
    }

    #[test]
    fn nec_report_parses_impedance_and_segments() {
        let model = parse_str(NEC2, "dipole").unwrap();
        assert_eq!(model.dialect, Dialect::Nec2);
        assert_eq!(model.frequencies().as_slice(), &[14.0]);
        let z = model.impedances()[0].impedance;
        assert!((z.re - 60.123).abs() < 1e-9 && (z.im - 28.593).abs() < 1e-9);
        let data = model.gain_data(14.0, Polarization::Sum).unwrap();
        assert_eq!(data.gain(90.0, 180.0), Some(2.10));

        let geo = model.geometry();
        assert!(geo.has_ground);
        assert_eq!(geo.segments.len(), 4);
        assert_eq!(geo.wires.len(), 2);
        assert_eq!(geo.wires[0].len(), 4);
        let junction = geo.wires[1][0];
        assert!(junction[0].abs() < 1e-9 && (junction[2] - 0.5).abs() < 1e-9);
        assert!((geo.wires[1][1][0] - 1.0).abs() < 1e-9);
        assert_eq!(geo.loads[EXCITATION], vec![[0.0, 0.0, 0.0]]);
        assert_eq!(geo.loads["Wire conductivity"].len(), 3);
        assert_eq!(geo.loads["Impedance"].len(), 2);
    }

    #[test]
    fn gn_minus_one_card_means_free_space() {
        let text = NEC2.replace("GN   1    0    0    0", "GN  -1    0    0    0");
        let model = parse_str(&text, "dipole").unwrap();
        assert!(!model.geometry().has_ground);
        assert_eq!(model.geometry().segments.len(), 4);
    }

    #[test]
    fn basic_output_is_stored_at_zero_frequency() {
        let text = "ZENITH ANGLE,AZIMUTH ANGLE,VERTICAL,HORIZONTAL,TOTAL,D\n\
                    0 , 0 , -999 , -999 , -999\n\
                    90 , 0 , 2.1 , -999 , 2.1\n\
                    90 , 90 , 1 , -999 , 1\n";
        let model = parse_str(text, "basic").unwrap();
        assert_eq!(model.dialect, Dialect::MininecBasic);
        assert_eq!(model.frequencies().as_slice(), &[0.0]);
        let data = model.gain_data(0.0, Polarization::Sum).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.gain(90.0, 0.0), Some(2.1));
    }

    #[test]
    fn duplicate_frequency_keeps_last_block() {
        let text = "FREQUENCY (MHZ): 7\n IMPEDANCE = ( 1 , 1 J)\n\
                    ANGLE ANGLE (DB)\n90 0 1 1 1\n\n\
                    FREQUENCY (MHZ): 7\n IMPEDANCE = ( 2 , 2 J)\n\
                    ANGLE ANGLE (DB)\n90 0 3 3 3\n";
        let mut parser = SolverReport::new(Dialect::Mininec, LogManager::new("dup"));
        let report = parser.parse(text).unwrap();
        assert_eq!(report.metrics.warnings(), 1);
        assert_eq!(report.gains.len(), 1);
        assert_eq!(report.gains[0].gain(90.0, 0.0), Some(3.0));
        assert_eq!(report.impedances[0].impedance, Complex64::new(2.0, 2.0));
    }

    #[test]
    fn malformed_antenna_input_row_reports_line() {
        let text = "FREQUENCY : 14 MHZ\nANTENNA INPUT PARAMETERS\n1 2 3\n";
        let mut parser = SolverReport::new(Dialect::Nec2, LogManager::new("bad"));
        match parser.parse(text) {
            Err(AntennaError::Malformed { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn impedance_line_is_parsed() {
        let z = parse_impedance(1, "IMPEDANCE = ( 41.39227 , -3.431221 J)").unwrap();
        assert_eq!(z, Complex64::new(41.39227, -3.431221));
        assert!(parse_impedance(1, "IMPEDANCE = 41").is_err());
    }
}
