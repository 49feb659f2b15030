//! Dialect detection and parsers for the supported report formats.

pub mod eznec;
pub mod measurement;
pub mod report;

use crate::model::{AntennaModel, GainData, Geometry, ImpedancePoint};
use crate::prelude::{AntennaError, AntennaResult};
use crate::telemetry::{LogManager, ParseMetrics};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub use eznec::EznecTable;
pub use measurement::{MeasurementRecord, MeasurementTable};
pub use report::SolverReport;

/// Column header of EZNEC far-field tables, with whitespace collapsed.
pub const EZNEC_HEADER: &str = "Deg V dB H dB Tot dB V Pha H Pha";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    Nec2,
    Mininec,
    MininecBasic,
    Eznec,
    Measurement,
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Nec2 => "NEC-2",
            Dialect::Mininec => "MININEC",
            Dialect::MininecBasic => "MININEC (BASIC)",
            Dialect::Eznec => "EZNEC far field table",
            Dialect::Measurement => "CSV measurement",
        }
    }

    fn parser(self, log: LogManager) -> Box<dyn ReportParser> {
        match self {
            Dialect::Nec2 | Dialect::Mininec | Dialect::MininecBasic => {
                Box::new(SolverReport::new(self, log))
            }
            Dialect::Eznec => Box::new(EznecTable::new(log)),
            Dialect::Measurement => Box::new(MeasurementTable::new(log)),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw parser output before it is frozen into an [`AntennaModel`].
#[derive(Debug, Clone, Default)]
pub struct ParsedReport {
    pub gains: Vec<GainData>,
    pub impedances: Vec<ImpedancePoint>,
    pub geometry: Geometry,
    pub metrics: ParseMetrics,
}

/// One parser per input dialect.
pub trait ReportParser {
    fn dialect(&self) -> Dialect;
    fn parse(&mut self, text: &str) -> AntennaResult<ParsedReport>;
}

pub(crate) fn squash_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn is_nec_pattern_header(line: &str) -> bool {
    line.starts_with("DEGREES   DEGREES        DB") && line.ends_with("VOLTS/M   DEGREES")
}

pub(crate) fn is_mininec_pattern_header(line: &str) -> bool {
    line.starts_with("ANGLE") && line.ends_with("(DB)")
}

/// Guesses the dialect from header markers.
pub fn detect(text: &str) -> Option<Dialect> {
    let first = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    if first.contains(';') && first.contains("Messwert") {
        return Some(Dialect::Measurement);
    }
    let lines = || text.lines().map(str::trim);
    if lines().any(|l| {
        l.starts_with("Azimuth Pattern")
            || l.starts_with("Elevation Pattern")
            || squash_whitespace(l) == EZNEC_HEADER
    }) {
        return Some(Dialect::Eznec);
    }
    if lines().any(|l| {
        is_nec_pattern_header(l)
            || l.contains("ANTENNA INPUT PARAMETERS")
            || (l.contains("NUMERICAL ELECTROMAGNETICS CODE") && !l.contains("MINI"))
            || l.starts_with("DATA CARD No:")
    }) {
        return Some(Dialect::Nec2);
    }
    if lines().any(|l| l.ends_with(",D")) {
        return Some(Dialect::MininecBasic);
    }
    if lines().any(|l| {
        is_mininec_pattern_header(l)
            || l.starts_with("IMPEDANCE =")
            || (l.starts_with("FREQUENCY") && l.contains(':'))
            || (l.starts_with("X             Y             Z")
                && (l.ends_with("END1 END2  NO.") || l.ends_with("SEGMENTS")))
    }) {
        return Some(Dialect::Mininec);
    }
    None
}

/// Detects the dialect of `text` and parses it; `name` becomes the title
/// and tags the log output.
pub fn parse_str(text: &str, name: &str) -> AntennaResult<AntennaModel> {
    let dialect = detect(text).ok_or_else(|| AntennaError::UnrecognizedFormat {
        name: name.to_string(),
    })?;
    let log = LogManager::new(name);
    log.record(&format!("detected {dialect} output"));
    let mut parser = dialect.parser(log.clone());
    let report = parser.parse(text)?;
    log.record(&format!("parsed {}", report.metrics));
    if report.gains.is_empty() && report.impedances.is_empty() {
        return Err(AntennaError::Empty(format!(
            "{name}: neither pattern nor impedance data found"
        )));
    }
    Ok(
        AntennaModel::new(dialect, report.gains, report.impedances, report.geometry)
            .with_title(name),
    )
}

/// Reads and parses a report file. Non UTF-8 bytes (old DOS output) are
/// replaced rather than rejected.
pub fn parse_file(path: &Path) -> AntennaResult<AntennaModel> {
    let bytes = std::fs::read(path).map_err(|source| AntennaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_str(&text, &name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detects_each_dialect() {
        assert_eq!(
            detect("Messwert;Einheit Messwert;Messfrequenz\n1;dBm;2\n"),
            Some(Dialect::Measurement)
        );
        assert_eq!(
            detect("Frequency = 14 MHz\n\nAzimuth Pattern  Elevation angle = 10 deg.\n"),
            Some(Dialect::Eznec)
        );
        assert_eq!(
            detect("  ---- ANTENNA INPUT PARAMETERS ----\n"),
            Some(Dialect::Nec2)
        );
        assert_eq!(detect("ZENITH,AZIMUTH,D\n"), Some(Dialect::MininecBasic));
        assert_eq!(
            detect("FREQUENCY (MHZ): 7.15\n IMPEDANCE = ( 41.4 , 3.4 J)\n"),
            Some(Dialect::Mininec)
        );
        assert_eq!(detect("hello world\n"), None);
    }

    #[test]
    fn unknown_text_names_the_file() {
        let err = parse_str("nothing here", "junk").unwrap_err();
        assert!(matches!(err, AntennaError::UnrecognizedFormat { ref name } if name == "junk"));
        assert_eq!(err.to_string(), "junk: unrecognized file format");
    }

    #[test]
    fn parse_file_uses_stem_as_title() {
        let mut file = tempfile::Builder::new()
            .prefix("vertical")
            .suffix(".pout")
            .tempfile()
            .unwrap();
        writeln!(file, "FREQUENCY (MHZ): 7.15").unwrap();
        writeln!(file, "IMPEDANCE = ( 36.5 , 2.5 J)").unwrap();
        let model = parse_file(file.path()).unwrap();
        assert!(model.title.starts_with("vertical"));
        assert_eq!(model.dialect, Dialect::Mininec);
        assert_eq!(model.impedances().len(), 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = parse_file(Path::new("/nonexistent/antenna.nec")).unwrap_err();
        assert!(matches!(err, AntennaError::Io { .. }));
    }
}
