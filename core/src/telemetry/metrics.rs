use std::fmt;

/// Counters collected while parsing one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseMetrics {
    lines: usize,
    samples: usize,
    skipped: usize,
    warnings: usize,
}

impl ParseMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_line(&mut self) {
        self.lines += 1;
    }

    pub fn record_sample(&mut self) {
        self.samples += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_warning(&mut self) {
        self.warnings += 1;
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }
}

impl fmt::Display for ParseMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lines, {} samples, {} skipped rows, {} warnings",
            self.lines, self.samples, self.skipped, self.warnings
        )
    }
}
