use serde::{Deserialize, Serialize};

/// Axis range rounded to "nice" numbers, so that several Y axes of one
/// chart can share a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotRange {
    pub low: f64,
    pub high: f64,
    pub tick: f64,
}

impl PlotRange {
    /// Range covering `values`; `min_y` overrides the data minimum. Returns
    /// `None` for an empty or non-finite input.
    pub fn new(values: &[f64], min_y: Option<f64>) -> Option<Self> {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let max = finite.clone().reduce(f64::max)?;
        let min = match min_y {
            Some(m) if m.is_finite() => m,
            _ => finite.reduce(f64::min)?,
        };
        let magnitude = max.abs().max(min.abs());
        let exp = if magnitude > 0.0 {
            magnitude.log10().trunc() as i32
        } else {
            0
        };
        let unit = 10f64.powi(exp);
        let lo = (min / unit).floor();
        let hi = (max / unit).ceil();
        let span = hi - lo;
        // |min|, |max| < 10 units, so the span never exceeds 20 units.
        let k = [1.0, 2.0, 4.0, 8.0, 10.0, 12.0]
            .into_iter()
            .find(|&k| span <= k)
            .unwrap_or(20.0);
        let tick = if k == 12.0 { 3.0 } else { k / 4.0 };
        Some(Self {
            low: lo * unit,
            high: (lo + k) * unit,
            tick: tick * unit,
        })
    }

    /// Formats a tick label; whole-number tick steps print without decimals.
    pub fn format(&self, value: f64, precision: usize, tail: &str) -> String {
        if self.tick.fract() == 0.0 {
            format!("{value:.0}{tail}")
        } else {
            format!("{value:.precision$}{tail}")
        }
    }

    /// Tick positions from `low` through `high`.
    pub fn ticks(&self) -> Vec<f64> {
        if !(self.tick > 0.0) {
            return vec![self.low];
        }
        let count = ((self.high - self.low) / self.tick).round() as usize;
        (0..=count).map(|i| self.low + i as f64 * self.tick).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vswr_values_get_small_range() {
        let r = PlotRange::new(&[1.1, 1.8, 2.6], Some(1.0)).unwrap();
        assert_eq!((r.low, r.high, r.tick), (1.0, 3.0, 0.5));
        assert_eq!(r.ticks(), vec![1.0, 1.5, 2.0, 2.5, 3.0]);
        assert_eq!(r.format(1.5, 1, ""), "1.5");
    }

    #[test]
    fn impedance_values_scale_by_decade() {
        let r = PlotRange::new(&[-35.0, 72.0], None).unwrap();
        assert_eq!((r.low, r.high, r.tick), (-40.0, 80.0, 30.0));
        assert_eq!(r.format(30.0, 1, " Ω"), "30 Ω");
    }

    #[test]
    fn symmetric_reactance_is_covered() {
        for (lo, hi) in [(-95.0, 95.0), (-900.0, 900.0), (-9.5, 9.5), (-35.0, 72.0)] {
            let r = PlotRange::new(&[lo, hi], None).unwrap();
            assert!(r.low <= lo && r.high >= hi, "[{lo}, {hi}] not covered by {r:?}");
        }
        let r = PlotRange::new(&[-95.0, 95.0], None).unwrap();
        assert_eq!((r.low, r.high, r.tick), (-100.0, 100.0, 50.0));
        assert_eq!(r.ticks().len(), 5);
    }

    #[test]
    fn zero_and_empty_input() {
        let r = PlotRange::new(&[0.0, 0.0], None).unwrap();
        assert_eq!((r.low, r.high), (0.0, 1.0));
        assert!(PlotRange::new(&[], None).is_none());
    }
}
