use crate::prelude::{AntennaError, AntennaResult};

/// Normalizes an angle to `[0, 360)`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid may round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Gain samples around one full azimuth circle, interpolated linearly in
/// angle with wrap-around between the last and the first sample.
#[derive(Debug, Clone, PartialEq)]
pub struct AzimuthSeries {
    samples: Vec<(f64, f64)>,
}

impl AzimuthSeries {
    /// Takes `(phi, gain)` pairs in any order. A sample at 360° duplicates
    /// the one at 0° and is folded onto it; the first occurrence wins.
    pub fn new(samples: impl IntoIterator<Item = (f64, f64)>) -> AntennaResult<Self> {
        let mut samples: Vec<(f64, f64)> = samples
            .into_iter()
            .map(|(phi, gain)| (wrap_degrees(phi), gain))
            .collect();
        if samples.is_empty() {
            return Err(AntennaError::Empty("azimuth row without samples".into()));
        }
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        samples.dedup_by(|later, earlier| later.0.total_cmp(&earlier.0).is_eq());
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[(f64, f64)] {
        &self.samples
    }

    /// Gain at an arbitrary azimuth. Sampled angles return their sample
    /// unchanged.
    pub fn at(&self, phi: f64) -> f64 {
        let phi = wrap_degrees(phi);
        let n = self.samples.len();
        let idx = self.samples.partition_point(|s| s.0 < phi);
        if idx < n && self.samples[idx].0 == phi {
            return self.samples[idx].1;
        }
        let (p0, g0) = if idx == 0 {
            let (p, g) = self.samples[n - 1];
            (p - 360.0, g)
        } else {
            self.samples[idx - 1]
        };
        let (p1, g1) = if idx == n {
            let (p, g) = self.samples[0];
            (p + 360.0, g)
        } else {
            self.samples[idx]
        };
        let span = p1 - p0;
        if span <= 0.0 {
            return g0;
        }
        g0 + (g1 - g0) * (phi - p0) / span
    }

    /// `(phi, gain)` on a regular grid of `step` degrees from 0° up to but
    /// excluding 360°.
    pub fn resample(&self, step: f64) -> AntennaResult<Vec<(f64, f64)>> {
        if !(step > 0.0 && step <= 360.0) {
            return Err(AntennaError::Config(format!(
                "azimuth interpolation step must be in (0, 360], got {step}"
            )));
        }
        let count = (360.0 / step - 1e-9).ceil() as usize;
        Ok((0..count)
            .map(|k| {
                let phi = k as f64 * step;
                (phi, self.at(phi))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> AzimuthSeries {
        AzimuthSeries::new(vec![(350.0, 0.0), (10.0, 2.0), (90.0, -6.0), (180.0, -20.0)]).unwrap()
    }

    #[test]
    fn sampled_angles_are_returned_unchanged() {
        let s = series();
        for &(phi, gain) in s.samples() {
            assert_eq!(s.at(phi), gain);
        }
        assert_eq!(s.at(-10.0), 0.0);
        assert_eq!(s.at(370.0), 2.0);
    }

    #[test]
    fn wrap_is_continuous_across_zero() {
        let s = series();
        assert!((s.at(0.0) - 1.0).abs() < 1e-12);
        assert!((s.at(359.999) - s.at(0.001)).abs() < 1e-3);
        assert!((s.at(355.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn closing_duplicate_at_360_is_folded() {
        let s = AzimuthSeries::new(vec![(0.0, 1.0), (180.0, 3.0), (360.0, 1.0)]).unwrap();
        assert_eq!(s.len(), 2);
        assert!((s.at(270.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn resample_covers_full_circle() {
        let grid = series().resample(90.0).unwrap();
        let phis: Vec<_> = grid.iter().map(|p| p.0).collect();
        assert_eq!(phis, vec![0.0, 90.0, 180.0, 270.0]);
        assert_eq!(grid[1].1, -6.0);
        let odd = series().resample(7.0).unwrap();
        assert_eq!(odd.len(), 52);
        assert!(series().resample(0.0).is_err());
    }

    #[test]
    fn single_sample_is_constant() {
        let s = AzimuthSeries::new(vec![(45.0, -3.0)]).unwrap();
        assert_eq!(s.at(200.0), -3.0);
        assert!(AzimuthSeries::new(Vec::new()).is_err());
    }
}
