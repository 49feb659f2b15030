use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Direction of a pattern sample in degrees.
///
/// `theta` is the zenith angle (0 straight up, 90 on the horizon, 180 straight
/// down) and `phi` the azimuth counted counter-clockwise from the X axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnglePair {
    pub theta: f64,
    pub phi: f64,
}

impl AnglePair {
    pub fn new(theta: f64, phi: f64) -> Self {
        Self { theta, phi }
    }

    /// Elevation above the horizon.
    pub fn elevation(&self) -> f64 {
        90.0 - self.theta
    }
}

impl PartialEq for AnglePair {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AnglePair {}

impl PartialOrd for AnglePair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AnglePair {
    fn cmp(&self, other: &Self) -> Ordering {
        self.theta
            .total_cmp(&other.theta)
            .then_with(|| self.phi.total_cmp(&other.phi))
    }
}

/// Frequency in MHz, totally ordered so it can key maps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frequency(pub f64);

impl Frequency {
    pub fn mhz(self) -> f64 {
        self.0
    }
}

impl PartialEq for Frequency {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frequency {}

impl PartialOrd for Frequency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frequency {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} MHz", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn angle_pairs_order_by_theta_then_phi() {
        let mut map = BTreeMap::new();
        map.insert(AnglePair::new(90.0, 10.0), 1.0);
        map.insert(AnglePair::new(0.0, 350.0), 2.0);
        map.insert(AnglePair::new(90.0, 0.0), 3.0);
        let keys: Vec<_> = map.keys().map(|k| (k.theta, k.phi)).collect();
        assert_eq!(keys, vec![(0.0, 350.0), (90.0, 0.0), (90.0, 10.0)]);
    }

    #[test]
    fn elevation_counts_from_horizon() {
        assert_eq!(AnglePair::new(80.0, 0.0).elevation(), 10.0);
    }
}
