use crate::math::projection::nearest_angle_idx;
use serde::{Deserialize, Serialize};

/// Ordered, de-duplicated frequencies (MHz) of one simulation run.
///
/// Drives legend entries in the HTML figures and the slider of the
/// interactive viewer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencySet {
    values: Vec<f64>,
}

impl FrequencySet {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut values: Vec<f64> = values.into_iter().filter(|f| f.is_finite()).collect();
        values.sort_by(f64::total_cmp);
        values.dedup_by(|a, b| a.total_cmp(b).is_eq());
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).copied()
    }

    pub fn first(&self) -> Option<f64> {
        self.values.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn index_of(&self, frequency: f64) -> Option<usize> {
        self.values
            .binary_search_by(|f| f.total_cmp(&frequency))
            .ok()
    }

    pub fn nearest_index(&self, frequency: f64) -> Option<usize> {
        if self.values.is_empty() {
            None
        } else {
            Some(nearest_angle_idx(&self.values, frequency))
        }
    }

    /// Index reached from `idx` after `delta` steps, clamped to the set.
    pub fn step(&self, idx: usize, delta: isize) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let last = self.values.len() as isize - 1;
        (idx as isize + delta).clamp(0, last) as usize
    }

    pub fn contains_range(&self, frequency: f64) -> bool {
        match (self.first(), self.last()) {
            (Some(lo), Some(hi)) => lo <= frequency && frequency <= hi,
            _ => false,
        }
    }

    /// Legend label for a frequency.
    pub fn label(frequency: f64) -> String {
        format!("f={:.3} MHz", frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_sorts_and_removes_duplicates() {
        let set = FrequencySet::from_values([14.2, 7.1, 14.2, 21.0]);
        assert_eq!(set.as_slice(), &[7.1, 14.2, 21.0]);
        assert_eq!(set.index_of(14.2), Some(1));
        assert_eq!(set.nearest_index(20.0), Some(2));
    }

    #[test]
    fn stepping_clamps_at_both_ends() {
        let set = FrequencySet::from_values([1.0, 2.0, 3.0]);
        assert_eq!(set.step(0, -1), 0);
        assert_eq!(set.step(1, 1), 2);
        assert_eq!(set.step(2, 1), 2);
    }

    #[test]
    fn label_uses_three_decimals() {
        assert_eq!(FrequencySet::label(14.2), "f=14.200 MHz");
    }
}
