//! Coordinate helpers shared by the 2D and 3D renderers.

use crate::model::Point3;
use serde::{Deserialize, Serialize};

/// Index of the value in the sorted `angles` closest to `target`; on a tie
/// the lower index wins. `angles` must not be empty.
pub fn nearest_angle_idx(angles: &[f64], target: f64) -> usize {
    let idx = angles
        .partition_point(|&a| a <= target)
        .min(angles.len().saturating_sub(1));
    if idx == 0 {
        return 0;
    }
    if (angles[idx] - target).abs() < (angles[idx - 1] - target).abs() {
        idx
    } else {
        idx - 1
    }
}

/// Polar angle (degrees, counter-clockwise from +X) and radius to x/y.
pub fn polar_to_cartesian(angle_deg: f64, radius: f64) -> (f64, f64) {
    let a = angle_deg.to_radians();
    (radius * a.cos(), radius * a.sin())
}

/// Zenith angle `theta` and azimuth `phi` (degrees) at distance `r`.
pub fn spherical_to_cartesian(theta_deg: f64, phi_deg: f64, r: f64) -> Point3 {
    let (t, p) = (theta_deg.to_radians(), phi_deg.to_radians());
    [p.cos() * t.sin() * r, p.sin() * t.sin() * r, t.cos() * r]
}

/// Cubic bounding box so 3D scenes keep an equal aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneRange {
    pub x: [f64; 2],
    pub y: [f64; 2],
    pub z: [f64; 2],
}

impl SceneRange {
    /// With `ground` the box reaches down to z = 0 and sits on it.
    pub fn cubic(points: impl IntoIterator<Item = Point3>, ground: bool) -> Option<Self> {
        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        for p in points {
            for axis in 0..3 {
                if p[axis].is_finite() {
                    lo[axis] = lo[axis].min(p[axis]);
                    hi[axis] = hi[axis].max(p[axis]);
                }
            }
        }
        if lo.iter().chain(hi.iter()).any(|v| !v.is_finite()) {
            return None;
        }
        if ground && lo[2] > 0.0 {
            lo[2] = 0.0;
        }
        let half = (0..3).map(|i| hi[i] - lo[i]).fold(0.0, f64::max) / 2.0;
        let around = |i: usize| {
            let mid = (hi[i] + lo[i]) / 2.0;
            [mid - half, mid + half]
        };
        let z = if ground && lo[2] == 0.0 {
            [0.0, 2.0 * half]
        } else {
            around(2)
        };
        Some(Self {
            x: around(0),
            y: around(1),
            z,
        })
    }

    pub fn center(&self) -> Point3 {
        [
            (self.x[0] + self.x[1]) / 2.0,
            (self.y[0] + self.y[1]) / 2.0,
            (self.z[0] + self.z[1]) / 2.0,
        ]
    }

    /// Half the edge length of the cube.
    pub fn half_extent(&self) -> f64 {
        (self.x[1] - self.x[0]) / 2.0
    }
}

/// Fixed-camera orthographic projection for static 3D panels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewProjection {
    azimuth: f64,
    elevation: f64,
}

impl ViewProjection {
    /// Camera azimuth and elevation in degrees.
    pub fn new(azimuth_deg: f64, elevation_deg: f64) -> Self {
        Self {
            azimuth: azimuth_deg.to_radians(),
            elevation: elevation_deg.to_radians(),
        }
    }

    /// Screen x (right), screen y (up) and depth (towards the viewer).
    pub fn project(&self, p: Point3) -> (f64, f64, f64) {
        let (sa, ca) = self.azimuth.sin_cos();
        let (se, ce) = self.elevation.sin_cos();
        let sx = -p[0] * sa + p[1] * ca;
        let sy = -(p[0] * ca + p[1] * sa) * se + p[2] * ce;
        let depth = (p[0] * ca + p[1] * sa) * ce + p[2] * se;
        (sx, sy, depth)
    }
}

impl Default for ViewProjection {
    fn default() -> Self {
        Self::new(-60.0, 30.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_index_prefers_closer_neighbour() {
        let angles = [0.0, 10.0, 20.0, 30.0];
        assert_eq!(nearest_angle_idx(&angles, -5.0), 0);
        assert_eq!(nearest_angle_idx(&angles, 14.0), 1);
        assert_eq!(nearest_angle_idx(&angles, 16.0), 2);
        assert_eq!(nearest_angle_idx(&angles, 15.0), 1);
        assert_eq!(nearest_angle_idx(&angles, 99.0), 3);
        assert_eq!(nearest_angle_idx(&[5.0], 99.0), 0);
    }

    #[test]
    fn spherical_axes() {
        let up = spherical_to_cartesian(0.0, 0.0, 2.0);
        assert!((up[2] - 2.0).abs() < 1e-12);
        let y = spherical_to_cartesian(90.0, 90.0, 1.0);
        assert!(y[0].abs() < 1e-12 && (y[1] - 1.0).abs() < 1e-12 && y[2].abs() < 1e-12);
    }

    #[test]
    fn cubic_range_uses_largest_extent() {
        let r = SceneRange::cubic(vec![[0.0, 0.0, 1.0], [4.0, 1.0, 2.0]], false).unwrap();
        assert_eq!(r.x, [0.0, 4.0]);
        assert_eq!(r.y, [-1.5, 2.5]);
        assert_eq!(r.z, [-0.5, 3.5]);
    }

    #[test]
    fn ground_pulls_range_down_to_zero() {
        let r = SceneRange::cubic(vec![[0.0, 0.0, 5.0], [0.0, 0.0, 10.0]], true).unwrap();
        assert_eq!(r.z, [0.0, 10.0]);
        assert!(SceneRange::cubic(Vec::new(), true).is_none());
    }

    #[test]
    fn top_view_keeps_depth_on_z() {
        let view = ViewProjection::new(0.0, 90.0);
        let (_, _, depth) = view.project([0.0, 0.0, 3.0]);
        assert!((depth - 3.0).abs() < 1e-12);
    }
}
