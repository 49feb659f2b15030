use super::grid::GainGrid;
use crate::math::interpolate::wrap_degrees;
use crate::math::projection::{
    nearest_angle_idx, polar_to_cartesian, spherical_to_cartesian, SceneRange,
};
use crate::math::scaling::Scaler;
use crate::model::{AntennaModel, GainUnit, Point3, Polarization};
use crate::prelude::{AntennaError, AntennaResult};
use crate::telemetry::LogManager;
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const OPPOSITE_EPS: f64 = 1e-6;

/// Requested cut angles in degrees; `None` picks the direction of
/// maximum gain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CutAngles {
    /// Azimuth of the elevation cut.
    pub azimuth: Option<f64>,
    /// Elevation above the horizon of the azimuth cut.
    pub elevation: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutKind {
    Azimuth,
    Elevation,
}

impl CutKind {
    pub fn name(&self) -> &'static str {
        match self {
            CutKind::Azimuth => "azimuth",
            CutKind::Elevation => "elevation",
        }
    }
}

/// One closed polar curve ready for drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarCut {
    pub kind: CutKind,
    pub frequency: f64,
    /// Polar angle in degrees, counter-clockwise from the X axis.
    pub angles: Vec<f64>,
    /// Scaled radius in [0, 1].
    pub radii: Vec<f64>,
    /// Unscaled gain.
    pub gains: Vec<f64>,
    /// Angle in degrees at which the radial axis labels are drawn.
    pub label_angle: f64,
    pub description: Vec<String>,
}

impl PolarCut {
    /// `(x, y)` points of the curve in unit-circle coordinates.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.angles
            .iter()
            .zip(&self.radii)
            .map(|(&a, &r)| polar_to_cartesian(a, r))
            .collect()
    }
}

/// Spherical pattern mapped to Cartesian coordinates, all arrays shaped
/// (theta x phi).
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub frequency: f64,
    pub x: Array2<f64>,
    pub y: Array2<f64>,
    pub z: Array2<f64>,
    /// Scaled gain, used as radius and for coloring.
    pub radii: Array2<f64>,
    /// Per vertex: gain, gain relative to the maximum, azimuth, elevation.
    pub customdata: Array3<f64>,
}

impl Surface {
    pub fn points(&self) -> impl Iterator<Item = Point3> + '_ {
        self.x
            .iter()
            .zip(self.y.iter())
            .zip(self.z.iter())
            .map(|((&x, &y), &z)| [x, y, z])
    }
}

/// Patterns of all frequencies for one polarization, with shared maximum
/// and shared cut angles.
#[derive(Debug, Clone)]
pub struct PatternSet {
    title: String,
    polarization: Polarization,
    unit: GainUnit,
    grids: Vec<GainGrid>,
    max_gain: f64,
    theta_idx: usize,
    phi_idx: usize,
}

impl PatternSet {
    pub fn new(
        model: &AntennaModel,
        polarization: Polarization,
        cut: CutAngles,
    ) -> AntennaResult<Self> {
        let log = LogManager::new(model.title.as_str());
        let grids = model
            .by_polarization(polarization)?
            .into_iter()
            .map(GainGrid::from_gain_data)
            .collect::<AntennaResult<Vec<_>>>()?;
        let first = grids
            .first()
            .ok_or_else(|| AntennaError::Empty(format!("no pattern in \"{}\"", model.title)))?;
        let filled: usize = grids.iter().map(GainGrid::filled).sum();
        if filled > 0 {
            log.warn(&format!("{filled} missing pattern cells filled by azimuth interpolation"));
        }

        let max_gain = grids.iter().map(GainGrid::max_gain).fold(f64::NEG_INFINITY, f64::max);
        let theta_idx = match cut.elevation {
            Some(elevation) => nearest_angle_idx(first.thetas(), 90.0 - elevation),
            None => most_common(grids.iter().map(|g| g.max_idx().0)),
        };
        let phi_idx = match cut.azimuth {
            Some(azimuth) => nearest_angle_idx(first.phis(), azimuth),
            None => most_common(grids.iter().map(|g| g.max_idx().1)),
        };
        let unit = first.unit();
        let theta_idx = theta_idx.min(first.thetas().len() - 1);
        let phi_idx = phi_idx.min(first.phis().len() - 1);
        log.detail(&format!(
            "cut at theta={:.2}° phi={:.2}°, maximum {:.2} {}",
            first.thetas()[theta_idx],
            first.phis()[phi_idx],
            max_gain,
            unit.label()
        ));
        Ok(Self {
            title: model.title.clone(),
            polarization,
            unit,
            grids,
            max_gain,
            theta_idx,
            phi_idx,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn polarization(&self) -> Polarization {
        self.polarization
    }

    pub fn unit(&self) -> GainUnit {
        self.unit
    }

    pub fn grids(&self) -> &[GainGrid] {
        &self.grids
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.grids.iter().map(GainGrid::frequency).collect()
    }

    /// Maximum gain over all frequencies; the outer ring of every plot.
    pub fn max_gain(&self) -> f64 {
        self.max_gain
    }

    /// Zenith angle of the azimuth cut.
    pub fn cut_theta(&self) -> f64 {
        self.grids[0].thetas()[self.theta_idx]
    }

    /// Azimuth of the elevation cut.
    pub fn cut_phi(&self) -> f64 {
        self.grids[0].phis()[self.phi_idx]
    }

    /// Cut indices snapped onto the axes of one grid. Grids of one run
    /// usually share their axes; otherwise the nearest angle is used.
    fn indices(&self, grid: &GainGrid) -> (usize, usize) {
        let first = &self.grids[0];
        if grid.thetas() == first.thetas() && grid.phis() == first.phis() {
            return (self.theta_idx, self.phi_idx);
        }
        (
            nearest_angle_idx(grid.thetas(), self.cut_theta()),
            nearest_angle_idx(grid.phis(), self.cut_phi()),
        )
    }

    fn grid(&self, idx: usize) -> AntennaResult<&GainGrid> {
        self.grids.get(idx).ok_or_else(|| {
            AntennaError::Empty(format!("no pattern #{idx}, {} available", self.grids.len()))
        })
    }

    fn description(&self, heading: &str, grid: &GainGrid, scaler: &Scaler) -> Vec<String> {
        vec![
            heading.to_string(),
            format!("Title: {}", self.title),
            format!("Frequency: {:.2} MHz", grid.frequency()),
            format!("Outer ring: {:.2} {}", self.max_gain, self.unit.label()),
            format!("Scaling: {}", scaler.title()),
        ]
    }

    /// Gain over azimuth at the selected elevation.
    pub fn azimuth_cut(&self, idx: usize, scaler: &Scaler) -> AntennaResult<PolarCut> {
        let grid = self.grid(idx)?;
        let (theta_idx, phi_idx) = self.indices(grid);
        let gains = grid.row(theta_idx).to_vec();
        let mut description = self.description("Azimuth Pattern", grid, scaler);
        description.push(format!("Elevation: {:.2}°", 90.0 - grid.thetas()[theta_idx]));
        Ok(PolarCut {
            kind: CutKind::Azimuth,
            frequency: grid.frequency(),
            angles: grid.phis().to_vec(),
            radii: scaler.scale_all(self.max_gain, &gains),
            gains,
            label_angle: grid.phis()[phi_idx],
            description,
        })
    }

    /// Gain over elevation in the vertical plane through the selected
    /// azimuth. The half-plane of the opposite azimuth is appended in
    /// reverse so the curve runs from horizon over zenith to horizon.
    pub fn elevation_cut(&self, idx: usize, scaler: &Scaler) -> AntennaResult<PolarCut> {
        let grid = self.grid(idx)?;
        let (theta_idx, phi_idx) = self.indices(grid);
        let phi = grid.phis()[phi_idx];
        let wanted = wrap_degrees(phi + 180.0);
        let opposite = grid
            .phis()
            .iter()
            .position(|&p| {
                let d = (p - wanted).abs();
                d < OPPOSITE_EPS || (360.0 - d) < OPPOSITE_EPS
            })
            .filter(|&o| o != phi_idx)
            .ok_or(AntennaError::NoOppositeAzimuth(phi))?;

        let thetas = grid.thetas();
        let mut angles: Vec<f64> = thetas.iter().map(|t| 90.0 - t).collect();
        angles.extend(thetas.iter().rev().map(|t| 90.0 + t));
        let mut gains = grid.column(phi_idx).to_vec();
        gains.extend(grid.column(opposite).iter().rev());

        let mut description = self.description("Elevation Pattern", grid, scaler);
        description.push(format!("Azimuth: {phi:.2}° (X=0°)"));
        Ok(PolarCut {
            kind: CutKind::Elevation,
            frequency: grid.frequency(),
            angles,
            radii: scaler.scale_all(self.max_gain, &gains),
            gains,
            label_angle: 90.0 - thetas[theta_idx],
            description,
        })
    }

    pub fn cut(&self, kind: CutKind, idx: usize, scaler: &Scaler) -> AntennaResult<PolarCut> {
        match kind {
            CutKind::Azimuth => self.azimuth_cut(idx, scaler),
            CutKind::Elevation => self.elevation_cut(idx, scaler),
        }
    }

    /// Pattern surface with the scaled gain as distance from the origin.
    pub fn surface(&self, idx: usize, scaler: &Scaler) -> AntennaResult<Surface> {
        let grid = self.grid(idx)?;
        let radii = scaler.scale_array(self.max_gain, grid.gains());
        let shape = radii.dim();
        let mut x = Array2::zeros(shape);
        let mut y = Array2::zeros(shape);
        let mut z = Array2::zeros(shape);
        let mut customdata = Array3::zeros((shape.0, shape.1, 4));
        for ((i, j), &r) in radii.indexed_iter() {
            let (theta, phi) = (grid.thetas()[i], grid.phis()[j]);
            let [px, py, pz] = spherical_to_cartesian(theta, phi, r);
            x[[i, j]] = px;
            y[[i, j]] = py;
            z[[i, j]] = pz;
            let gain = grid.gains()[[i, j]];
            customdata[[i, j, 0]] = gain;
            customdata[[i, j, 1]] = gain - self.max_gain;
            customdata[[i, j, 2]] = phi;
            customdata[[i, j, 3]] = 90.0 - theta;
        }
        Ok(Surface {
            frequency: grid.frequency(),
            x,
            y,
            z,
            radii,
            customdata,
        })
    }

    /// Cubic box around the surfaces of all frequencies.
    pub fn scene_range(&self, scaler: &Scaler) -> AntennaResult<SceneRange> {
        let mut points = Vec::new();
        for idx in 0..self.grids.len() {
            points.extend(self.surface(idx, scaler)?.points());
        }
        SceneRange::cubic(points, false)
            .ok_or_else(|| AntennaError::Empty("no finite surface points".into()))
    }

    /// Decibel labels for the colorbar ticks of a 3D plot.
    pub fn colorbar_ticks(&self, scaler: &Scaler, style: DecibelStyle) -> Vec<String> {
        let unit = self.unit.label();
        scaler
            .ticks()
            .iter()
            .map(|&t| match style {
                DecibelStyle::Both => format!("{:.2} {unit} ({t:.2} dB)", t + self.max_gain),
                DecibelStyle::Absolute => format!("{:.2} {unit}", t + self.max_gain),
                DecibelStyle::Relative => format!("{t:.2} dB"),
            })
            .collect()
    }
}

/// Labelling of gain values on colorbars and hover text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecibelStyle {
    Absolute,
    #[default]
    Relative,
    Both,
}

impl std::str::FromStr for DecibelStyle {
    type Err = AntennaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absolute" => Ok(DecibelStyle::Absolute),
            "relative" => Ok(DecibelStyle::Relative),
            "both" => Ok(DecibelStyle::Both),
            other => Err(AntennaError::Config(format!(
                "unknown decibel style \"{other}\", expected absolute, relative or both"
            ))),
        }
    }
}

/// Most frequent value; on a tie the value first seen last wins.
fn most_common(values: impl Iterator<Item = usize>) -> usize {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    let mut order = Vec::new();
    for v in values {
        let count = counts.entry(v).or_insert(0);
        if *count == 0 {
            order.push(v);
        }
        *count += 1;
    }
    let mut best = None;
    for v in order {
        let count = counts[&v];
        match best {
            Some((_, c)) if c > count => {}
            _ => best = Some((v, count)),
        }
    }
    best.map_or(0, |(v, _)| v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::Dialect;
    use crate::math::scaling::ScaleMethod;
    use crate::model::{GainData, Geometry};
    use ndarray::Array2;

    const THETAS: [f64; 3] = [0.0, 45.0, 90.0];
    const PHIS: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

    fn pattern(frequency: f64, peak: (usize, usize), value: f64) -> GainData {
        let mut gains = Array2::from_elem((3, 4), -10.0);
        gains[[peak.0, peak.1]] = value;
        GainData::from_grid(frequency, Polarization::Sum, &THETAS, &PHIS, gains.view()).unwrap()
    }

    fn model() -> AntennaModel {
        AntennaModel::new(
            Dialect::Nec2,
            vec![
                pattern(7.0, (1, 1), 3.0),
                pattern(14.0, (1, 1), 5.0),
                pattern(21.0, (2, 3), 4.0),
            ],
            Vec::new(),
            Geometry::default(),
        )
        .with_title("beam")
    }

    #[test]
    fn default_cut_follows_most_common_maximum() {
        let set = PatternSet::new(&model(), Polarization::Sum, CutAngles::default()).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.max_gain(), 5.0);
        assert_eq!(set.cut_theta(), 45.0);
        assert_eq!(set.cut_phi(), 90.0);
    }

    #[test]
    fn explicit_angles_snap_to_samples() {
        let cut = CutAngles {
            azimuth: Some(200.0),
            elevation: Some(2.0),
        };
        let set = PatternSet::new(&model(), Polarization::Sum, cut).unwrap();
        assert_eq!(set.cut_phi(), 180.0);
        assert_eq!(set.cut_theta(), 90.0);
    }

    #[test]
    fn azimuth_cut_uses_row_and_describes_it() {
        let set = PatternSet::new(&model(), Polarization::Sum, CutAngles::default()).unwrap();
        let scaler = Scaler::default();
        let cut = set.azimuth_cut(1, &scaler).unwrap();
        assert_eq!(cut.angles, PHIS.to_vec());
        assert_eq!(cut.gains, vec![-10.0, 5.0, -10.0, -10.0]);
        assert_eq!(cut.radii[1], 1.0);
        assert_eq!(cut.label_angle, 90.0);
        assert_eq!(cut.description[0], "Azimuth Pattern");
        assert_eq!(cut.description[1], "Title: beam");
        assert_eq!(cut.description[2], "Frequency: 14.00 MHz");
        assert_eq!(cut.description[3], "Outer ring: 5.00 dBi");
        assert_eq!(cut.description[4], "Scaling: ARRL");
        assert_eq!(cut.description[5], "Elevation: 45.00°");
    }

    #[test]
    fn elevation_cut_joins_opposite_half() {
        let set = PatternSet::new(&model(), Polarization::Sum, CutAngles::default()).unwrap();
        let cut = set.elevation_cut(0, &Scaler::default()).unwrap();
        assert_eq!(cut.angles, vec![90.0, 45.0, 0.0, 180.0, 135.0, 90.0]);
        assert_eq!(cut.gains, vec![-10.0, 3.0, -10.0, -10.0, -10.0, -10.0]);
        assert_eq!(cut.description.last().unwrap(), "Azimuth: 90.00° (X=0°)");
        assert_eq!(cut.label_angle, 45.0);
    }

    #[test]
    fn elevation_cut_needs_opposite_azimuth() {
        let gains = Array2::from_elem((1, 2), 0.0);
        let data =
            GainData::from_grid(7.0, Polarization::Sum, &[90.0], &[0.0, 90.0], gains.view())
                .unwrap();
        let model = AntennaModel::new(Dialect::Nec2, vec![data], Vec::new(), Geometry::default());
        let set = PatternSet::new(&model, Polarization::Sum, CutAngles::default()).unwrap();
        assert!(matches!(
            set.elevation_cut(0, &Scaler::default()),
            Err(AntennaError::NoOppositeAzimuth(_))
        ));
    }

    #[test]
    fn surface_places_maximum_on_unit_sphere() {
        let set = PatternSet::new(&model(), Polarization::Sum, CutAngles::default()).unwrap();
        let scaler = Scaler::new(ScaleMethod::Linear, -50.0).unwrap();
        let surface = set.surface(1, &scaler).unwrap();
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert!(surface.x[[1, 1]].abs() < 1e-12);
        assert!((surface.y[[1, 1]] - s).abs() < 1e-12);
        assert!((surface.z[[1, 1]] - s).abs() < 1e-12);
        assert_eq!(surface.customdata[[1, 1, 0]], 5.0);
        assert_eq!(surface.customdata[[1, 1, 1]], 0.0);
        assert_eq!(surface.customdata[[1, 1, 3]], 45.0);
        let range = set.scene_range(&scaler).unwrap();
        assert!(range.half_extent() > 0.0);
    }

    #[test]
    fn colorbar_labels_follow_style() {
        let set = PatternSet::new(&model(), Polarization::Sum, CutAngles::default()).unwrap();
        let scaler = Scaler::default();
        let both = set.colorbar_ticks(&scaler, DecibelStyle::Both);
        assert_eq!(both[1], "2.00 dBi (-3.00 dB)");
        let rel = set.colorbar_ticks(&scaler, DecibelStyle::Relative);
        assert_eq!(rel[0], "0.00 dB");
        assert_eq!("both".parse::<DecibelStyle>().unwrap(), DecibelStyle::Both);
    }

    #[test]
    fn ties_pick_the_value_seen_last() {
        assert_eq!(most_common([1, 2, 2, 1].into_iter()), 2);
        assert_eq!(most_common([3, 1, 1].into_iter()), 1);
        assert_eq!(most_common(std::iter::empty()), 0);
    }
}
