use anyhow::Context;
use antcore::model::geometry::EXCITATION;
use antcore::model::ImpedancePoint;
use antcore::{AntennaModel, Dialect, GainData, Geometry, Polarization};
use ndarray::Array2;
use num_complex::Complex64;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Half-wave dipole gain over isotropic.
const DIPOLE_DBI: f64 = 2.15;
const NULL_DBI: f64 = -99.0;
const FEED_HEIGHT: f64 = 10.0;
const SWEEP_MARGIN: f64 = 0.1;

/// Synthetic horizontal dipole along the X axis used by `--demo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub title: String,
    pub start_mhz: f64,
    pub stop_mhz: f64,
    /// Pattern frequencies spread evenly over `start..=stop`.
    pub frequencies: usize,
    /// Angular grid step in degrees.
    pub step: f64,
    /// Peak jitter added to every gain, in dB.
    pub noise: f64,
    pub seed: u64,
    /// Points of the impedance sweep.
    pub sweep_points: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "Demo dipole".into(),
            start_mhz: 14.0,
            stop_mhz: 14.35,
            frequencies: 3,
            step: 5.0,
            noise: 0.2,
            seed: 0,
            sweep_points: 15,
        }
    }
}

impl DemoConfig {
    fn normalized_step(&self) -> f64 {
        if self.step.is_finite() && self.step > 0.0 {
            self.step.min(90.0)
        } else {
            5.0
        }
    }

    fn center(&self) -> f64 {
        (self.start_mhz + self.stop_mhz) / 2.0
    }
}

/// Evenly spaced values from `start` through `stop`.
fn spread(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![(start + stop) / 2.0],
        n => (0..n)
            .map(|i| start + (stop - start) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

fn angles(step: f64, end: f64, inclusive: bool) -> Vec<f64> {
    let count = (end / step).round() as usize;
    let count = if inclusive { count + 1 } else { count };
    (0..count).map(|i| i as f64 * step).collect()
}

/// Dipole field factor for the angle `psi` between ray and wire.
fn dipole_field(theta: f64, phi: f64) -> f64 {
    let cos_psi = theta.to_radians().sin() * phi.to_radians().cos();
    let sin_psi = (1.0 - cos_psi * cos_psi).max(0.0).sqrt();
    if sin_psi < 1e-9 {
        return 0.0;
    }
    (FRAC_PI_2 * cos_psi).cos() / sin_psi
}

fn build_gains(config: &DemoConfig, frequency: f64, rng: &mut StdRng) -> anyhow::Result<GainData> {
    let step = config.normalized_step();
    let thetas = angles(step, 180.0, true);
    let phis = angles(step, 360.0, false);
    // Slight broadening away from resonance.
    let detune = 1.0 + 2.0 * ((frequency - config.center()) / config.center()).abs();
    let noise = config.noise.abs();
    let mut gains = Array2::zeros((thetas.len(), phis.len()));
    for (i, &theta) in thetas.iter().enumerate() {
        for (j, &phi) in phis.iter().enumerate() {
            let field = dipole_field(theta, phi).abs().powf(1.0 / detune);
            let jitter = if noise > 0.0 { rng.gen_range(-noise..=noise) } else { 0.0 };
            gains[[i, j]] = if field > 0.0 {
                (DIPOLE_DBI + 20.0 * field.log10() + jitter).max(NULL_DBI)
            } else {
                NULL_DBI
            };
        }
    }
    GainData::from_grid(frequency, Polarization::Sum, &thetas, &phis, gains.view())
        .with_context(|| format!("building demo pattern at {frequency} MHz"))
}

fn build_impedances(config: &DemoConfig) -> Vec<ImpedancePoint> {
    let f0 = config.center();
    spread(
        config.start_mhz - SWEEP_MARGIN,
        config.stop_mhz + SWEEP_MARGIN,
        config.sweep_points.max(2),
    )
    .into_iter()
    .map(|frequency| {
        let offset = (frequency - f0) / f0;
        ImpedancePoint {
            frequency,
            impedance: Complex64::new(62.0 + 300.0 * offset, 1400.0 * offset),
        }
    })
    .collect()
}

fn build_geometry(config: &DemoConfig) -> Geometry {
    let half = 150.0 / config.center() / 2.0;
    let segments = 11;
    let ends: Vec<[f64; 3]> = (0..=segments)
        .map(|i| [-half + 2.0 * half * i as f64 / segments as f64, 0.0, FEED_HEIGHT])
        .collect();
    let mids: Vec<[f64; 3]> = ends
        .windows(2)
        .map(|w| [(w[0][0] + w[1][0]) / 2.0, 0.0, FEED_HEIGHT])
        .collect();
    let mut geometry = Geometry {
        wires: vec![ends],
        segments: mids.clone(),
        ..Geometry::default()
    };
    geometry.add_load(EXCITATION, mids[segments / 2]);
    geometry.segments_by_tag.insert(1, mids);
    geometry
}

pub fn demo_model(config: &DemoConfig) -> anyhow::Result<AntennaModel> {
    if !(config.stop_mhz >= config.start_mhz && config.start_mhz > 0.0) {
        anyhow::bail!(
            "demo frequency range {}..{} MHz is invalid",
            config.start_mhz,
            config.stop_mhz
        );
    }
    let mut rng = StdRng::seed_from_u64(config.seed);
    let gains = spread(config.start_mhz, config.stop_mhz, config.frequencies.max(1))
        .into_iter()
        .map(|f| build_gains(config, f, &mut rng))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(AntennaModel::new(
        Dialect::Nec2,
        gains,
        build_impedances(config),
        build_geometry(config),
    )
    .with_title(config.title.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_has_pattern_sweep_and_wire() {
        let model = demo_model(&DemoConfig::default()).unwrap();
        assert_eq!(model.frequencies().len(), 3);
        assert_eq!(model.impedances().len(), 15);
        assert!(model.has_geometry());
        assert_eq!(model.geometry().loads[EXCITATION].len(), 1);
        let data = &model.gains()[0];
        assert_eq!(data.thetas().len(), 37);
        assert_eq!(data.phis().len(), 72);
    }

    #[test]
    fn broadside_beats_wire_axis() {
        let config = DemoConfig {
            noise: 0.0,
            ..DemoConfig::default()
        };
        let model = demo_model(&config).unwrap();
        let data = &model.gains()[1];
        let broadside = data.gain(90.0, 90.0).unwrap();
        let axis = data.gain(90.0, 0.0).unwrap();
        assert!((broadside - DIPOLE_DBI).abs() < 1e-9);
        assert_eq!(axis, NULL_DBI);
    }

    #[test]
    fn seed_makes_output_repeatable() {
        let config = DemoConfig {
            seed: 7,
            ..DemoConfig::default()
        };
        assert_eq!(demo_model(&config).unwrap(), demo_model(&config).unwrap());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let config = DemoConfig {
            start_mhz: 20.0,
            stop_mhz: 10.0,
            ..DemoConfig::default()
        };
        assert!(demo_model(&config).is_err());
    }
}
