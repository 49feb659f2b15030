use crate::math::interpolate::AzimuthSeries;
use crate::model::{GainData, GainUnit, Polarization};
use crate::prelude::{AntennaError, AntennaResult};
use ndarray::{Array2, ArrayView1};

/// Dense (theta x phi) view of one [`GainData`].
///
/// Rows follow ascending zenith angle, columns ascending azimuth. Cells the
/// report did not sample are filled by azimuth interpolation within their
/// row.
#[derive(Debug, Clone, PartialEq)]
pub struct GainGrid {
    frequency: f64,
    polarization: Polarization,
    unit: GainUnit,
    thetas: Vec<f64>,
    phis: Vec<f64>,
    gains: Array2<f64>,
    max_gain: f64,
    theta_max_idx: usize,
    phi_max_idx: usize,
    filled: usize,
}

impl GainGrid {
    pub fn from_gain_data(data: &GainData) -> AntennaResult<Self> {
        if data.is_empty() {
            return Err(AntennaError::IncompleteGrid(format!(
                "no samples at {:.3} MHz",
                data.frequency()
            )));
        }
        let thetas = data.thetas();
        let phis = data.phis();
        let mut gains = Array2::zeros((thetas.len(), phis.len()));
        let mut filled = 0;
        for (i, &theta) in thetas.iter().enumerate() {
            let row = data.azimuth_row(theta);
            if row.len() == phis.len() {
                for (j, (_, gain)) in row.into_iter().enumerate() {
                    gains[[i, j]] = gain;
                }
                continue;
            }
            let series = AzimuthSeries::new(row)?;
            for (j, &phi) in phis.iter().enumerate() {
                gains[[i, j]] = series.at(phi);
            }
            filled += phis.len() - series.len();
        }

        let (mut theta_max_idx, mut phi_max_idx) = (0, 0);
        let mut max_gain = f64::NEG_INFINITY;
        for ((i, j), &g) in gains.indexed_iter() {
            if g > max_gain {
                max_gain = g;
                theta_max_idx = i;
                phi_max_idx = j;
            }
        }
        // at the poles every azimuth is the same direction; take the
        // azimuth from the neighbouring row instead
        let pole_row = match thetas[theta_max_idx] {
            t if t == 0.0 && thetas.len() > 1 => Some(1),
            t if t == 180.0 && thetas.len() > 1 => Some(thetas.len() - 2),
            _ => None,
        };
        if let Some(row) = pole_row {
            phi_max_idx = argmax(gains.row(row));
        }

        Ok(Self {
            frequency: data.frequency(),
            polarization: data.polarization(),
            unit: data.unit(),
            thetas,
            phis,
            gains,
            max_gain,
            theta_max_idx,
            phi_max_idx,
            filled,
        })
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn polarization(&self) -> Polarization {
        self.polarization
    }

    pub fn unit(&self) -> GainUnit {
        self.unit
    }

    /// Zenith angles in degrees.
    pub fn thetas(&self) -> &[f64] {
        &self.thetas
    }

    /// Azimuth angles in degrees.
    pub fn phis(&self) -> &[f64] {
        &self.phis
    }

    pub fn gains(&self) -> &Array2<f64> {
        &self.gains
    }

    pub fn max_gain(&self) -> f64 {
        self.max_gain
    }

    /// `(theta index, phi index)` of the strongest direction.
    pub fn max_idx(&self) -> (usize, usize) {
        (self.theta_max_idx, self.phi_max_idx)
    }

    /// Number of cells filled by interpolation.
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Gains over azimuth at one zenith index.
    pub fn row(&self, theta_idx: usize) -> ArrayView1<'_, f64> {
        self.gains.row(theta_idx)
    }

    /// Gains over zenith angle at one azimuth index.
    pub fn column(&self, phi_idx: usize) -> ArrayView1<'_, f64> {
        self.gains.column(phi_idx)
    }
}

/// Index of the first maximum.
fn argmax(values: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
