use crate::render::{HtmlExportOption, PlotKind};
use anyhow::Context;
use antcore::math::scaling::DEFAULT_MIN_DB;
use antcore::processing::DecibelStyle;
use antcore::prelude::{ScaleMethod, Scaler};
use antcore::Polarization;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_PORT: u16 = 9000;

/// VSWR chart options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwrOptions {
    pub target_frequency: Option<f64>,
    /// Color of the minimum-VSWR marker; `none` hides it.
    pub min_color: String,
    pub target_color: String,
    pub show_impedance: bool,
    pub plot_impedance_angle: bool,
    pub show_bands: bool,
    /// `name:low,high` in MHz; `high <= low` removes a default band.
    pub bands: Vec<String>,
}

impl Default for SwrOptions {
    fn default() -> Self {
        Self {
            target_frequency: None,
            min_color: "green".into(),
            target_color: "grey".into(),
            show_impedance: false,
            plot_impedance_angle: false,
            show_bands: false,
            bands: Vec::new(),
        }
    }
}

impl SwrOptions {
    /// Minimum marker color unless disabled with `none`.
    pub fn min_marker(&self) -> Option<&str> {
        let color = self.min_color.trim();
        if color.is_empty() || color.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(color)
        }
    }
}

/// Plot settings read from a YAML file; command line options override them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Empty selects azimuth, elevation, 3D and VSWR.
    pub plots: Vec<PlotKind>,
    pub angle_azimuth: Option<f64>,
    pub angle_elevation: Option<f64>,
    pub scaling_method: ScaleMethod,
    pub scaling_mindb: f64,
    pub system_impedance: f64,
    pub polarization: Option<Polarization>,
    pub interpolate_azimuth_step: Option<f64>,
    pub swr: SwrOptions,
    pub title: Option<String>,
    pub title_font_size: Option<u32>,
    pub dpi: u32,
    pub margin_3d: u32,
    pub wireframe: bool,
    pub decibel_style: DecibelStyle,
    pub html_export_option: HtmlExportOption,
    pub show_plotly_logo: bool,
    pub port: u16,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            plots: Vec::new(),
            angle_azimuth: None,
            angle_elevation: None,
            scaling_method: ScaleMethod::default(),
            scaling_mindb: DEFAULT_MIN_DB,
            system_impedance: 50.0,
            polarization: None,
            interpolate_azimuth_step: None,
            swr: SwrOptions::default(),
            title: None,
            title_font_size: None,
            dpi: 80,
            margin_3d: 20,
            wireframe: false,
            decibel_style: DecibelStyle::default(),
            html_export_option: HtmlExportOption::default(),
            show_plotly_logo: false,
            port: DEFAULT_PORT,
        }
    }
}

impl PlotConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading plot config {}", path_ref.display()))?;
        let config: PlotConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing plot config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Requested plots in drawing order.
    pub fn selected_plots(&self) -> Vec<PlotKind> {
        let wanted: &[PlotKind] = if self.plots.is_empty() {
            &PlotKind::DEFAULT
        } else {
            &self.plots
        };
        PlotKind::ALL
            .into_iter()
            .filter(|kind| wanted.contains(kind))
            .collect()
    }

    pub fn scaler(&self) -> anyhow::Result<Scaler> {
        Scaler::new(self.scaling_method, self.scaling_mindb)
            .context("configuring the gain scaling")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_selection_is_the_four_main_plots() {
        let cfg = PlotConfig::default();
        assert_eq!(
            cfg.selected_plots(),
            vec![PlotKind::Azimuth, PlotKind::Elevation, PlotKind::Vswr, PlotKind::Plot3d]
        );
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"plots: [plot_smith, azimuth]\nscaling_method: linear_db\nscaling_mindb: -40\nswr:\n  show_bands: true\n  bands: ['2m:144,148']\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = PlotConfig::load(&path).unwrap();
        assert_eq!(cfg.selected_plots(), vec![PlotKind::Azimuth, PlotKind::Smith]);
        assert_eq!(cfg.scaling_method, ScaleMethod::LinearDb);
        assert_eq!(cfg.scaler().unwrap().min_db(), -40.0);
        assert!(cfg.swr.show_bands);
        assert_eq!(cfg.swr.min_color, "green");
        assert_eq!(cfg.system_impedance, 50.0);
    }

    #[test]
    fn positive_min_db_is_rejected() {
        let cfg = PlotConfig {
            scaling_method: ScaleMethod::LinearDb,
            scaling_mindb: 3.0,
            ..PlotConfig::default()
        };
        assert!(cfg.scaler().is_err());
    }

    #[test]
    fn none_disables_minimum_marker() {
        let mut swr = SwrOptions::default();
        assert_eq!(swr.min_marker(), Some("green"));
        swr.min_color = "None".into();
        assert_eq!(swr.min_marker(), None);
    }
}
