//! Renderer adapters: a static SVG figure and plotly.js HTML pages.

pub mod html;
pub mod plotly;
pub mod svg;

use crate::workflow::config::PlotConfig;
use antcore::model::swr::Band;
use antcore::prelude::Scaler;
use antcore::processing::PatternSet;
use antcore::{Geometry, SwrSeries};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub use html::HtmlExportOption;
pub use plotly::PlotlyBackend;
pub use svg::SvgBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotKind {
    #[serde(rename = "azimuth")]
    Azimuth,
    #[serde(rename = "elevation")]
    Elevation,
    #[serde(rename = "plot_vswr", alias = "vswr")]
    Vswr,
    #[serde(rename = "plot3d", alias = "3d")]
    Plot3d,
    #[serde(rename = "plot_geo", alias = "geo")]
    Geometry,
    #[serde(rename = "plot_smith", alias = "smith")]
    Smith,
}

impl PlotKind {
    pub const ALL: [PlotKind; 6] = [
        PlotKind::Azimuth,
        PlotKind::Elevation,
        PlotKind::Vswr,
        PlotKind::Plot3d,
        PlotKind::Geometry,
        PlotKind::Smith,
    ];

    pub const DEFAULT: [PlotKind; 4] = [
        PlotKind::Azimuth,
        PlotKind::Elevation,
        PlotKind::Plot3d,
        PlotKind::Vswr,
    ];

    /// Used as suffix of exported files and in server routes.
    pub fn name(&self) -> &'static str {
        match self {
            PlotKind::Azimuth => "azimuth",
            PlotKind::Elevation => "elevation",
            PlotKind::Vswr => "plot_vswr",
            PlotKind::Plot3d => "plot3d",
            PlotKind::Geometry => "plot_geo",
            PlotKind::Smith => "plot_smith",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlotKind::Azimuth => "Azimuth",
            PlotKind::Elevation => "Elevation",
            PlotKind::Vswr => "VSWR",
            PlotKind::Plot3d => "3D",
            PlotKind::Geometry => "Geometry",
            PlotKind::Smith => "Smith chart",
        }
    }

    pub fn needs_pattern(&self) -> bool {
        matches!(self, PlotKind::Azimuth | PlotKind::Elevation | PlotKind::Plot3d)
    }

    pub fn needs_impedance(&self) -> bool {
        matches!(self, PlotKind::Vswr | PlotKind::Smith)
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the rendered plots go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// One SVG image with all panels.
    Image(PathBuf),
    /// `<prefix>-<plot>.html` per plot.
    Html(String),
    /// Pages served by the push server.
    Browser,
    /// Interactive viewer with frequency slider.
    Window,
}

/// Everything the backends draw, prepared once per input file.
#[derive(Debug, Clone)]
pub struct PlotData {
    pub title: String,
    pub kinds: Vec<PlotKind>,
    pub patterns: Option<PatternSet>,
    pub swr: Option<SwrSeries>,
    /// Target frequency of the VSWR chart, dropped when out of range.
    pub swr_target: Option<f64>,
    /// Bands overlapping the VSWR frequency range.
    pub bands: Vec<Band>,
    pub geometry: Geometry,
    pub scaler: Scaler,
}

/// One output document.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPlot {
    pub name: String,
    pub content: String,
}

pub trait Backend {
    fn name(&self) -> &'static str;

    /// Renders every plot of `data.kinds`; fails when a plot cannot be drawn
    /// from the prepared data.
    fn render(&self, data: &PlotData, config: &PlotConfig) -> anyhow::Result<Vec<RenderedPlot>>;
}

pub(crate) fn missing(kind: PlotKind, what: &str) -> anyhow::Error {
    anyhow::anyhow!("{} plot requested but the input has no {what}", kind.label())
}

/// Escapes text for SVG and HTML bodies.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_names_match_file_suffixes() {
        let names: Vec<_> = PlotKind::ALL.iter().map(PlotKind::name).collect();
        assert_eq!(
            names,
            vec!["azimuth", "elevation", "plot_vswr", "plot3d", "plot_geo", "plot_smith"]
        );
        let kind: PlotKind = serde_yaml::from_str("smith").unwrap();
        assert_eq!(kind, PlotKind::Smith);
    }

    #[test]
    fn escape_handles_markup() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
