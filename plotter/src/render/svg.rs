use super::{escape, missing, Backend, PlotData, PlotKind, RenderedPlot};
use crate::workflow::config::PlotConfig;
use antcore::math::color::{light, palette, rainbow_hex, GRID_COLOR, GROUND_COLOR, IMAG_COLOR, REAL_COLOR};
use antcore::math::projection::{polar_to_cartesian, SceneRange, ViewProjection};
use antcore::math::range::PlotRange;
use antcore::model::Point3;
use antcore::processing::{CutKind, PatternSet};
use antcore::{Geometry, SwrSeries};
use std::fmt::Write as _;

/// Panel size in pixels at 80 dpi.
const PANEL_WIDTH: f64 = 512.0;
const PANEL_HEIGHT: f64 = 384.0;
const TITLE_HEIGHT: f64 = 30.0;
const FONT: &str = "Helvetica, Arial, sans-serif";
const BAND_COLOR: &str = "#CCFFCC";
const VSWR_COLOR: &str = "#1f77b4";

/// Resistance and reactance values of the Smith chart grid.
const SMITH_GRID: [f64; 5] = [0.2, 0.5, 1.0, 2.0, 5.0];

#[derive(Debug, Clone, Copy)]
struct Panel {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

/// Static image: all requested plots as panels of one SVG document, drawn
/// for the first frequency.
pub struct SvgBackend {
    view: ViewProjection,
}

impl SvgBackend {
    pub fn new() -> Self {
        Self {
            view: ViewProjection::default(),
        }
    }

    /// `(rows, columns)` of the panel grid.
    fn grid(count: usize) -> (usize, usize) {
        match count {
            0 | 1 => (1, 1),
            2 => (1, 2),
            3 | 4 => (2, 2),
            _ => (2, 3),
        }
    }

    pub fn document(&self, data: &PlotData, config: &PlotConfig) -> anyhow::Result<String> {
        let scale = f64::from(config.dpi.max(1)) / 80.0;
        let (pw, ph) = (PANEL_WIDTH * scale, PANEL_HEIGHT * scale);
        let (rows, cols) = Self::grid(data.kinds.len());
        let width = pw * cols as f64;
        let height = ph * rows as f64 + TITLE_HEIGHT;

        let mut svg = String::new();
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width:.0} {height:.0}" width="{width:.0}" height="{height:.0}" font-family="{FONT}">"#
        ));
        svg.push_str(&format!(
            r#"<rect x="0" y="0" width="{width:.0}" height="{height:.0}" fill="white"/>"#
        ));
        let title_size = config.title_font_size.unwrap_or(16);
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="22" font-size="{title_size}" text-anchor="middle">{}</text>"#,
            width / 2.0,
            escape(&data.title)
        ));
        for (n, &kind) in data.kinds.iter().enumerate() {
            let panel = Panel {
                x: (n % cols) as f64 * pw,
                y: (n / cols) as f64 * ph + TITLE_HEIGHT,
                w: pw,
                h: ph,
            };
            svg.push_str(&format!(
                r#"<g transform="translate({:.1},{:.1})">"#,
                panel.x, panel.y
            ));
            self.panel(&mut svg, kind, panel, data, config)?;
            svg.push_str("</g>");
        }
        svg.push_str("</svg>\n");
        Ok(svg)
    }

    fn panel(
        &self,
        svg: &mut String,
        kind: PlotKind,
        panel: Panel,
        data: &PlotData,
        config: &PlotConfig,
    ) -> anyhow::Result<()> {
        match kind {
            PlotKind::Azimuth | PlotKind::Elevation => {
                let patterns = data.patterns.as_ref().ok_or_else(|| missing(kind, "pattern"))?;
                let cut_kind = if kind == PlotKind::Azimuth {
                    CutKind::Azimuth
                } else {
                    CutKind::Elevation
                };
                polar_panel(svg, panel, patterns, cut_kind, data)
            }
            PlotKind::Plot3d => {
                let patterns = data.patterns.as_ref().ok_or_else(|| missing(kind, "pattern"))?;
                self.surface_panel(svg, panel, patterns, data, config.wireframe)
            }
            PlotKind::Vswr => {
                let swr = data.swr.as_ref().ok_or_else(|| missing(kind, "impedance"))?;
                vswr_panel(svg, panel, swr, data, config);
                Ok(())
            }
            PlotKind::Smith => {
                let swr = data.swr.as_ref().ok_or_else(|| missing(kind, "impedance"))?;
                smith_panel(svg, panel, swr);
                Ok(())
            }
            PlotKind::Geometry => {
                if data.geometry.is_empty() {
                    return Err(missing(kind, "geometry"));
                }
                self.geometry_panel(svg, panel, &data.geometry)
            }
        }
    }

    /// Screen mapping for a cubic scene centered in the panel.
    fn scene_mapper(&self, panel: Panel, range: &SceneRange) -> impl Fn(Point3) -> (f64, f64, f64) {
        let view = self.view;
        let (ccx, ccy, _) = view.project(range.center());
        let half = range.half_extent().max(f64::EPSILON);
        let scale = (panel.w.min(panel.h) / 2.0 - 20.0) / (half * 3f64.sqrt());
        let (px, py) = (panel.w / 2.0, panel.h / 2.0);
        move |p| {
            let (sx, sy, depth) = view.project(p);
            (px + (sx - ccx) * scale, py - (sy - ccy) * scale, depth)
        }
    }

    fn surface_panel(
        &self,
        svg: &mut String,
        panel: Panel,
        patterns: &PatternSet,
        data: &PlotData,
        wireframe: bool,
    ) -> anyhow::Result<()> {
        let surface = patterns.surface(0, &data.scaler)?;
        let range = patterns.scene_range(&data.scaler)?;
        let map = self.scene_mapper(panel, &range);
        let phis = patterns.grids()[0].phis();
        let (rows, cols) = surface.radii.dim();
        let closed = cols > 2
            && phis.last().zip(phis.get(1)).is_some_and(|(&last, &second)| {
                last + (second - phis[0]) >= 360.0 - 1e-6
            });
        let col_pairs = if closed { cols } else { cols.saturating_sub(1) };

        let mut quads = Vec::new();
        for i in 0..rows.saturating_sub(1) {
            for j in 0..col_pairs {
                let k = (j + 1) % cols;
                let corners = [(i, j), (i + 1, j), (i + 1, k), (i, k)];
                let mut points = Vec::with_capacity(4);
                let mut depth = 0.0;
                let mut radius = 0.0;
                for &(a, b) in &corners {
                    let (sx, sy, d) = map([surface.x[[a, b]], surface.y[[a, b]], surface.z[[a, b]]]);
                    points.push(format!("{sx:.1},{sy:.1}"));
                    depth += d / 4.0;
                    radius += surface.radii[[a, b]] / 4.0;
                }
                quads.push((depth, radius, points.join(" ")));
            }
        }
        quads.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (_, radius, points) in quads {
            let color = rainbow_hex(radius);
            if wireframe {
                svg.push_str(&format!(
                    r#"<polygon points="{points}" fill="none" stroke="{color}" stroke-width="0.6"/>"#
                ));
            } else {
                svg.push_str(&format!(
                    r#"<polygon points="{points}" fill="{color}" stroke="{color}" stroke-width="0.3"/>"#
                ));
            }
        }
        self.axes_cross(svg, &map, range.half_extent());
        let _ = write!(
            svg,
            r#"<text x="8" y="16" font-size="11">{}</text>"#,
            escape(&format!("3D pattern, f={:.2} MHz, scaling: {}", surface.frequency, data.scaler.title()))
        );
        Ok(())
    }

    fn axes_cross(&self, svg: &mut String, map: &impl Fn(Point3) -> (f64, f64, f64), len: f64) {
        let (ox, oy, _) = map([0.0, 0.0, 0.0]);
        for (label, end) in [("X", [len, 0.0, 0.0]), ("Y", [0.0, len, 0.0]), ("Z", [0.0, 0.0, len])] {
            let (ex, ey, _) = map(end);
            svg.push_str(&format!(
                r#"<line x1="{ox:.1}" y1="{oy:.1}" x2="{ex:.1}" y2="{ey:.1}" stroke="{GRID_COLOR}" stroke-width="1"/>"#
            ));
            svg.push_str(&format!(
                r##"<text x="{ex:.1}" y="{ey:.1}" font-size="11" fill="#555555">{label}</text>"##
            ));
        }
    }

    fn geometry_panel(&self, svg: &mut String, panel: Panel, geometry: &Geometry) -> anyhow::Result<()> {
        let range = SceneRange::cubic(geometry.points(), geometry.has_ground)
            .ok_or_else(|| anyhow::anyhow!("geometry has no finite coordinates"))?;
        let map = self.scene_mapper(panel, &range);
        if geometry.has_ground {
            let [x0, x1] = range.x;
            let [y0, y1] = range.y;
            let corners: Vec<String> = [[x0, y0, 0.0], [x1, y0, 0.0], [x1, y1, 0.0], [x0, y1, 0.0]]
                .into_iter()
                .map(|p| {
                    let (sx, sy, _) = map(p);
                    format!("{sx:.1},{sy:.1}")
                })
                .collect();
            svg.push_str(&format!(
                r#"<polygon points="{}" fill="{GROUND_COLOR}" fill-opacity="0.9"/>"#,
                corners.join(" ")
            ));
        }
        for wire in &geometry.wires {
            let points: Vec<String> = wire
                .iter()
                .map(|&p| {
                    let (sx, sy, _) = map(p);
                    format!("{sx:.1},{sy:.1}")
                })
                .collect();
            svg.push_str(&format!(
                r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="1.5"/>"#,
                points.join(" "),
                palette(0)
            ));
        }
        for (i, (name, points)) in geometry.loads.iter().enumerate() {
            let color = palette(i + 1);
            for &p in points {
                let (sx, sy, _) = map(p);
                svg.push_str(&format!(
                    r#"<circle cx="{sx:.1}" cy="{sy:.1}" r="3" fill="{color}"/>"#
                ));
            }
            let y = 16.0 + 14.0 * i as f64;
            svg.push_str(&format!(
                r#"<circle cx="12" cy="{:.1}" r="3" fill="{color}"/><text x="20" y="{y:.1}" font-size="11">{}</text>"#,
                y - 4.0,
                escape(name)
            ));
        }
        self.axes_cross(svg, &map, range.half_extent() / 2.0);
        Ok(())
    }
}

impl Default for SvgBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for SvgBackend {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn render(&self, data: &PlotData, config: &PlotConfig) -> anyhow::Result<Vec<RenderedPlot>> {
        Ok(vec![RenderedPlot {
            name: "figure".to_string(),
            content: self.document(data, config)?,
        }])
    }
}

fn polar_panel(
    svg: &mut String,
    panel: Panel,
    patterns: &PatternSet,
    kind: CutKind,
    data: &PlotData,
) -> anyhow::Result<()> {
    let cut = patterns.cut(kind, 0, &data.scaler)?;
    let radius = panel.h / 2.0 - 28.0;
    let (cx, cy) = (panel.w - radius - 40.0, panel.h / 2.0);
    let at = |angle: f64, r: f64| {
        let (x, y) = polar_to_cartesian(angle, r * radius);
        (cx + x, cy - y)
    };

    for deg in (0..360).step_by(15) {
        let (x, y) = at(f64::from(deg), 1.0);
        svg.push_str(&format!(
            r#"<line x1="{cx:.1}" y1="{cy:.1}" x2="{x:.1}" y2="{y:.1}" stroke="{GRID_COLOR}" stroke-width="0.5"/>"#
        ));
        if deg % 45 == 0 {
            let (lx, ly) = at(f64::from(deg), 1.09);
            svg.push_str(&format!(
                r#"<text x="{lx:.1}" y="{:.1}" font-size="10" text-anchor="middle">{deg}°</text>"#,
                ly + 3.0
            ));
        }
    }
    for (value, text) in data.scaler.tick_values().into_iter().zip(data.scaler.tick_text()) {
        svg.push_str(&format!(
            r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{:.1}" fill="none" stroke="{GRID_COLOR}" stroke-width="0.7"/>"#,
            value * radius
        ));
        if !text.is_empty() {
            let (x, y) = at(cut.label_angle, value);
            svg.push_str(&format!(
                r##"<text x="{x:.1}" y="{y:.1}" font-size="9" fill="#444444" text-anchor="middle">{text}</text>"##
            ));
        }
    }

    let mut path = String::new();
    for (i, &(x, y)) in cut.points().iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(path, "{cmd}{:.1},{:.1} ", cx + x * radius, cy - y * radius);
    }
    path.push('Z');
    svg.push_str(&format!(
        r#"<path d="{path}" fill="none" stroke="{VSWR_COLOR}" stroke-width="1.5"/>"#
    ));

    let lines = cut.description.len();
    for (i, line) in cut.description.iter().enumerate() {
        let y = panel.h - 8.0 - 13.0 * (lines - 1 - i) as f64;
        svg.push_str(&format!(
            r#"<text x="8" y="{y:.1}" font-size="10">{}</text>"#,
            escape(line)
        ));
    }
    if kind == CutKind::Azimuth {
        let (x, y) = at(0.0, 1.17);
        svg.push_str(&format!(r#"<text x="{x:.1}" y="{y:.1}" font-size="16">X</text>"#));
        let (x, y) = at(90.0, 1.17);
        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{:.1}" font-size="16" text-anchor="middle">Y</text>"#,
            y + 6.0
        ));
    }
    Ok(())
}

/// Linear map of `[lo, hi]` onto `[a, b]`.
fn axis_map(lo: f64, hi: f64, a: f64, b: f64) -> impl Fn(f64) -> f64 {
    let span = if hi > lo { hi - lo } else { 1.0 };
    move |v| a + (v - lo) / span * (b - a)
}

fn polyline(xs: &[f64], ys: &[f64], fx: &impl Fn(f64) -> f64, fy: &impl Fn(f64) -> f64) -> String {
    xs.iter()
        .zip(ys)
        .filter(|(_, y)| y.is_finite())
        .map(|(&x, &y)| format!("{:.1},{:.1}", fx(x), fy(y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn vswr_panel(svg: &mut String, panel: Panel, swr: &SwrSeries, data: &PlotData, config: &PlotConfig) {
    let opts = &config.swr;
    let right = if opts.show_impedance { 90.0 } else { 20.0 };
    let (left, top, bottom) = (55.0, 20.0, panel.h - 40.0);
    let plot_right = panel.w - right;

    let freqs = swr.frequencies();
    let vswr = swr.vswr();
    let (mut lo, mut hi) = swr.frequency_range();
    if hi <= lo {
        lo -= 0.5;
        hi += 0.5;
    }
    let fx = axis_map(lo, hi, left, plot_right);
    let yr = PlotRange::new(&vswr, Some(1.0)).unwrap_or(PlotRange {
        low: 1.0,
        high: 2.0,
        tick: 0.25,
    });
    let fy = axis_map(yr.low, yr.high, bottom, top);

    if opts.show_bands {
        for band in &data.bands {
            let (x0, x1) = (fx(band.low.max(lo)), fx(band.high.min(hi)));
            svg.push_str(&format!(
                r#"<rect x="{x0:.1}" y="{top:.1}" width="{:.1}" height="{:.1}" fill="{BAND_COLOR}"/>"#,
                (x1 - x0).max(0.0),
                bottom - top
            ));
            svg.push_str(&format!(
                r#"<text x="{:.1}" y="{:.1}" font-size="10" text-anchor="middle">{} band</text>"#,
                (x0 + x1) / 2.0,
                top + 12.0,
                escape(&band.name)
            ));
        }
    }

    let vswr_grid = light(VSWR_COLOR);
    for tick in yr.ticks() {
        let y = fy(tick);
        svg.push_str(&format!(
            r#"<line x1="{left:.1}" y1="{y:.1}" x2="{plot_right:.1}" y2="{y:.1}" stroke="{vswr_grid}" stroke-width="0.7"/>"#
        ));
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="10" fill="{VSWR_COLOR}" text-anchor="end">{}</text>"#,
            left - 4.0,
            y + 3.0,
            yr.format(tick, 1, "")
        ));
    }
    for k in 0..=4 {
        let f = lo + (hi - lo) * f64::from(k) / 4.0;
        let x = fx(f);
        svg.push_str(&format!(
            r#"<line x1="{x:.1}" y1="{top:.1}" x2="{x:.1}" y2="{bottom:.1}" stroke="{GRID_COLOR}" stroke-width="0.5"/>"#
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{:.1}" font-size="10" text-anchor="middle">{f:.2}</text>"#,
            bottom + 14.0
        ));
    }
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" font-size="11" text-anchor="middle">Frequency (MHz)</text>"#,
        (left + plot_right) / 2.0,
        panel.h - 8.0
    ));
    svg.push_str(&format!(
        r#"<text x="14" y="{:.1}" font-size="11" fill="{VSWR_COLOR}" text-anchor="middle" transform="rotate(-90 14 {:.1})">VSWR</text>"#,
        (top + bottom) / 2.0,
        (top + bottom) / 2.0
    ));

    let vline = |svg: &mut String, f: f64, color: &str| {
        let x = fx(f);
        svg.push_str(&format!(
            r#"<line x1="{x:.1}" y1="{top:.1}" x2="{x:.1}" y2="{bottom:.1}" stroke="{}" stroke-dasharray="5,4"/>"#,
            escape(color)
        ));
    };
    if let Some(target) = data.swr_target {
        vline(svg, target, &opts.target_color);
    }
    if let Some(color) = opts.min_marker() {
        vline(svg, swr.minimum().frequency, color);
    }

    if opts.show_impedance {
        let (first, second, angle) = if opts.plot_impedance_angle {
            (("|Z|", swr.magnitude()), ("phi (Z)", swr.phase_deg()), true)
        } else {
            (("Z (real)", swr.real()), ("Z (imag)", swr.imag()), false)
        };
        let r1 = PlotRange::new(&first.1, None);
        let r2 = if angle {
            Some(PlotRange {
                low: -180.0,
                high: 180.0,
                tick: 30.0,
            })
        } else {
            PlotRange::new(&second.1, None)
        };
        for (n, ((name, values), range, color)) in [(first, r1, REAL_COLOR), (second, r2, IMAG_COLOR)]
            .into_iter()
            .enumerate()
        {
            let Some(range) = range else { continue };
            let gy = axis_map(range.low, range.high, bottom, top);
            svg.push_str(&format!(
                r#"<polyline points="{}" fill="none" stroke="{color}" stroke-width="0.9"/>"#,
                polyline(&freqs, &values, &fx, &gy)
            ));
            let x = plot_right + 4.0 + 42.0 * n as f64;
            let tail = if angle && n == 1 { "°" } else { "" };
            for tick in range.ticks() {
                svg.push_str(&format!(
                    r#"<text x="{x:.1}" y="{:.1}" font-size="9" fill="{color}">{}</text>"#,
                    gy(tick) + 3.0,
                    range.format(tick, 1, tail)
                ));
            }
            svg.push_str(&format!(
                r#"<text x="{x:.1}" y="{:.1}" font-size="10" fill="{color}">{}</text>"#,
                top - 6.0,
                escape(name)
            ));
        }
    }

    svg.push_str(&format!(
        r#"<polyline points="{}" fill="none" stroke="{VSWR_COLOR}" stroke-width="2"/>"#,
        polyline(&freqs, &vswr, &fx, &fy)
    ));
    svg.push_str(&format!(
        r##"<rect x="{left:.1}" y="{top:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="#333333" stroke-width="0.8"/>"##,
        plot_right - left,
        bottom - top
    ));
}

fn smith_panel(svg: &mut String, panel: Panel, swr: &SwrSeries) {
    let radius = panel.w.min(panel.h) / 2.0 - 25.0;
    let (cx, cy) = (panel.w / 2.0, panel.h / 2.0);
    let at = |re: f64, im: f64| (cx + re * radius, cy - im * radius);

    svg.push_str(&format!(
        r#"<defs><clipPath id="smith-clip"><circle cx="{cx:.1}" cy="{cy:.1}" r="{radius:.1}"/></clipPath></defs>"#
    ));
    svg.push_str(&format!(
        r#"<g clip-path="url(#smith-clip)" fill="none" stroke="{GRID_COLOR}" stroke-width="0.7">"#
    ));
    for r in SMITH_GRID {
        let (x, y) = at(r / (1.0 + r), 0.0);
        svg.push_str(&format!(
            r#"<circle cx="{x:.1}" cy="{y:.1}" r="{:.1}"/>"#,
            radius / (1.0 + r)
        ));
    }
    for x in SMITH_GRID {
        for sign in [1.0, -1.0] {
            let (px, py) = at(1.0, sign / x);
            svg.push_str(&format!(
                r#"<circle cx="{px:.1}" cy="{py:.1}" r="{:.1}"/>"#,
                radius / x
            ));
        }
    }
    let (x0, y0) = at(-1.0, 0.0);
    let (x1, _) = at(1.0, 0.0);
    svg.push_str(&format!(r#"<line x1="{x0:.1}" y1="{y0:.1}" x2="{x1:.1}" y2="{y0:.1}"/>"#));
    svg.push_str("</g>");
    svg.push_str(&format!(
        r##"<circle cx="{cx:.1}" cy="{cy:.1}" r="{radius:.1}" fill="none" stroke="#333333" stroke-width="1"/>"##
    ));

    let points: Vec<(f64, f64)> = swr
        .reflections()
        .iter()
        .map(|g| at(g.re, g.im))
        .collect();
    let line: Vec<String> = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
    svg.push_str(&format!(
        r#"<polyline points="{}" fill="none" stroke="{VSWR_COLOR}" stroke-width="1.5"/>"#,
        line.join(" ")
    ));
    for (x, y) in &points {
        svg.push_str(&format!(
            r#"<circle cx="{x:.1}" cy="{y:.1}" r="2" fill="{VSWR_COLOR}"/>"#
        ));
    }
    let z0 = swr.z0();
    let z0_text = if z0.fract() == 0.0 {
        format!("Z0 = {z0:.0} \u{2126}")
    } else {
        format!("Z0 = {z0:.1} \u{2126}")
    };
    svg.push_str(&format!(
        r#"<text x="8" y="{:.1}" font-size="11">{z0_text}</text>"#,
        panel.h - 8.0
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::pattern::{demo_model, DemoConfig};
    use crate::workflow::runner::Runner;

    fn render(config: &PlotConfig) -> String {
        let model = demo_model(&DemoConfig::default()).unwrap();
        let data = Runner::new(config.clone()).prepare(model).unwrap();
        let plots = SvgBackend::new().render(&data, config).unwrap();
        assert_eq!(plots.len(), 1);
        plots.into_iter().next().unwrap().content
    }

    #[test]
    fn default_figure_has_four_panels() {
        let svg = render(&PlotConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<g transform=").count(), 4);
        assert!(svg.contains(r#"width="1024" height="798""#));
        assert!(svg.contains("Azimuth Pattern"));
        assert!(svg.contains("Frequency (MHz)"));
    }

    #[test]
    fn dpi_scales_panels() {
        let config = PlotConfig {
            plots: vec![PlotKind::Smith],
            dpi: 160,
            ..PlotConfig::default()
        };
        let svg = render(&config);
        assert!(svg.contains(r#"width="1024" height="798""#));
        assert!(svg.contains("smith-clip"));
        assert!(svg.contains("Z0 = 50"));
    }

    #[test]
    fn panel_grid_shapes() {
        assert_eq!(SvgBackend::grid(1), (1, 1));
        assert_eq!(SvgBackend::grid(2), (1, 2));
        assert_eq!(SvgBackend::grid(4), (2, 2));
        assert_eq!(SvgBackend::grid(6), (2, 3));
    }

    #[test]
    fn wireframe_leaves_faces_unfilled() {
        let config = PlotConfig {
            plots: vec![PlotKind::Plot3d],
            wireframe: true,
            ..PlotConfig::default()
        };
        let svg = render(&config);
        assert!(svg.contains(r##"fill="none" stroke="#"##));
        assert!(!svg.contains(r#"stroke-width="0.3""#));
    }
}
