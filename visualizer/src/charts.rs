//! Canvas programs drawing the current frequency of the model.

use crate::Message;
use antcore::math::color::{rainbow, GRID_COLOR, IMAG_COLOR, REAL_COLOR};
use antcore::math::projection::{SceneRange, ViewProjection};
use antcore::math::range::PlotRange;
use antcore::model::swr::Band;
use antcore::processing::{PolarCut, Surface};
use antcore::SwrSeries;
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Pixels, Point, Rectangle, Renderer, Size, Theme,
};

const BACKGROUND: Color = Color::from_rgb(0.05, 0.05, 0.06);
const CURVE: Color = Color::from_rgb(0.18, 0.72, 0.89);
const LABEL: Color = Color::from_rgb(0.8, 0.8, 0.85);
const BAND: Color = Color::from_rgba(0.4, 0.9, 0.4, 0.18);

fn hex_color(hex: &str) -> Color {
    antcore::math::color::parse_hex(hex)
        .map(|[r, g, b]| Color::from_rgb8(r, g, b))
        .unwrap_or(LABEL)
}

fn label(frame: &mut Frame, content: impl Into<String>, position: Point, size: f32) {
    frame.fill_text(canvas::Text {
        content: content.into(),
        position,
        color: LABEL,
        size: Pixels(size),
        ..canvas::Text::default()
    });
}

fn background(frame: &mut Frame, bounds: Rectangle) {
    frame.fill_rectangle(Point::ORIGIN, bounds.size(), BACKGROUND);
}

/// Azimuth or elevation cut on a polar grid with the scaler's rings.
#[derive(Clone)]
pub struct PolarChart {
    pub cut: Option<PolarCut>,
    pub rings: Vec<(f64, String)>,
}

impl canvas::Program<Message> for PolarChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        background(&mut frame, bounds);
        let Some(cut) = &self.cut else {
            label(&mut frame, "no pattern", Point::new(12.0, 20.0), 14.0);
            return vec![frame.into_geometry()];
        };

        let center = Point::new(bounds.width / 2.0, bounds.height / 2.0 + 8.0);
        let radius = bounds.width.min(bounds.height - 16.0) / 2.0 - 14.0;
        let grid = Stroke::default().with_color(hex_color(GRID_COLOR)).with_width(0.6);
        for (value, text) in &self.rings {
            let r = *value as f32 * radius;
            frame.stroke(&Path::circle(center, r), grid);
            if !text.is_empty() {
                label(&mut frame, text.as_str(), Point::new(center.x + 2.0, center.y - r), 10.0);
            }
        }
        let spokes = Path::new(|builder| {
            for deg in (0..360).step_by(30) {
                let a = (deg as f32).to_radians();
                builder.move_to(center);
                builder.line_to(Point::new(center.x + radius * a.cos(), center.y - radius * a.sin()));
            }
        });
        frame.stroke(&spokes, grid);

        let points = cut.points();
        if points.len() > 1 {
            let curve = Path::new(|builder| {
                for (i, &(x, y)) in points.iter().enumerate() {
                    let p = Point::new(center.x + x as f32 * radius, center.y - y as f32 * radius);
                    if i == 0 {
                        builder.move_to(p);
                    } else {
                        builder.line_to(p);
                    }
                }
                builder.close();
            });
            frame.stroke(&curve, Stroke::default().with_width(2.0).with_color(CURVE));
        }
        for (i, line) in cut.description.iter().skip(1).take(4).enumerate() {
            label(&mut frame, line.as_str(), Point::new(8.0, 6.0 + 14.0 * i as f32), 11.0);
        }
        vec![frame.into_geometry()]
    }
}

/// VSWR over the sweep with bands and the selected frequency marked.
#[derive(Clone)]
pub struct VswrChart {
    pub swr: Option<SwrSeries>,
    pub bands: Vec<Band>,
    pub marker: Option<f64>,
    pub show_impedance: bool,
}

impl canvas::Program<Message> for VswrChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        background(&mut frame, bounds);
        let Some(swr) = &self.swr else {
            label(&mut frame, "no impedance data", Point::new(12.0, 20.0), 14.0);
            return vec![frame.into_geometry()];
        };

        let (left, right, top, bottom) = (44.0, bounds.width - 12.0, 12.0, bounds.height - 26.0);
        let (lo, hi) = swr.frequency_range();
        let span = if hi > lo { hi - lo } else { 1.0 };
        let fx = |f: f64| left + ((f - lo) / span) as f32 * (right - left);
        let vswr = swr.vswr();
        let range = PlotRange::new(&vswr, Some(1.0)).unwrap_or(PlotRange {
            low: 1.0,
            high: 2.0,
            tick: 0.25,
        });
        let vy = |v: f64| {
            let t = ((v - range.low) / (range.high - range.low)).clamp(0.0, 1.0) as f32;
            bottom - t * (bottom - top)
        };

        for band in &self.bands {
            let (x0, x1) = (fx(band.low.max(lo)), fx(band.high.min(hi)));
            frame.fill_rectangle(Point::new(x0, top), Size::new((x1 - x0).max(0.0), bottom - top), BAND);
            label(&mut frame, band.name.as_str(), Point::new(x0 + 2.0, top + 2.0), 10.0);
        }
        let grid = Stroke::default().with_color(hex_color(GRID_COLOR)).with_width(0.4);
        for tick in range.ticks() {
            let y = vy(tick);
            frame.stroke(&Path::line(Point::new(left, y), Point::new(right, y)), grid);
            label(&mut frame, range.format(tick, 1, ""), Point::new(4.0, y - 6.0), 10.0);
        }
        label(&mut frame, format!("{lo:.3}"), Point::new(left, bottom + 6.0), 10.0);
        label(&mut frame, format!("{hi:.3} MHz"), Point::new(right - 60.0, bottom + 6.0), 10.0);

        if self.show_impedance {
            let freqs = swr.frequencies();
            for (values, color) in [(swr.real(), REAL_COLOR), (swr.imag(), IMAG_COLOR)] {
                let Some(r) = PlotRange::new(&values, None) else { continue };
                let ry = |v: f64| {
                    let t = ((v - r.low) / (r.high - r.low)) as f32;
                    bottom - t * (bottom - top)
                };
                frame.stroke(
                    &polyline(freqs.iter().zip(&values).map(|(&f, &v)| Point::new(fx(f), ry(v)))),
                    Stroke::default().with_width(1.0).with_color(hex_color(color)),
                );
            }
        }
        let curve = polyline(swr.points().iter().map(|p| Point::new(fx(p.frequency), vy(p.vswr))));
        frame.stroke(&curve, Stroke::default().with_width(2.0).with_color(CURVE));

        if let Some(f) = self.marker.filter(|f| swr.contains_frequency(*f)) {
            let x = fx(f);
            frame.stroke(
                &Path::line(Point::new(x, top), Point::new(x, bottom)),
                Stroke::default().with_width(1.0).with_color(Color::WHITE),
            );
        }
        let min = swr.minimum();
        label(
            &mut frame,
            format!("min VSWR {:.2} at {:.3} MHz", min.vswr, min.frequency),
            Point::new(left + 4.0, bottom - 16.0),
            11.0,
        );
        vec![frame.into_geometry()]
    }
}

fn polyline(points: impl Iterator<Item = Point>) -> Path {
    Path::new(|builder| {
        for (i, p) in points.enumerate() {
            if i == 0 {
                builder.move_to(p);
            } else {
                builder.line_to(p);
            }
        }
    })
}

/// Painter's-algorithm rendering of the 3D pattern surface.
#[derive(Clone)]
pub struct SurfaceChart {
    pub surface: Option<Surface>,
    pub range: Option<SceneRange>,
    pub view: ViewProjection,
    /// Phi covers the full circle, so the last column joins the first.
    pub closed: bool,
}

impl canvas::Program<Message> for SurfaceChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        background(&mut frame, bounds);
        let (Some(surface), Some(range)) = (&self.surface, &self.range) else {
            label(&mut frame, "no pattern", Point::new(12.0, 20.0), 14.0);
            return vec![frame.into_geometry()];
        };

        let (cx, cy, _) = self.view.project(range.center());
        let half = range.half_extent().max(f64::EPSILON);
        let scale = (bounds.width.min(bounds.height) / 2.0 - 8.0) as f64 / (half * 3f64.sqrt());
        let to_screen = |i: usize, j: usize| {
            let p = [surface.x[[i, j]], surface.y[[i, j]], surface.z[[i, j]]];
            let (sx, sy, depth) = self.view.project(p);
            (
                Point::new(
                    bounds.width / 2.0 + ((sx - cx) * scale) as f32,
                    bounds.height / 2.0 - ((sy - cy) * scale) as f32,
                ),
                depth,
            )
        };

        let (rows, cols) = surface.radii.dim();
        let col_pairs = if self.closed { cols } else { cols.saturating_sub(1) };
        let mut quads = Vec::with_capacity(rows * cols);
        for i in 0..rows.saturating_sub(1) {
            for j in 0..col_pairs {
                let k = (j + 1) % cols;
                let corners = [(i, j), (i + 1, j), (i + 1, k), (i, k)];
                let mut points = [Point::ORIGIN; 4];
                let mut depth = 0.0;
                let mut radius = 0.0;
                for (n, &(a, b)) in corners.iter().enumerate() {
                    let (p, d) = to_screen(a, b);
                    points[n] = p;
                    depth += d / 4.0;
                    radius += surface.radii[[a, b]] / 4.0;
                }
                quads.push((depth, radius, points));
            }
        }
        quads.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (_, radius, points) in quads {
            let [r, g, b] = rainbow(radius);
            let quad = Path::new(|builder| {
                builder.move_to(points[0]);
                for p in &points[1..] {
                    builder.line_to(*p);
                }
                builder.close();
            });
            frame.fill(&quad, Color::from_rgb8(r, g, b));
        }
        label(
            &mut frame,
            format!("f={:.3} MHz", surface.frequency),
            Point::new(8.0, 6.0),
            12.0,
        );
        vec![frame.into_geometry()]
    }
}
