use super::html::{HtmlExportOption, PlotlyFigure};
use super::{escape, missing, Backend, PlotData, PlotKind, RenderedPlot};
use crate::workflow::config::PlotConfig;
use antcore::math::color::{light, palette, GRID_COLOR, GROUND_COLOR, IMAG_COLOR, REAL_COLOR, TABLEAU};
use antcore::math::range::PlotRange;
use antcore::math::projection::SceneRange;
use antcore::processing::{CutKind, DecibelStyle, PatternSet};
use antcore::{FrequencySet, Geometry, SwrSeries};
use serde_json::{json, Value};

const FONT_SANS: &str = "Helvetica, Nimbus Sans, Liberation Sans, Open Sans, arial, sans-serif";
const OHM: &str = " \u{2126}";
const BAND_COLOR: &str = "#CCFFCC";

/// Turns every legend entry of the 3D plot into a radio button: the click
/// handler hides all traces before plotly shows the clicked one.
const RADIO_LEGEND_SCRIPT: &str = r#"
var myPlot = document.getElementById('{plot_id}');
myPlot.on('plotly_legendclick', function (clickData) {
    var xlen = clickData.data.length;
    for (var i = 0; i < xlen; i++) {
        clickData.data[i].visible = 'legendonly';
    }
});
"#;

fn polar_reset_script(label_angle: f64, tickangle: i32) -> String {
    format!(
        r#"
var myPlot = document.getElementById('{{plot_id}}');
Plotly.relayout(myPlot, {{'modebar': {{'add': [{{
    'name': 'Reset',
    'icon': Plotly.Icons.home,
    'click': function (gd) {{
        Plotly.relayout(gd, {{
            'polar.radialaxis.range': [0, 1],
            'polar.radialaxis.angle': {label_angle},
            'polar.radialaxis.tickangle': {tickangle},
            'polar.angularaxis.rotation': 0
        }});
    }}
}}]}}}});
"#
    )
}

/// plotly.js figures, one HTML page per plot.
pub struct PlotlyBackend {
    export: HtmlExportOption,
}

impl PlotlyBackend {
    pub fn new(export: HtmlExportOption) -> Self {
        Self { export }
    }

    pub fn figure(
        &self,
        kind: PlotKind,
        data: &PlotData,
        config: &PlotConfig,
    ) -> anyhow::Result<PlotlyFigure> {
        match kind {
            PlotKind::Azimuth | PlotKind::Elevation => {
                let patterns = data.patterns.as_ref().ok_or_else(|| missing(kind, "pattern"))?;
                let cut = if kind == PlotKind::Azimuth {
                    CutKind::Azimuth
                } else {
                    CutKind::Elevation
                };
                polar_figure(cut, patterns, data, config)
            }
            PlotKind::Plot3d => {
                let patterns = data.patterns.as_ref().ok_or_else(|| missing(kind, "pattern"))?;
                surface_figure(patterns, data, config)
            }
            PlotKind::Vswr => {
                let swr = data.swr.as_ref().ok_or_else(|| missing(kind, "impedance"))?;
                Ok(vswr_figure(swr, data, config))
            }
            PlotKind::Smith => {
                let swr = data.swr.as_ref().ok_or_else(|| missing(kind, "impedance"))?;
                Ok(smith_figure(swr, &data.title))
            }
            PlotKind::Geometry => {
                if data.geometry.is_empty() {
                    return Err(missing(kind, "geometry"));
                }
                geometry_figure(&data.geometry, config)
            }
        }
    }
}

impl Backend for PlotlyBackend {
    fn name(&self) -> &'static str {
        "plotly"
    }

    fn render(&self, data: &PlotData, config: &PlotConfig) -> anyhow::Result<Vec<RenderedPlot>> {
        let plot_config = if config.show_plotly_logo {
            json!({})
        } else {
            json!({ "displaylogo": false })
        };
        let mut plots = Vec::new();
        for &kind in &data.kinds {
            let figure = self.figure(kind, data, config)?;
            let title = format!("{} - {}", data.title, kind.label());
            let id = format!("plot-{}", kind.name());
            let content = figure.to_html(&title, &id, self.export, &plot_config)?;
            plots.push(RenderedPlot {
                name: kind.name().to_string(),
                content,
            });
        }
        Ok(plots)
    }
}

fn visible(idx: usize) -> Value {
    if idx == 0 {
        Value::Bool(true)
    } else {
        Value::from("legendonly")
    }
}

fn title_font(config: &PlotConfig) -> Value {
    let mut font = json!({ "family": FONT_SANS, "color": "#010101" });
    if let Some(size) = config.title_font_size {
        font["size"] = json!(size);
    }
    font
}

fn polar_figure(
    kind: CutKind,
    patterns: &PatternSet,
    data: &PlotData,
    config: &PlotConfig,
) -> anyhow::Result<PlotlyFigure> {
    let scaler = &data.scaler;
    let unit = patterns.unit().label();
    let angle_name = match kind {
        CutKind::Azimuth => "Azimuth",
        CutKind::Elevation => "Elevation",
    };
    let template = format!("Gain: %{{text}}<br>{angle_name}: %{{theta}}<extra></extra>");
    let mut traces = Vec::new();
    let mut last = None;
    for idx in 0..patterns.len() {
        let cut = patterns.cut(kind, idx, scaler)?;
        let text: Vec<String> = cut
            .gains
            .iter()
            .map(|g| format!("{g:.2} {unit} ({:.2} dB)", g - patterns.max_gain()))
            .collect();
        let theta: Vec<f64> = cut.angles.iter().map(|a| a.rem_euclid(360.0)).collect();
        traces.push(json!({
            "type": "scatterpolar",
            "r": cut.radii,
            "theta": theta,
            "name": FrequencySet::label(cut.frequency),
            "mode": "lines",
            "visible": visible(idx),
            "text": text,
            "hovertemplate": template,
        }));
        last = Some(cut);
    }
    let cut = last.ok_or_else(|| anyhow::anyhow!("no pattern to draw"))?;

    // traces differ in frequency, so that line stays out of the title
    let title: Vec<&str> = cut
        .description
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 2)
        .map(|(_, line)| line.as_str())
        .collect();
    let title: Vec<String> = title.into_iter().map(escape).collect();
    let tickangle = if cut.label_angle > 180.0 { -90 } else { 90 };
    let layout = json!({
        "showlegend": true,
        "colorway": TABLEAU,
        "title": { "text": title.join("<br>"), "font": title_font(config) },
        "polar": {
            "bgcolor": "#FFFFFF",
            "angularaxis": {
                "rotation": 0,
                "direction": "counterclockwise",
                "dtick": 15,
                "linecolor": GRID_COLOR,
                "gridcolor": GRID_COLOR,
            },
            "radialaxis": {
                "tickmode": "array",
                "tickvals": scaler.tick_values(),
                "ticktext": scaler.tick_text(),
                "linecolor": GRID_COLOR,
                "gridcolor": GRID_COLOR,
                "tickangle": tickangle,
                "angle": cut.label_angle,
                "range": [0, 1],
            },
        },
    });
    Ok(PlotlyFigure::new(traces, layout).with_script(polar_reset_script(cut.label_angle, tickangle)))
}

fn surface_figure(
    patterns: &PatternSet,
    data: &PlotData,
    config: &PlotConfig,
) -> anyhow::Result<PlotlyFigure> {
    let scaler = &data.scaler;
    let range = patterns.scene_range(scaler)?;
    let multi = patterns.len() > 1;
    let legend_width = match (multi, config.decibel_style) {
        (false, _) => 0.0,
        (true, DecibelStyle::Both) => 0.1,
        (true, _) => 0.035,
    };
    let colorbar_x = if multi { 0.98 - legend_width } else { 1.02 };
    let ticktext = patterns.colorbar_ticks(scaler, config.decibel_style);
    let unit = patterns.unit().label();
    let template = format!(
        "Gain: %{{customdata[0]:.2f}} {unit} (%{{customdata[1]:.2f}} dB)<br>\
         Azimuth: %{{customdata[2]:.2f}}° (X: 0°)<br>\
         Elevation: %{{customdata[3]:.2f}}°<extra></extra>"
    );

    let mut traces = Vec::new();
    for idx in 0..patterns.len() {
        let surface = patterns.surface(idx, scaler)?;
        let mut tickvals = scaler.tick_values();
        // keep the 0 dB mark on the colorbar even if this frequency peaks lower
        if let Some(first) = tickvals.first_mut() {
            *first = surface.radii.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        }
        // plotly indexes customdata of surfaces (column, row)
        let (rows, cols, _) = surface.customdata.dim();
        let customdata: Vec<Vec<Vec<f64>>> = (0..cols)
            .map(|j| {
                (0..rows)
                    .map(|i| (0..4).map(|k| surface.customdata[[i, j, k]]).collect())
                    .collect()
            })
            .collect();
        let group = format!("l{idx}");
        let name = FrequencySet::label(surface.frequency);
        traces.push(json!({
            "type": "surface",
            "x": rows_of(&surface.x),
            "y": rows_of(&surface.y),
            "z": rows_of(&surface.z),
            "surfacecolor": rows_of(&surface.radii),
            "colorscale": "Rainbow",
            "visible": visible(idx),
            "legendgroup": group,
            "name": name,
            "colorbar": {
                "tickvals": tickvals,
                "ticktext": ticktext,
                "x": colorbar_x,
                "y": 0.49,
                "xpad": 0,
            },
            "customdata": customdata,
            "hovertemplate": template,
            "scene": "scene",
        }));
        if multi {
            traces.push(json!({
                "type": "scatter",
                "x": [1.0],
                "y": [1.0],
                "line": { "color": "white" },
                "legendgroup": group,
                "visible": visible(idx),
                "showlegend": true,
                "name": name,
                "xaxis": "x",
                "yaxis": "y",
            }));
        }
    }

    let mut layout = layout_3d(config, &range, false);
    layout["scene"]["domain"] = json!({ "x": [0.0, 1.0 - legend_width], "y": [0.0, 1.0] });
    layout["legend"] = json!({ "itemclick": "toggle", "itemdoubleclick": "toggle" });
    layout["xaxis"] = json!({
        "domain": [1.0 - legend_width, 1.0],
        "showticklabels": false,
        "showgrid": false,
        "zeroline": false,
    });
    layout["yaxis"] = json!({ "showticklabels": false, "showgrid": false, "zeroline": false });
    layout["title"] = json!({ "text": escape(patterns.title()), "font": title_font(config) });
    Ok(PlotlyFigure::new(traces, layout).with_script(RADIO_LEGEND_SCRIPT.to_string()))
}

fn rows_of(array: &ndarray::Array2<f64>) -> Vec<Vec<f64>> {
    array.rows().into_iter().map(|row| row.to_vec()).collect()
}

fn layout_3d(config: &PlotConfig, range: &SceneRange, tick_labels: bool) -> Value {
    let axis = |r: [f64; 2]| {
        json!({
            "linecolor": GRID_COLOR,
            "gridcolor": GRID_COLOR,
            "showbackground": false,
            "tickformat": ".3f",
            "range": r,
            "showticklabels": tick_labels,
        })
    };
    let m = config.margin_3d;
    json!({
        "showlegend": true,
        "colorway": TABLEAU,
        "paper_bgcolor": "white",
        "plot_bgcolor": "white",
        "margin": { "l": m, "r": m, "t": m, "b": m },
        "scene": {
            "xaxis": axis(range.x),
            "yaxis": axis(range.y),
            "zaxis": axis(range.z),
            "aspectratio": { "x": 1, "y": 1, "z": 1 },
        },
    })
}

fn line_trace(name: &str, x: &[f64], y: &[f64], color: &str, width: f64, axis: &str) -> Value {
    json!({
        "type": "scatter",
        "x": x,
        "y": y,
        "name": name,
        "line": { "color": color, "width": width },
        "yaxis": axis,
    })
}

fn range_axis(range: Option<PlotRange>) -> Value {
    match range {
        Some(r) => json!({ "range": [r.low, r.high], "dtick": r.tick }),
        None => json!({}),
    }
}

fn merge(target: &mut Value, extra: Value) {
    if let (Some(target), Value::Object(extra)) = (target.as_object_mut(), extra) {
        target.extend(extra);
    }
}

fn vswr_figure(swr: &SwrSeries, data: &PlotData, config: &PlotConfig) -> PlotlyFigure {
    let vswr_color = TABLEAU[0];
    let x = swr.frequencies();
    let vswr = swr.vswr();
    let mut traces = vec![line_trace("VSWR", &x, &vswr, vswr_color, 3.5, "y")];

    let mut yaxis = json!({
        "title": { "text": "VSWR" },
        "color": vswr_color,
        "linecolor": vswr_color,
        "showgrid": true,
        "gridcolor": light(vswr_color),
        "anchor": "x",
        "side": "left",
        "hoverformat": ".2f",
        "zeroline": false,
    });
    merge(&mut yaxis, range_axis(PlotRange::new(&vswr, Some(1.0))));
    let side_axis = |color: &str| {
        json!({
            "color": color,
            "linecolor": color,
            "showgrid": false,
            "gridcolor": light(color),
            "overlaying": "y",
            "side": "right",
            "hoverformat": ".1f",
            "zeroline": false,
        })
    };
    let mut yaxis2 = side_axis(REAL_COLOR);
    yaxis2["anchor"] = json!("x");
    let mut yaxis3 = side_axis(IMAG_COLOR);
    yaxis3["anchor"] = json!("free");
    yaxis3["position"] = json!(0.96);

    if config.swr.show_impedance {
        yaxis2["ticksuffix"] = json!(OHM);
        if config.swr.plot_impedance_angle {
            let magnitude = swr.magnitude();
            traces.push(line_trace("|Z|", &x, &magnitude, REAL_COLOR, 1.5, "y2"));
            traces.push(line_trace("phi (Z)", &x, &swr.phase_deg(), IMAG_COLOR, 1.5, "y3"));
            yaxis2["title"] = json!({ "text": "|Z|" });
            merge(&mut yaxis2, range_axis(PlotRange::new(&magnitude, None)));
            yaxis3["title"] = json!({ "text": "phi (Z)" });
            merge(&mut yaxis3, json!({ "range": [-180, 180], "dtick": 30, "ticksuffix": "°" }));
        } else {
            let real = swr.real();
            let imag = swr.imag();
            traces.push(line_trace("Z (real)", &x, &real, REAL_COLOR, 1.5, "y2"));
            traces.push(line_trace("Z (imag)", &x, &imag, IMAG_COLOR, 1.5, "y3"));
            yaxis2["title"] = json!({ "text": "Z (real)" });
            merge(&mut yaxis2, range_axis(PlotRange::new(&real, None)));
            yaxis3["title"] = json!({ "text": "Z (imag)" });
            merge(&mut yaxis3, range_axis(PlotRange::new(&imag, None)));
            yaxis3["ticksuffix"] = json!(OHM);
        }
    }

    let (lo, hi) = swr.frequency_range();
    let mut shapes = Vec::new();
    let mut annotations = Vec::new();
    if config.swr.show_bands {
        for band in &data.bands {
            shapes.push(json!({
                "type": "rect",
                "xref": "x",
                "yref": "paper",
                "x0": band.low.max(lo),
                "x1": band.high.min(hi),
                "y0": 0,
                "y1": 1,
                "fillcolor": BAND_COLOR,
                "line": { "width": 0 },
                "layer": "below",
            }));
            annotations.push(json!({
                "x": (band.low + band.high) / 2.0,
                "y": 0.98,
                "yref": "paper",
                "text": format!("<b>{}<br>band</b>", escape(&band.name)),
                "showarrow": false,
            }));
        }
    }
    let vline = |x: f64, color: &str| {
        json!({
            "type": "line",
            "xref": "x",
            "yref": "paper",
            "x0": x,
            "x1": x,
            "y0": 0,
            "y1": 1,
            "line": { "color": color, "dash": "dash" },
        })
    };
    if let Some(target) = data.swr_target {
        shapes.push(vline(target, &config.swr.target_color));
    }
    if let Some(color) = config.swr.min_marker() {
        shapes.push(vline(swr.minimum().frequency, color));
    }

    let layout = json!({
        "showlegend": true,
        "colorway": TABLEAU,
        "title": { "text": escape(&data.title), "font": title_font(config) },
        "xaxis": {
            "title": { "text": "Frequency (MHz)" },
            "linecolor": GRID_COLOR,
            "gridcolor": GRID_COLOR,
            "domain": [0, 0.9],
            "tickformat": ".1f",
            "zeroline": false,
        },
        "yaxis": yaxis,
        "yaxis2": yaxis2,
        "yaxis3": yaxis3,
        "shapes": shapes,
        "annotations": annotations,
        "paper_bgcolor": "white",
        "plot_bgcolor": "white",
        "hovermode": "x unified",
    });
    PlotlyFigure::new(traces, layout)
}

fn smith_figure(swr: &SwrSeries, title: &str) -> PlotlyFigure {
    let z0 = swr.z0();
    let normalized = swr.normalized();
    let text: Vec<String> = swr
        .frequencies()
        .iter()
        .map(|f| format!("{f:.1} MHz"))
        .collect();
    let customdata: Vec<[f64; 2]> = swr
        .points()
        .iter()
        .map(|p| [p.impedance.re, p.impedance.im])
        .collect();
    let template = format!(
        "%{{text}}<br>real: %{{real:.2f}} (%{{customdata[0]:.1f}}{OHM})<br>\
         imag: %{{imag:.2f}} (%{{customdata[1]:.1f}}{OHM})<extra></extra>"
    );
    let trace = json!({
        "type": "scattersmith",
        "real": normalized.iter().map(|z| z.re).collect::<Vec<_>>(),
        "imag": normalized.iter().map(|z| z.im).collect::<Vec<_>>(),
        "text": text,
        "customdata": customdata,
        "hovertemplate": template,
    });
    let z0_text = if z0.fract() == 0.0 {
        format!("Z<sub>0</sub> = {z0:.0}{OHM}")
    } else {
        format!("Z<sub>0</sub> = {z0:.1}{OHM}")
    };
    let layout = json!({
        "title": {
            "text": format!("Smith chart for {}", escape(title)),
            "font": { "family": FONT_SANS, "color": "#010101", "size": 20 },
        },
        "annotations": [{
            "x": 0.10,
            "y": 0.15,
            "xref": "paper",
            "yref": "paper",
            "text": z0_text,
            "showarrow": false,
        }],
    });
    PlotlyFigure::new(vec![trace], layout)
}

fn geometry_figure(geometry: &Geometry, config: &PlotConfig) -> anyhow::Result<PlotlyFigure> {
    let range = SceneRange::cubic(geometry.points(), geometry.has_ground)
        .ok_or_else(|| anyhow::anyhow!("geometry has no finite coordinates"))?;
    // wires are joined into one trace, separated by gaps
    let (mut x, mut y, mut z) = (Vec::new(), Vec::new(), Vec::new());
    for wire in &geometry.wires {
        if !x.is_empty() {
            x.push(Value::Null);
            y.push(Value::Null);
            z.push(Value::Null);
        }
        for p in wire {
            x.push(json!(p[0]));
            y.push(json!(p[1]));
            z.push(json!(p[2]));
        }
    }
    let mut traces = vec![json!({
        "type": "scatter3d",
        "mode": "lines",
        "connectgaps": false,
        "name": "Geometry",
        "x": x,
        "y": y,
        "z": z,
        "line": { "color": palette(0) },
    })];
    for (i, (name, points)) in geometry.loads.iter().enumerate() {
        traces.push(json!({
            "type": "scatter3d",
            "mode": "markers",
            "name": name,
            "x": points.iter().map(|p| p[0]).collect::<Vec<_>>(),
            "y": points.iter().map(|p| p[1]).collect::<Vec<_>>(),
            "z": points.iter().map(|p| p[2]).collect::<Vec<_>>(),
            "marker": { "color": palette(i + 1), "size": 3 },
        }));
    }
    if geometry.has_ground {
        let [x0, x1] = range.x;
        let [y0, y1] = range.y;
        traces.push(json!({
            "type": "surface",
            "x": [[x0, x1], [x0, x1]],
            "y": [[y0, y0], [y1, y1]],
            "z": [[0.0, 0.0], [0.0, 0.0]],
            "showscale": false,
            "colorscale": [[0, GROUND_COLOR], [1, GROUND_COLOR]],
            "opacity": 0.9,
            "name": "Ground",
        }));
    }
    let mut layout = layout_3d(config, &range, true);
    layout["legend"] = json!({ "itemsizing": "constant" });
    Ok(PlotlyFigure::new(traces, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::pattern::{demo_model, DemoConfig};
    use crate::workflow::runner::Runner;

    fn prepared(config: &PlotConfig) -> PlotData {
        let model = demo_model(&DemoConfig::default()).unwrap();
        Runner::new(config.clone()).prepare(model).unwrap()
    }

    #[test]
    fn one_page_per_plot_kind() {
        let config = PlotConfig {
            plots: PlotKind::ALL.to_vec(),
            ..PlotConfig::default()
        };
        let data = prepared(&config);
        let plots = PlotlyBackend::new(HtmlExportOption::Cdn)
            .render(&data, &config)
            .unwrap();
        let names: Vec<_> = plots.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["azimuth", "elevation", "plot_vswr", "plot3d", "plot_geo", "plot_smith"]
        );
        assert!(plots[0].content.contains(crate::render::html::PLOTLY_CDN));
        assert!(plots[0].content.contains("displaylogo"));
    }

    #[test]
    fn polar_traces_show_only_first_frequency() {
        let config = PlotConfig::default();
        let data = prepared(&config);
        let backend = PlotlyBackend::new(HtmlExportOption::Cdn);
        let figure = backend.figure(PlotKind::Azimuth, &data, &config).unwrap();
        let patterns = data.patterns.as_ref().unwrap();
        assert_eq!(figure.data.len(), patterns.len());
        assert_eq!(figure.data[0]["visible"], json!(true));
        assert_eq!(figure.data[1]["visible"], json!("legendonly"));
        assert_eq!(figure.layout["polar"]["radialaxis"]["range"], json!([0, 1]));
        let title = figure.layout["title"]["text"].as_str().unwrap();
        assert!(title.starts_with("Azimuth Pattern<br>Title: "));
        assert!(title.contains("Outer ring"));
        assert!(!title.contains("Frequency:"));
        assert!(figure.post_script.unwrap().contains("polar.radialaxis.angle"));
    }

    #[test]
    fn vswr_figure_marks_minimum_and_bands() {
        let mut config = PlotConfig::default();
        config.swr.show_bands = true;
        config.swr.show_impedance = true;
        let data = prepared(&config);
        let figure = PlotlyBackend::new(HtmlExportOption::Cdn)
            .figure(PlotKind::Vswr, &data, &config)
            .unwrap();
        assert_eq!(figure.data.len(), 3);
        let shapes = figure.layout["shapes"].as_array().unwrap();
        assert!(shapes.iter().any(|s| s["type"] == "rect"));
        assert!(shapes.iter().any(|s| s["line"]["color"] == "green"));
        assert_eq!(figure.layout["yaxis2"]["ticksuffix"], json!(OHM));
    }

    #[test]
    fn surface_adds_legend_traces_for_several_frequencies() {
        let config = PlotConfig::default();
        let data = prepared(&config);
        let figure = PlotlyBackend::new(HtmlExportOption::Cdn)
            .figure(PlotKind::Plot3d, &data, &config)
            .unwrap();
        let patterns = data.patterns.as_ref().unwrap();
        assert_eq!(figure.data.len(), 2 * patterns.len());
        assert_eq!(figure.data[0]["type"], "surface");
        assert_eq!(figure.data[1]["type"], "scatter");
        assert!(figure.post_script.unwrap().contains("plotly_legendclick"));
    }
}
