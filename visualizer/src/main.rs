use antcore::math::projection::ViewProjection;
use antcore::model::swr::{ham_bands, Band};
use antcore::prelude::{ScaleMethod, Scaler};
use antcore::processing::{CutAngles, CutKind, PatternSet};
use antcore::{AntennaModel, FrequencySet, SwrSeries};
use charts::{PolarChart, SurfaceChart, VswrChart};
use clap::Parser;
use iced::{
    time,
    widget::{button, column, row, slider, text, Canvas, Container},
    Alignment, Element, Length, Subscription, Task, Theme,
};
use std::path::PathBuf;
use std::time::Duration;

mod charts;

const DEFAULT_Z0: f64 = 50.0;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Interactive antenna pattern viewer")]
struct Args {
    /// Simulation report, measurement file or JSON model dump
    #[arg(required_unless_present = "remote")]
    filename: Option<PathBuf>,
    /// Base URL of a running plot-antenna server
    #[arg(long, conflicts_with = "filename")]
    remote: Option<String>,
    /// Show the frequency slider
    #[arg(long)]
    slider: bool,
    #[arg(long, default_value_t = DEFAULT_Z0)]
    system_impedance: f64,
    #[arg(long, default_value_t = ScaleMethod::Arrl)]
    scaling_method: ScaleMethod,
}

fn main() -> iced::Result {
    env_logger::init();
    let args = Args::parse();
    iced::application(move || Viewer::boot(args.clone()), Viewer::update, Viewer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(state: &Viewer) -> String {
    if state.title.is_empty() {
        "Antenna viewer".into()
    } else {
        format!("Antenna viewer - {}", state.title)
    }
}

/// Remote viewers poll the server so a republished model shows up.
fn application_subscription(state: &Viewer) -> Subscription<Message> {
    if state.remote.is_some() {
        time::every(Duration::from_secs(2)).map(|_| Message::Tick)
    } else {
        Subscription::none()
    }
}

fn application_theme(_: &Viewer) -> Theme {
    Theme::Dark
}

#[derive(Debug, Clone)]
pub enum Message {
    Tick,
    ModelFetched(Result<AntennaModel, String>),
    FrequencyChanged(u32),
    Step(isize),
    ScalingSelected(ScaleMethod),
    ToggleImpedance,
}

#[derive(Debug)]
struct Viewer {
    title: String,
    remote: Option<String>,
    slider: bool,
    z0: f64,
    model: Option<AntennaModel>,
    frequencies: FrequencySet,
    patterns: Option<PatternSet>,
    swr: Option<SwrSeries>,
    bands: Vec<Band>,
    scaler: Scaler,
    index: usize,
    show_impedance: bool,
    status: String,
}

impl Viewer {
    fn boot(args: Args) -> (Self, Task<Message>) {
        let scaler = Scaler::new(args.scaling_method, antcore::math::scaling::DEFAULT_MIN_DB)
            .unwrap_or_default();
        let mut viewer = Viewer {
            title: String::new(),
            remote: args.remote.clone(),
            slider: args.slider,
            z0: args.system_impedance,
            model: None,
            frequencies: FrequencySet::default(),
            patterns: None,
            swr: None,
            bands: Vec::new(),
            scaler,
            index: 0,
            show_impedance: false,
            status: "Loading...".into(),
        };
        let task = match (&args.remote, &args.filename) {
            (Some(url), _) => Task::perform(fetch_model(url.clone()), Message::ModelFetched),
            (None, Some(path)) => {
                match load_file(path) {
                    Ok(model) => viewer.set_model(model),
                    Err(err) => viewer.status = err,
                }
                Task::none()
            }
            (None, None) => Task::none(),
        };
        (viewer, task)
    }

    fn set_model(&mut self, model: AntennaModel) {
        if self.model.as_ref() == Some(&model) {
            return;
        }
        self.title = model.title.clone();
        self.frequencies = model.frequencies();
        self.index = self.index.min(self.frequencies.len().saturating_sub(1));
        self.patterns = model
            .default_polarization()
            .and_then(|pol| match PatternSet::new(&model, pol, CutAngles::default()) {
                Ok(set) => Some(set),
                Err(err) => {
                    log::warn!("pattern unavailable: {err}");
                    None
                }
            });
        self.swr = if model.has_impedance() {
            match model.swr(self.z0) {
                Ok(series) => Some(series),
                Err(err) => {
                    log::warn!("VSWR unavailable: {err}");
                    None
                }
            }
        } else {
            None
        };
        self.bands = self
            .swr
            .as_ref()
            .map(|swr| swr.bands_in_range(&ham_bands()).into_iter().cloned().collect())
            .unwrap_or_default();
        self.status = format!(
            "{} frequencies, {}",
            self.frequencies.len(),
            model.dialect.name()
        );
        self.model = Some(model);
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => match &state.remote {
                Some(url) => Task::perform(fetch_model(url.clone()), Message::ModelFetched),
                None => Task::none(),
            },
            Message::ModelFetched(Ok(model)) => {
                state.set_model(model);
                Task::none()
            }
            Message::ModelFetched(Err(err)) => {
                state.status = format!("Model error: {err}");
                Task::none()
            }
            Message::FrequencyChanged(idx) => {
                state.index = (idx as usize).min(state.frequencies.len().saturating_sub(1));
                Task::none()
            }
            Message::Step(delta) => {
                state.index = state.frequencies.step(state.index, delta);
                Task::none()
            }
            Message::ScalingSelected(method) => {
                state.scaler = state.scaler.with_method(method);
                Task::none()
            }
            Message::ToggleImpedance => {
                state.show_impedance = !state.show_impedance;
                Task::none()
            }
        }
    }

    /// Index of the current frequency within the pattern set.
    fn pattern_index(&self) -> Option<usize> {
        let patterns = self.patterns.as_ref()?;
        let frequency = self.frequencies.get(self.index)?;
        patterns
            .frequencies()
            .iter()
            .position(|f| (f - frequency).abs() < 1e-9)
    }

    fn polar_chart(&self, kind: CutKind) -> PolarChart {
        let cut = self.patterns.as_ref().zip(self.pattern_index()).and_then(|(set, idx)| {
            set.cut(kind, idx, &self.scaler)
                .map_err(|err| log::warn!("{} cut: {err}", kind.name()))
                .ok()
        });
        let rings = self
            .scaler
            .tick_values()
            .into_iter()
            .zip(self.scaler.tick_text())
            .collect();
        PolarChart { cut, rings }
    }

    fn surface_chart(&self) -> SurfaceChart {
        let surface = self
            .patterns
            .as_ref()
            .zip(self.pattern_index())
            .and_then(|(set, idx)| set.surface(idx, &self.scaler).ok());
        let range = self
            .patterns
            .as_ref()
            .and_then(|set| set.scene_range(&self.scaler).ok());
        let closed = self
            .patterns
            .as_ref()
            .and_then(|set| set.grids().first())
            .map(|grid| {
                let phis = grid.phis();
                phis.len() > 2 && phis[phis.len() - 1] + (phis[1] - phis[0]) >= 360.0 - 1e-6
            })
            .unwrap_or(false);
        SurfaceChart {
            surface,
            range,
            view: ViewProjection::default(),
            closed,
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let scaling = ScaleMethod::ALL.into_iter().fold(
            row![text("Scaling").size(14)].spacing(6).align_y(Alignment::Center),
            |row, method| {
                let label = if method == state.scaler.method() {
                    format!("[{}]", method.name())
                } else {
                    method.name().to_string()
                };
                row.push(button(text(label).size(13)).on_press(Message::ScalingSelected(method)))
            },
        );

        let frequency_label = state
            .frequencies
            .get(state.index)
            .map(FrequencySet::label)
            .unwrap_or_else(|| "no frequency".into());
        let mut controls = row![
            button("-").on_press(Message::Step(-1)),
            button("+").on_press(Message::Step(1)),
            text(frequency_label).size(16),
            button("Impedance").on_press(Message::ToggleImpedance),
        ]
        .spacing(8)
        .align_y(Alignment::Center);
        if state.slider && state.frequencies.len() > 1 {
            let last = (state.frequencies.len() - 1) as u32;
            controls = controls.push(
                slider(0..=last, state.index as u32, Message::FrequencyChanged).width(Length::Fixed(320.0)),
            );
        }

        let vswr = VswrChart {
            swr: state.swr.clone(),
            bands: state.bands.clone(),
            marker: state.frequencies.get(state.index),
            show_impedance: state.show_impedance,
        };
        let chart = |program| Canvas::new(program).width(Length::Fill).height(Length::Fixed(340.0));
        let charts = column![
            row![
                column![text("Azimuth").size(16), chart(state.polar_chart(CutKind::Azimuth))].spacing(4),
                column![text("Elevation").size(16), chart(state.polar_chart(CutKind::Elevation))].spacing(4),
            ]
            .spacing(12),
            row![
                column![text("3D").size(16), Canvas::new(state.surface_chart()).width(Length::Fill).height(Length::Fixed(340.0))]
                    .spacing(4),
                column![text("VSWR").size(16), Canvas::new(vswr).width(Length::Fill).height(Length::Fixed(340.0))]
                    .spacing(4),
            ]
            .spacing(12),
        ]
        .spacing(12);

        let layout = column![
            text(&state.title).size(24),
            controls,
            scaling,
            charts,
            text(&state.status).size(13),
        ]
        .spacing(10)
        .padding(16);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn load_file(path: &std::path::Path) -> Result<AntennaModel, String> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let text = std::fs::read_to_string(path).map_err(|err| format!("{}: {err}", path.display()))?;
        AntennaModel::from_json(&text).map_err(|err| format!("{}: {err}", path.display()))
    } else {
        antcore::parse_file(path).map_err(|err| err.to_string())
    }
}

async fn fetch_model(base: String) -> Result<AntennaModel, String> {
    let url = format!("{}/model", base.trim_end_matches('/'));
    let response = reqwest::get(&url).await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("{url}: {}", response.status()));
    }
    response
        .json::<AntennaModel>()
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use antcore::{Dialect, GainData, Geometry, Polarization};
    use ndarray::Array2;

    fn model() -> AntennaModel {
        let thetas = [0.0, 45.0, 90.0, 135.0, 180.0];
        let phis = [0.0, 90.0, 180.0, 270.0];
        let gains = [14.0, 14.1, 14.2, 14.3]
            .into_iter()
            .map(|f| {
                let grid = Array2::from_shape_fn((5, 4), |(i, j)| i as f64 - j as f64);
                GainData::from_grid(f, Polarization::Sum, &thetas, &phis, grid.view()).unwrap()
            })
            .collect();
        AntennaModel::new(Dialect::Nec2, gains, Vec::new(), Geometry::default()).with_title("test")
    }

    fn viewer() -> Viewer {
        let args = Args::try_parse_from(["antenna-viewer", "missing.nec"]).unwrap();
        let (mut viewer, _) = Viewer::boot(args);
        viewer.set_model(model());
        viewer
    }

    #[test]
    fn stepping_stays_in_range() {
        let mut viewer = viewer();
        assert_eq!(viewer.frequencies.len(), 4);
        let _ = Viewer::update(&mut viewer, Message::Step(-1));
        assert_eq!(viewer.index, 0);
        let _ = Viewer::update(&mut viewer, Message::Step(1));
        let _ = Viewer::update(&mut viewer, Message::FrequencyChanged(99));
        assert_eq!(viewer.index, 3);
        assert_eq!(viewer.pattern_index(), Some(3));
    }

    #[test]
    fn charts_follow_scaling_and_frequency() {
        let mut viewer = viewer();
        let _ = Viewer::update(&mut viewer, Message::ScalingSelected(ScaleMethod::Linear));
        assert_eq!(viewer.scaler.method(), ScaleMethod::Linear);
        let chart = viewer.polar_chart(CutKind::Azimuth);
        assert!(chart.cut.is_some());
        assert!(viewer.surface_chart().closed);
        assert!(viewer.swr.is_none());
    }

    #[test]
    fn missing_file_reports_status() {
        let args = Args::try_parse_from(["antenna-viewer", "/nonexistent/file.nec"]).unwrap();
        let (viewer, _) = Viewer::boot(args);
        assert!(viewer.model.is_none());
        assert!(viewer.status.contains("/nonexistent/file.nec"));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error() {
        assert!(fetch_model("http://127.0.0.1:1".into()).await.is_err());
    }
}
